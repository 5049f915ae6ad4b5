use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::config::Config;
use crate::controllers::{self, AppState};
use crate::openapi::ApiDoc;
use crate::store::{self, FileStore, LogStore};

/// The EMS backend application.
pub struct App {
    pub config: Config,
    pub store: Arc<dyn LogStore>,
    pub file: Arc<FileStore>,
}

impl App {
    /// Create an application with config from the environment.
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::from_env()?;
        Ok(Self::with_config(config).await)
    }

    /// Create an application with a given config.
    ///
    /// Probes MongoDB exactly once here; the chosen backend holds for the
    /// process lifetime.
    pub async fn with_config(config: Config) -> Self {
        let file = Arc::new(FileStore::new(&config.log_file));
        let store = store::select_backend(&config, file.clone()).await;
        App {
            config,
            store,
            file,
        }
    }

    /// Create an application with an injected store, skipping the probe.
    ///
    /// This is the seam tests use to exercise either backend, or the
    /// fallback path, deterministically and without a database.
    pub fn with_store(config: Config, store: Arc<dyn LogStore>, file: Arc<FileStore>) -> Self {
        App {
            config,
            store,
            file,
        }
    }

    /// Build the Axum router.
    pub fn router(&self) -> Router {
        let config = Arc::new(self.config.clone());
        let is_dev = self.config.is_dev();

        let state = AppState {
            store: self.store.clone(),
            file: self.file.clone(),
            config: config.clone(),
        };

        let openapi_spec = ApiDoc::openapi();
        let openapi_json = openapi_spec.clone();

        let mut router = Router::new()
            .route("/", get(welcome))
            .route("/health", get(health))
            .nest("/api/auth", controllers::auth::routes())
            .nest("/api/login-logs", controllers::login_logs::routes())
            // Legacy routes live directly under /api.
            .merge(controllers::legacy::routes())
            .with_state(state)
            .merge(Scalar::with_url("/api-docs", openapi_spec))
            .route(
                "/api-docs/openapi.json",
                get(move || {
                    let spec = openapi_json.clone();
                    async move { Json(spec) }
                }),
            )
            .layer(axum::Extension(config))
            .layer(CorsLayer::permissive());

        // Only add expensive tracing/request-id middleware in development mode.
        if is_dev {
            use tower_http::trace::DefaultMakeSpan;
            use tower_http::trace::DefaultOnRequest;
            use tower_http::trace::DefaultOnResponse;
            use tower_http::LatencyUnit;

            let x_request_id = axum::http::HeaderName::from_static("x-request-id");
            router = router
                .layer(SetRequestIdLayer::new(
                    x_request_id.clone(),
                    MakeRequestUuid,
                ))
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                        .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                        .on_response(
                            DefaultOnResponse::new()
                                .level(tracing::Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                );
        }

        router
    }

    /// Run the application server until ctrl-c.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = self.config.server_addr();
        let storage = self.store.name();
        let router = self.router();

        println!("\nEMS backend is running!");
        println!("   → Server:   http://{}", addr);
        println!("   → API docs: http://{}/api-docs", addr);
        println!("   → Storage:  {}", storage);
        println!();

        tracing::info!("EMS backend running on http://{} (storage: {})", addr, storage);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        Ok(())
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutting down EMS backend...");
}

// ═══ Application endpoints ═══

#[derive(Serialize)]
struct WelcomeMessage {
    message: &'static str,
    docs: &'static str,
    status: &'static str,
}

/// Welcome page at `/`.
async fn welcome() -> Json<WelcomeMessage> {
    Json(WelcomeMessage {
        message: "Employee Management System backend",
        docs: "/api-docs",
        status: "running",
    })
}

/// Liveness plus which storage backend the startup probe selected.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "storage": state.store.name() }))
}
