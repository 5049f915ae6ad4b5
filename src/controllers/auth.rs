use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{create_token, find_user};
use crate::classifier::{classify, RawLogin};
use crate::error::EmsError;
use crate::store::LogStore;

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: Option<String>,
    pub password: Option<String>,
    /// IP the client claims for itself, stored untrusted next to the
    /// server-observed one.
    pub client_ip: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub role: String,
    pub user_id: String,
    pub force_password_change: bool,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

// ── Handlers ──

/// Log in against the demo user table, recording the attempt either way.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Attempt could not be persisted")
    ),
    tag = "auth"
)]
async fn login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LoginResponse>, EmsError> {
    // A missing or unparseable body gets the same 400 as missing fields.
    let payload: LoginRequest = serde_json::from_slice(&body).unwrap_or_default();

    let username = payload.user_name.unwrap_or_default();
    let password = payload.password.unwrap_or_default();
    if username.is_empty() || password.is_empty() {
        return Err(EmsError::BadRequest(
            "Username and password required".to_string(),
        ));
    }

    let user = find_user(&username).filter(|u| u.password == password);
    let success = user.is_some();
    let note = if success {
        "Login successful"
    } else {
        "Invalid credentials"
    };

    let attempt = classify(
        RawLogin {
            username: Some(username.clone()),
            timestamp: None,
            client_ip: payload.client_ip,
            user_agent: None,
            success,
            note: note.to_string(),
        },
        &headers,
        Some(peer),
    );

    // Total persistence failure is the one store error a login surfaces:
    // we do not hand out a token for an attempt the audit log never saw.
    state.store.append(&attempt).await?;
    tracing::info!("Login attempt logged: {} - {}", username, success);

    let user = match user {
        Some(user) => user,
        None => return Err(EmsError::Unauthorized("Invalid credentials".to_string())),
    };

    let token = create_token(
        user.id,
        user.username,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_expiry_hours,
    )?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        role: user.role.to_string(),
        user_id: user.id.to_string(),
        force_password_change: false,
    }))
}
