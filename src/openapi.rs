use utoipa::OpenApi;

use crate::controllers::auth::{LoginRequest, LoginResponse};
use crate::controllers::legacy::{LegacyLoginRequest, LegacySavedResponse};
use crate::controllers::login_logs::LogsResponse;
use crate::models::{Browser, DeviceType, LoginAttempt, Os};

/// Auto-generated OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EMS Backend API",
        version = "0.1.0",
        description = "Login-attempt audit log for the Employee Management System."
    ),
    paths(
        crate::controllers::auth::login,
        crate::controllers::login_logs::get_logs,
        crate::controllers::legacy::legacy_login,
        crate::controllers::legacy::legacy_logs,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            LogsResponse,
            LegacyLoginRequest,
            LegacySavedResponse,
            LoginAttempt,
            DeviceType,
            Browser,
            Os,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "login-logs", description = "Login-attempt audit log"),
        (name = "legacy", description = "File-only legacy logger")
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add JWT Bearer security scheme to the OpenAPI spec.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
