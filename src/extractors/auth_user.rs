use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{self, Claims};
use crate::config::Config;
use crate::error::EmsError;

/// Extractor that validates the JWT and provides the caller's claims.
///
/// Usage in handlers:
/// ```rust,ignore
/// async fn my_handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
///     // claims.user_id / claims.username / claims.role
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = EmsError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| EmsError::Unauthorized("No token provided".to_string()))?;

        // A bare token without the Bearer prefix is accepted as-is.
        let token = auth_header.strip_prefix("Bearer ").unwrap_or(auth_header);

        // Get JWT secret from Arc<Config> in extensions (cheap Arc clone per request)
        let config = parts
            .extensions
            .get::<Arc<Config>>()
            .ok_or_else(|| EmsError::Internal("Config not found in request".to_string()))?;

        let claims = auth::validate_token(token, &config.jwt_secret)?;

        Ok(AuthUser(claims))
    }
}
