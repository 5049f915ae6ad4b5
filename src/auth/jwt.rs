use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::EmsError;

/// JWT claims payload, serialized with the camelCase names the admin UI reads.
#[derive(Debug, Serialize, Deserialize, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// ID of the authenticated user
    pub user_id: String,
    pub username: String,
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Create an HS256 JWT for the given user.
pub fn create_token(
    user_id: &str,
    username: &str,
    role: &str,
    secret: &str,
    expiry_hours: u64,
) -> Result<String, EmsError> {
    let expires = Utc::now() + Duration::hours(expiry_hours as i64);

    let claims = Claims {
        user_id: user_id.to_string(),
        username: username.to_string(),
        role: role.to_string(),
        exp: expires.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| EmsError::Internal(format!("Failed to create token: {}", e)))
}

/// Validate a JWT and return the claims.
///
/// Expired tokens are reported separately from otherwise-invalid ones so the
/// HTTP layer can keep the distinct 401 messages clients rely on.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, EmsError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => EmsError::Unauthorized("Token expired".to_string()),
        _ => EmsError::Unauthorized("Invalid token".to_string()),
    })?;

    Ok(token_data.claims)
}
