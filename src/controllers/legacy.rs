//! Compatibility surface of the original standalone login logger.
//!
//! These endpoints are file-only on purpose: they predate the document
//! store and clients of theirs expect the flat file, regardless of which
//! backend the startup probe selected.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::classifier::{classify, RawLogin};
use crate::error::EmsError;
use crate::models::LoginAttempt;
use crate::store::LogStore;

use super::AppState;

// ── Request / Response types ──

/// Body of the legacy append endpoint. Every field is optional; a missing or
/// malformed body is treated as empty.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLoginRequest {
    pub username: Option<String>,
    /// Caller-supplied ISO-8601 timestamp; server time is used when absent.
    pub timestamp: Option<String>,
    /// IP the caller claims for itself.
    pub ip: Option<String>,
    /// User-agent override; the request header is used when absent.
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LegacySavedResponse {
    pub status: String,
    /// The record as stored, classification included.
    pub saved: LoginAttempt,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(legacy_login))
        .route("/api/logs", get(legacy_logs))
}

// ── Handlers ──

/// Append a login event straight to the file log.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LegacyLoginRequest,
    responses(
        (status = 201, description = "Event stored", body = LegacySavedResponse),
        (status = 500, description = "File write failed")
    ),
    tag = "legacy"
)]
async fn legacy_login(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<LegacySavedResponse>), EmsError> {
    let payload: LegacyLoginRequest = serde_json::from_slice(&body).unwrap_or_default();

    let entry = classify(
        RawLogin {
            username: payload.username,
            timestamp: payload.timestamp,
            client_ip: payload.ip,
            user_agent: payload.user_agent,
            success: true,
            note: "stored_on_server".to_string(),
        },
        &headers,
        Some(peer),
    );
    state.file.append(&entry).await?;

    Ok((
        StatusCode::CREATED,
        Json(LegacySavedResponse {
            status: "ok".to_string(),
            saved: entry,
        }),
    ))
}

/// The full file log as a bare array, newest first. No auth, no pagination.
#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Every stored record", body = Vec<LoginAttempt>),
        (status = 500, description = "File read failed")
    ),
    tag = "legacy"
)]
async fn legacy_logs(State(state): State<AppState>) -> Result<Json<Vec<LoginAttempt>>, EmsError> {
    let records = state.file.snapshot().await?;
    Ok(Json(records))
}
