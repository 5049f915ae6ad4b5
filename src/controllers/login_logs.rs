use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::EmsError;
use crate::extractors::AuthUser;
use crate::models::LoginAttempt;
use crate::store::{LogQuery, LogStore};

use super::AppState;

// ── Request / Response types ──

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogsParams {
    /// 1-based page number (default 1). Values below 1 are clamped.
    pub page: Option<i64>,
    /// Records per page (default 50). Values below 1 are clamped.
    pub limit: Option<i64>,
    /// Case-insensitive username substring filter.
    pub username: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    /// Records on this page, newest first.
    pub logs: Vec<LoginAttempt>,
    /// Total records matching the filter.
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

// ── Routes ──

pub fn routes() -> Router<AppState> {
    Router::new().route("/logs", get(get_logs))
}

// ── Handlers ──

/// Paginated login-attempt listing for the admin UI.
#[utoipa::path(
    get,
    path = "/api/login-logs/logs",
    params(LogsParams),
    responses(
        (status = 200, description = "One page of login attempts", body = LogsResponse),
        (status = 401, description = "Missing, expired, or invalid token"),
        (status = 500, description = "Storage failure")
    ),
    security(("bearer_auth" = [])),
    tag = "login-logs"
)]
async fn get_logs(
    State(state): State<AppState>,
    AuthUser(_claims): AuthUser,
    Query(params): Query<LogsParams>,
) -> Result<Json<LogsResponse>, EmsError> {
    let page = params.page.unwrap_or(1).max(1) as u64;
    let limit = params.limit.unwrap_or(50).max(1) as u64;
    let query = LogQuery::new(params.username, page, limit);

    // Read errors surface as a 500; an unreachable backend must not look
    // like an empty audit trail.
    let result = state.store.query(&query).await?;

    Ok(Json(LogsResponse {
        total_pages: result.total_pages(limit),
        total: result.total,
        logs: result.records,
        page,
    }))
}
