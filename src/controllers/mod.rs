use std::sync::Arc;

use crate::config::Config;
use crate::store::{FileStore, LogStore};

/// Shared application state available in all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Backend selected at startup: primary with per-write fallback, or
    /// file-only when the startup probe failed.
    pub store: Arc<dyn LogStore>,
    /// The shared file store. Legacy endpoints always use this one, and the
    /// fallback path writes here, so both go through the same lock.
    pub file: Arc<FileStore>,
    pub config: Arc<Config>,
}

pub mod auth;
pub mod legacy;
pub mod login_logs;
