//! Persistence for the login-attempt audit log.
//!
//! Two physical backends exist behind one trait: MongoDB as the primary
//! document store and a flat JSON file as the fallback. The backend is chosen
//! exactly once at startup by [`select_backend`]; per-write fallback on top of
//! a healthy primary is handled by [`FallbackStore`].

pub mod fallback;
pub mod file;
pub mod mongo;

pub use fallback::FallbackStore;
pub use file::FileStore;
pub use mongo::MongoStore;

use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::models::LoginAttempt;

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Write failed on all backends (primary: {primary}; fallback: {fallback})")]
    AllBackendsFailed { primary: String, fallback: String },
}

/// A page request against the audit log.
#[derive(Debug, Clone, Default)]
pub struct LogQuery {
    /// Case-insensitive username substring; `None` matches everything.
    pub username: Option<String>,
    /// 1-based page number.
    pub page: u64,
    /// Records per page.
    pub page_size: u64,
}

impl LogQuery {
    /// Build a query with `page` and `page_size` clamped to at least 1 and an
    /// empty filter string treated as no filter.
    pub fn new(username: Option<String>, page: u64, page_size: u64) -> Self {
        LogQuery {
            username: username.filter(|u| !u.is_empty()),
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Zero-based offset of the first record on this page.
    ///
    /// Saturates on overflow, so an absurd page number reads as past the end
    /// instead of wrapping back into real records.
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1).saturating_mul(self.page_size.max(1))
    }
}

/// One page of records plus the total match count.
#[derive(Debug, Clone)]
pub struct LogPage {
    /// Records on this page, newest first.
    pub records: Vec<LoginAttempt>,
    /// Total records matching the filter across all pages.
    pub total: u64,
}

impl LogPage {
    /// Number of pages at the given page size; 0 when nothing matched.
    pub fn total_pages(&self, page_size: u64) -> u64 {
        self.total.div_ceil(page_size.max(1))
    }
}

/// Persistence backend for the audit log.
///
/// Both implementations return records in canonical newest-first order;
/// ordering never depends on insertion order on disk.
#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    /// Append one record.
    async fn append(&self, record: &LoginAttempt) -> Result<(), StoreError>;

    /// Read one page, newest first, with optional username filtering.
    async fn query(&self, query: &LogQuery) -> Result<LogPage, StoreError>;

    /// Short backend name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}

/// Probe MongoDB once and pick the backend for the process lifetime.
///
/// On success the selected store is the primary wrapped with a per-write file
/// fallback. On any probe failure (timeout, auth, network) the shared file
/// store alone is used until the process restarts; there is no re-probe.
pub async fn select_backend(config: &Config, file: Arc<FileStore>) -> Arc<dyn LogStore> {
    match MongoStore::connect(config).await {
        Ok(mongo) => {
            tracing::info!("Connected to MongoDB ({})", config.mongo_db);
            Arc::new(FallbackStore::new(Arc::new(mongo), file))
        }
        Err(e) => {
            tracing::warn!("MongoDB connection failed: {}", e);
            tracing::info!("Using file-based storage fallback");
            file
        }
    }
}
