use std::sync::Arc;

use crate::models::LoginAttempt;

use super::{FileStore, LogPage, LogQuery, LogStore, StoreError};

/// Decorator that gives the primary store a per-write file fallback.
///
/// A failed append on the primary is retried on the file store after a
/// warning; the caller sees an error only when both writes fail. The fallback
/// applies to that single write and does not change which backend later calls
/// target. Reads are not cushioned: query errors from the primary surface so
/// an outage stays visible instead of looking like an empty log.
pub struct FallbackStore {
    primary: Arc<dyn LogStore>,
    fallback: Arc<FileStore>,
}

impl FallbackStore {
    pub fn new(primary: Arc<dyn LogStore>, fallback: Arc<FileStore>) -> Self {
        FallbackStore { primary, fallback }
    }
}

#[async_trait::async_trait]
impl LogStore for FallbackStore {
    async fn append(&self, record: &LoginAttempt) -> Result<(), StoreError> {
        let primary_err = match self.primary.append(record).await {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        tracing::warn!(
            "{} write failed: {}. Falling back to file",
            self.primary.name(),
            primary_err
        );

        self.fallback
            .append(record)
            .await
            .map_err(|fallback_err| StoreError::AllBackendsFailed {
                primary: primary_err.to_string(),
                fallback: fallback_err.to_string(),
            })
    }

    async fn query(&self, query: &LogQuery) -> Result<LogPage, StoreError> {
        self.primary.query(query).await
    }

    fn name(&self) -> &'static str {
        self.primary.name()
    }
}
