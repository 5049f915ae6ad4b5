use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use crate::config::Config;
use crate::models::LoginAttempt;

use super::{LogPage, LogQuery, LogStore, StoreError};

/// Collection holding login attempts.
const COLLECTION: &str = "login_logs";

/// MongoDB document-store backend.
///
/// Records sort newest-first on the serialized timestamp, which works as a
/// plain string comparison because the timestamps are fixed width.
pub struct MongoStore {
    collection: Collection<LoginAttempt>,
}

impl MongoStore {
    /// Connect and verify liveness with a `ping` against the server.
    ///
    /// Server selection and connect timeouts are kept short (2 s) so a down
    /// database fails the startup probe quickly instead of hanging the boot.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(&config.mongo_uri).await?;
        options.server_selection_timeout = Some(Duration::from_secs(2));
        options.connect_timeout = Some(Duration::from_secs(2));

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        let collection = client.database(&config.mongo_db).collection(COLLECTION);
        Ok(MongoStore { collection })
    }

    fn filter_for(query: &LogQuery) -> Document {
        match query.username {
            Some(ref needle) if !needle.is_empty() => doc! {
                "username": { "$regex": regex_escape(needle), "$options": "i" }
            },
            _ => doc! {},
        }
    }
}

#[async_trait::async_trait]
impl LogStore for MongoStore {
    async fn append(&self, record: &LoginAttempt) -> Result<(), StoreError> {
        self.collection.insert_one(record).await?;
        Ok(())
    }

    async fn query(&self, query: &LogQuery) -> Result<LogPage, StoreError> {
        let filter = Self::filter_for(query);
        let total = self.collection.count_documents(filter.clone()).await?;

        // The driver takes a signed limit; clamp rather than let a huge
        // page size wrap negative.
        let limit = i64::try_from(query.page_size.max(1)).unwrap_or(i64::MAX);
        let records = self
            .collection
            .find(filter)
            .sort(doc! { "timestamp": -1 })
            .skip(query.offset())
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        Ok(LogPage { records, total })
    }

    fn name(&self) -> &'static str {
        "mongodb"
    }
}

/// Escape a user-supplied substring for use inside `$regex`.
fn regex_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
