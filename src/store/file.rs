use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::models::LoginAttempt;

use super::{LogPage, LogQuery, LogStore, StoreError};

/// Flat-file JSON backend.
///
/// The whole log lives in one pretty-printed JSON array, oldest first on
/// disk. Every append is a read-modify-write of the entire file, serialized
/// behind an async mutex; the file is replaced atomically by writing a temp
/// file in the same directory and renaming it over the original. The lock
/// only covers this process — the file must not have concurrent writers from
/// other processes.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Retention cap: append discards the oldest records beyond this count.
    pub const MAX_RECORDS: usize = 1000;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored records, newest first.
    pub async fn snapshot(&self) -> Result<Vec<LoginAttempt>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    /// Load the file as insertion-ordered records. Callers must hold the lock.
    ///
    /// A missing file is an empty log. A file that exists but does not parse
    /// is renamed aside with a `.bad` suffix (best effort, left on disk for
    /// inspection) and treated as empty rather than failing the request.
    async fn load(&self) -> Result<Vec<LoginAttempt>, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                let quarantine = quarantine_path(&self.path);
                tracing::warn!(
                    "Corrupt log file {}: {}. Renaming to {} and starting empty",
                    self.path.display(),
                    e,
                    quarantine.display()
                );
                if let Err(rename_err) = fs::rename(&self.path, &quarantine).await {
                    tracing::warn!("Failed to quarantine corrupt log file: {}", rename_err);
                }
                Ok(Vec::new())
            }
        }
    }

    /// Replace the file contents atomically. Callers must hold the lock.
    async fn save(&self, records: &[LoginAttempt]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
        fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LogStore for FileStore {
    async fn append(&self, record: &LoginAttempt) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        records.push(record.clone());
        if records.len() > Self::MAX_RECORDS {
            let excess = records.len() - Self::MAX_RECORDS;
            records.drain(..excess);
        }
        self.save(&records).await
    }

    async fn query(&self, query: &LogQuery) -> Result<LogPage, StoreError> {
        let _guard = self.lock.lock().await;
        let mut records = self.load().await?;

        if let Some(ref filter) = query.username {
            let needle = filter.to_lowercase();
            records.retain(|r| {
                r.username
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&needle)
            });
        }
        sort_newest_first(&mut records);

        let total = records.len() as u64;
        let page = records
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size.max(1) as usize)
            .collect();
        Ok(LogPage {
            records: page,
            total,
        })
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

fn sort_newest_first(records: &mut [LoginAttempt]) {
    // Stable, so records with equal timestamps keep their insertion order.
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn quarantine_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bad");
    PathBuf::from(name)
}
