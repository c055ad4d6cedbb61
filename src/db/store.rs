use std::fmt;

use async_trait::async_trait;

use crate::api::job::Job;

/// Errors raised by a storage backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the data file failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be encoded or decoded
    #[error("stored data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The key-value service could not be reached
    #[error("key-value request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The key-value service answered with an error
    #[error("key-value store error: {0}")]
    Kv(String),

    /// The requested backend is missing required settings
    #[error("storage not configured: {0}")]
    NotConfigured(String),
}

/// Which backend is serving the job collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Kv,
    File,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Kv => "kv",
            StorageBackend::File => "file",
            StorageBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage for the job collection and the id counter.
///
/// A completed `save_jobs`/`set_next_id` is visible to every later load on
/// the same store. An absent collection loads as empty and an absent counter
/// as `1`. Nothing is promised across processes sharing one backend.
#[async_trait]
pub trait JobStore: Send + Sync {
    fn backend(&self) -> StorageBackend;

    async fn load_jobs(&self) -> Result<Vec<Job>, StoreError>;

    async fn save_jobs(&self, jobs: &[Job]) -> Result<(), StoreError>;

    async fn next_id(&self) -> Result<u64, StoreError>;

    async fn set_next_id(&self, next_id: u64) -> Result<(), StoreError>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
