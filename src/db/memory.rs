use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::StoreSnapshot;
use super::store::{JobStore, StorageBackend, StoreError};
use crate::api::job::Job;

/// Process-local store. Starts empty and lives as long as the server.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn load_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.state.read().await.jobs.clone())
    }

    async fn save_jobs(&self, jobs: &[Job]) -> Result<(), StoreError> {
        debug!("Memory store: saving {} jobs", jobs.len());
        self.state.write().await.jobs = jobs.to_vec();
        Ok(())
    }

    async fn next_id(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().await.next_id)
    }

    async fn set_next_id(&self, next_id: u64) -> Result<(), StoreError> {
        self.state.write().await.next_id = next_id;
        Ok(())
    }
}
