use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::models::StoreSnapshot;
use super::store::{JobStore, StorageBackend, StoreError};
use crate::api::job::Job;

/// Local JSON file holding `{"jobs": [...], "nextId": n}`.
///
/// Every call reads the file from disk, so edits made by other tools show up
/// on the next request. Writes replace the whole document through a
/// temporary sibling file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the data file, creating an empty one if it does not exist yet
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        };

        if tokio::fs::try_exists(&store.path).await? {
            // Fail early on a corrupt file rather than on the first request
            store.read_snapshot().await?;
        } else {
            if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            store.write_snapshot(&StoreSnapshot::default()).await?;
            info!("Created empty data file at {}", store.path.display());
        }

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(StoreSnapshot::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(StoreSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_snapshot(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(
            "File store: wrote {} jobs, nextId={} to {}",
            snapshot.jobs.len(),
            snapshot.next_id,
            self.path.display()
        );
        Ok(())
    }

    async fn update<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoreSnapshot) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut snapshot = self.read_snapshot().await?;
        apply(&mut snapshot);
        self.write_snapshot(&snapshot).await
    }
}

#[async_trait]
impl JobStore for FileStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::File
    }

    async fn load_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.read_snapshot().await?.jobs)
    }

    async fn save_jobs(&self, jobs: &[Job]) -> Result<(), StoreError> {
        let jobs = jobs.to_vec();
        self.update(move |snapshot| snapshot.jobs = jobs).await
    }

    async fn next_id(&self) -> Result<u64, StoreError> {
        Ok(self.read_snapshot().await?.next_id)
    }

    async fn set_next_id(&self, next_id: u64) -> Result<(), StoreError> {
        self.update(move |snapshot| snapshot.next_id = next_id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        tokio::fs::metadata(&self.path).await?;
        Ok(())
    }
}
