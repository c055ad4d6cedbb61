use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use super::file::FileStore;
use super::kv::KvStore;
use super::memory::MemoryStore;
use super::store::{JobStore, StoreError};
use crate::config::{KvConfig, StorageMode, DEFAULT_DATA_FILE};

/// Build the key-value store and check that it answers
pub async fn connect_kv(kv: &KvConfig) -> Result<KvStore, StoreError> {
    let store = KvStore::new(&kv.url, &kv.token)?;
    store.ping().await?;
    Ok(store)
}

/// Pick the storage backend once at startup.
///
/// The rest of the application only ever sees the returned `JobStore`.
pub async fn connect(
    mode: StorageMode,
    kv: Option<&KvConfig>,
    data_file: Option<&PathBuf>,
) -> Result<Arc<dyn JobStore>, StoreError> {
    match mode {
        StorageMode::Kv => {
            let kv = kv.ok_or_else(|| {
                StoreError::NotConfigured(
                    "KV_REST_API_URL and KV_REST_API_TOKEN must be set".to_string(),
                )
            })?;
            let store = connect_kv(kv).await?;
            info!("Using key-value storage at {}", store.url());
            Ok(Arc::new(store))
        }
        StorageMode::File => {
            let path = data_file
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));
            open_file(path).await
        }
        StorageMode::Memory => {
            info!("Using in-memory storage, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageMode::Auto => {
            if let Some(kv) = kv {
                match connect_kv(kv).await {
                    Ok(store) => {
                        info!("Using key-value storage at {}", store.url());
                        return Ok(Arc::new(store));
                    }
                    Err(e) => warn!("Key-value store unavailable, falling back: {}", e),
                }
            }

            match data_file {
                Some(path) => open_file(path.clone()).await,
                None => {
                    warn!("No durable storage configured, using in-memory storage");
                    Ok(Arc::new(MemoryStore::new()))
                }
            }
        }
    }
}

async fn open_file(path: PathBuf) -> Result<Arc<dyn JobStore>, StoreError> {
    let store = FileStore::open(path).await?;
    info!("Using file storage at {}", store.path().display());
    Ok(Arc::new(store))
}
