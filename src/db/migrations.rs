use std::path::Path;

use tracing::info;

use super::models::StoreSnapshot;
use super::store::{JobStore, StoreError};

/// What ended up in the target store after a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub jobs_migrated: usize,
    pub next_id: u64,
}

/// Copy a local JSON data file into another store.
///
/// A missing file initializes the target with an empty collection and the
/// first id. The target is read back afterwards so the report reflects what
/// was actually stored.
pub async fn run_migration(
    source: &Path,
    target: &dyn JobStore,
) -> Result<MigrationReport, StoreError> {
    let snapshot = if tokio::fs::try_exists(source).await? {
        let bytes = tokio::fs::read(source).await?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
        info!(
            "Found {} jobs in {}",
            snapshot.jobs.len(),
            source.display()
        );
        snapshot
    } else {
        info!(
            "No data file at {}, initializing an empty {} store",
            source.display(),
            target.backend()
        );
        StoreSnapshot::default()
    };

    target.save_jobs(&snapshot.jobs).await?;
    target.set_next_id(snapshot.next_id).await?;

    let report = MigrationReport {
        jobs_migrated: target.load_jobs().await?.len(),
        next_id: target.next_id().await?,
    };

    info!(
        "Migration into {} store complete: {} jobs, next id {}",
        target.backend(),
        report.jobs_migrated,
        report.next_id
    );
    Ok(report)
}
