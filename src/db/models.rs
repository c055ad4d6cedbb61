use serde::{Deserialize, Serialize};

use crate::api::job::Job;

/// Key holding the job collection
pub const JOBS_KEY: &str = "jobs";
/// Key holding the next id to assign
pub const NEXT_ID_KEY: &str = "nextId";

/// Persisted layout shared by every backend: the job array plus the id counter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default = "first_id")]
    pub next_id: u64,
}

pub fn first_id() -> u64 {
    1
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            jobs: Vec::new(),
            next_id: first_id(),
        }
    }
}
