use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::models::{first_id, JOBS_KEY, NEXT_ID_KEY};
use super::store::{JobStore, StorageBackend, StoreError};
use crate::api::job::Job;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Reply envelope of the REST key-value protocol
#[derive(Debug, Deserialize)]
struct KvReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Managed Redis-compatible key-value service spoken to over its REST API.
///
/// Each command is a `POST` of a JSON array such as `["GET", "jobs"]` with a
/// bearer token. Values are kept as JSON-encoded strings under the `jobs`
/// and `nextId` keys.
pub struct KvStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl KvStore {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn command(&self, args: &[&str]) -> Result<Option<Value>, StoreError> {
        debug!("KV command: {}", args.first().copied().unwrap_or_default());

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(args)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        let reply: KvReply = serde_json::from_str(&body).map_err(|_| {
            StoreError::Kv(format!("unexpected reply (HTTP {}): {}", status, body.trim()))
        })?;

        if let Some(error) = reply.error {
            return Err(StoreError::Kv(error));
        }
        if !status.is_success() {
            return Err(StoreError::Kv(format!("HTTP {}", status)));
        }
        Ok(reply.result)
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.command(&["GET", key]).await? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(raw)) => Ok(Some(serde_json::from_str(&raw)?)),
            Some(other) => Ok(Some(serde_json::from_value(other)?)),
        }
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.command(&["SET", key, &raw]).await?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for KvStore {
    fn backend(&self) -> StorageBackend {
        StorageBackend::Kv
    }

    async fn load_jobs(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.get_json(JOBS_KEY).await?.unwrap_or_default())
    }

    async fn save_jobs(&self, jobs: &[Job]) -> Result<(), StoreError> {
        self.set_json(JOBS_KEY, jobs).await
    }

    async fn next_id(&self) -> Result<u64, StoreError> {
        Ok(self.get_json(NEXT_ID_KEY).await?.unwrap_or_else(first_id))
    }

    async fn set_next_id(&self, next_id: u64) -> Result<(), StoreError> {
        self.set_json(NEXT_ID_KEY, &next_id).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.command(&["PING"]).await?;
        Ok(())
    }
}
