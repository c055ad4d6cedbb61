use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Which storage backend the server should use
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageMode {
    /// Key-value store if reachable, else the data file if set, else memory
    Auto,
    Kv,
    File,
    Memory,
}

impl FromStr for StorageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(StorageMode::Auto),
            "kv" => Ok(StorageMode::Kv),
            "file" => Ok(StorageMode::File),
            "memory" => Ok(StorageMode::Memory),
            other => Err(format!(
                "STORAGE_BACKEND must be one of auto, kv, file, memory (got '{}')",
                other
            )),
        }
    }
}

/// Connection settings of the managed key-value store
#[derive(Clone, Debug)]
pub struct KvConfig {
    pub url: String,
    pub token: String,
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP server binds to
    pub host: String,

    pub port: u16,

    /// Maximum JSON payload size (in bytes)
    /// Default: 1MB
    pub max_payload_size: usize,

    /// Directory for the daily rolling log files
    pub log_dir: String,

    pub storage: StorageMode,

    /// JSON data file for the file backend
    pub data_file: Option<PathBuf>,

    pub kv: Option<KvConfig>,
}

pub const DEFAULT_DATA_FILE: &str = "db.json";

impl Config {
    /// Load configuration from environment variables
    ///
    /// Optional environment variables:
    /// - HOST, PORT: bind address (default: 127.0.0.1:3001)
    /// - MAX_PAYLOAD_SIZE: Maximum request payload size in bytes (default: 1048576 = 1MB)
    /// - LOG_DIR: log directory (default: logs)
    /// - STORAGE_BACKEND: auto | kv | file | memory (default: auto)
    /// - DATA_FILE: path of the JSON data file
    /// - KV_REST_API_URL / KV_REST_API_TOKEN (or VERCEL_KV_URL / VERCEL_KV_TOKEN)
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| format!("PORT must be a valid port number (got '{}')", raw))?,
            Err(_) => 3001,
        };

        let max_payload_size = env::var("MAX_PAYLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1024 * 1024);

        let storage = env::var("STORAGE_BACKEND")
            .map(|raw| raw.parse())
            .unwrap_or(Ok(StorageMode::Auto))?;

        let kv = match (
            first_var(&["KV_REST_API_URL", "VERCEL_KV_URL"]),
            first_var(&["KV_REST_API_TOKEN", "VERCEL_KV_TOKEN"]),
        ) {
            (Some(url), Some(token)) => Some(KvConfig { url, token }),
            _ => None,
        };

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            max_payload_size,
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            storage,
            data_file: first_var(&["DATA_FILE"]).map(PathBuf::from),
            kv,
        })
    }
}

fn first_var(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_mode_parses_known_values() {
        assert_eq!("auto".parse::<StorageMode>(), Ok(StorageMode::Auto));
        assert_eq!("KV".parse::<StorageMode>(), Ok(StorageMode::Kv));
        assert_eq!(" file ".parse::<StorageMode>(), Ok(StorageMode::File));
        assert_eq!("memory".parse::<StorageMode>(), Ok(StorageMode::Memory));
        assert_eq!("".parse::<StorageMode>(), Ok(StorageMode::Auto));
    }

    #[test]
    fn storage_mode_rejects_unknown_values() {
        let err = "postgres".parse::<StorageMode>().unwrap_err();
        assert!(err.contains("postgres"));
    }
}
