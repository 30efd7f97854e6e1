use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use site_content_core::store::config::{BACKUP_DIR, LEGACY_FILE, PRIMARY_FILE};
use site_content_core::store::{StoreConfig, DEFAULT_RETENTION};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {kind}, got `{value}`")]
    Invalid {
        name: &'static str,
        kind: &'static str,
        value: String,
    },
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// Primary content document.
    pub content_path: PathBuf,
    /// Generation 1 document migrated on first read.
    pub legacy_path: PathBuf,
    /// Directory holding backup slots.
    pub backup_dir: PathBuf,
    /// Number of backup slots to keep.
    pub backup_retention: usize,
    /// Optional JSON file served when a local section is empty.
    pub fallback_path: Option<PathBuf>,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Paths default to files under `DATA_DIR`; each can be overridden.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(get("DATA_DIR").unwrap_or_else(|| "./data".to_string()));
        let path_or = |key: &str, default: PathBuf| get(key).map(PathBuf::from).unwrap_or(default);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", "u16", 3030)?,
            content_path: path_or("CONTENT_PATH", data_dir.join(PRIMARY_FILE)),
            legacy_path: path_or("LEGACY_CONTENT_PATH", data_dir.join(LEGACY_FILE)),
            backup_dir: path_or("BACKUP_DIR", data_dir.join(BACKUP_DIR)),
            backup_retention: positive_or(&get, "BACKUP_RETENTION", DEFAULT_RETENTION)?,
            fallback_path: get("FALLBACK_CONTENT_PATH").map(PathBuf::from),
            event_bus_capacity: positive_or(&get, "EVENT_BUS_CAPACITY", 1024)?,
            max_body_bytes: positive_or(&get, "MAX_BODY_BYTES", 2 * 1024 * 1024)?,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            content_path: self.content_path.clone(),
            legacy_path: self.legacy_path.clone(),
            backup_dir: self.backup_dir.clone(),
            retention: self.backup_retention,
        }
    }
}

fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    kind: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            kind,
            value,
        }),
    }
}

/// Counts and sizes where zero would disable the feature outright.
fn positive_or(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: usize,
) -> Result<usize, ConfigError> {
    match parse_or(get, name, "usize", default)? {
        0 => Err(ConfigError::Zero { name }),
        n => Ok(n),
    }
}
