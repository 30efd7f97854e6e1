use std::path::PathBuf;

use thiserror::Error;

use super::backup::BackupError;
use crate::document::generation::GenerationError;
use crate::document::validate::ValidationError;

/// Failures surfaced by [`ContentStore`](super::ContentStore).
///
/// Backup snapshot failures never appear here: they are logged by the backup
/// manager and the write proceeds.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid content: {0}")]
    Validation(#[from] ValidationError),

    #[error("storage error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored document {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("backup not found: {0}")]
    BackupNotFound(String),

    #[error("invalid backup id: {0}")]
    InvalidBackupId(String),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<BackupError> for StoreError {
    fn from(err: BackupError) -> Self {
        match err {
            BackupError::NotFound(id) => StoreError::BackupNotFound(id),
            BackupError::Io { path, source } => StoreError::Io { path, source },
        }
    }
}

/// The legacy document exists but cannot be turned into a valid current one.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("legacy document {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("legacy document {} has an unsupported shape: {source}", .path.display())]
    Shape {
        path: PathBuf,
        #[source]
        source: GenerationError,
    },

    #[error("migrated document failed validation: {0}")]
    Invalid(#[source] ValidationError),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
