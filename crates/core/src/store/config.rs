use std::path::{Path, PathBuf};

use super::backup::DEFAULT_RETENTION;

pub const PRIMARY_FILE: &str = "content.json";
pub const LEGACY_FILE: &str = "site-content.json";
pub const BACKUP_DIR: &str = "backups";

/// File locations and backup policy for one site's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Primary document, owned exclusively by the store.
    pub content_path: PathBuf,
    /// Generation 1 document; only ever read.
    pub legacy_path: PathBuf,
    /// Backup slots, owned exclusively by the backup manager.
    pub backup_dir: PathBuf,
    /// Number of backup slots kept after pruning.
    pub retention: usize,
}

impl StoreConfig {
    /// Conventional layout under a single data directory.
    pub fn in_dir(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            content_path: root.join(PRIMARY_FILE),
            legacy_path: root.join(LEGACY_FILE),
            backup_dir: root.join(BACKUP_DIR),
            retention: DEFAULT_RETENTION,
        }
    }
}
