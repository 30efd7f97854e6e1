//! Rotating snapshots of the primary document.
//!
//! Each slot is a byte-for-byte copy of the primary document taken right
//! before it is overwritten. Slot names embed a UTC timestamp with
//! microsecond precision, so lexicographic order is chronological order.

use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

/// Number of slots kept after pruning.
pub const DEFAULT_RETENTION: usize = 10;

const SLOT_PREFIX: &str = "content-";
const SLOT_SUFFIX: &str = ".json";
const STAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%6fZ";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup not found: {0}")]
    NotFound(String),
    #[error("backup I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackupError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BackupError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Name of one backup slot, e.g. `content-2025-03-01T10-15-00-123456Z.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupId(String);

impl BackupId {
    fn at(stamp: DateTime<Utc>) -> Self {
        let iso = stamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
        let safe = iso.replace([':', '.'], "-");
        BackupId(format!("{SLOT_PREFIX}{safe}{SLOT_SUFFIX}"))
    }

    /// Accept only names this manager could have produced, which also keeps
    /// caller-supplied ids from escaping the backup directory.
    pub fn parse(name: &str) -> Option<Self> {
        let stamp = name.strip_prefix(SLOT_PREFIX)?.strip_suffix(SLOT_SUFFIX)?;
        NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).ok()?;
        Some(BackupId(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let stamp = self.0.strip_prefix(SLOT_PREFIX)?.strip_suffix(SLOT_SUFFIX)?;
        NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT)
            .ok()
            .map(|t| t.and_utc())
    }
}

impl std::fmt::Display for BackupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub id: BackupId,
    pub created_at: Option<DateTime<Utc>>,
    pub size: u64,
}

/// Owns the backup directory. Callers serialize access (the content store
/// keeps the manager behind its write lock).
#[derive(Debug)]
pub struct BackupManager {
    source: PathBuf,
    dir: PathBuf,
    retention: usize,
    last_stamp: Option<DateTime<Utc>>,
}

impl BackupManager {
    pub fn new(source: impl Into<PathBuf>, dir: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            source: source.into(),
            dir: dir.into(),
            retention,
            last_stamp: None,
        }
    }

    pub fn path_of(&self, id: &BackupId) -> PathBuf {
        self.dir.join(id.as_str())
    }

    /// Copy the current primary document into a new slot and prune old ones.
    ///
    /// Never fails: returns `None` when there is nothing to back up or the
    /// copy could not be written, after logging the reason.
    pub async fn snapshot(&mut self) -> Option<BackupId> {
        let id = match self.try_snapshot().await {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::debug!(path = %self.source.display(), "no primary document yet, skipping backup");
                return None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "backup failed, continuing with write");
                return None;
            }
        };

        match self.prune().await {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "pruned old backups"),
            Err(err) => tracing::warn!(error = %err, "failed to prune backups"),
        }

        tracing::info!(backup = %id, "backed up content");
        Some(id)
    }

    async fn try_snapshot(&mut self) -> Result<Option<BackupId>, BackupError> {
        let bytes = match fs::read(&self.source).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(BackupError::io(&self.source, err)),
        };

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| BackupError::io(&self.dir, e))?;

        let id = self.next_id().await?;
        let path = self.path_of(&id);
        fs::write(&path, bytes)
            .await
            .map_err(|e| BackupError::io(&path, e))?;
        Ok(Some(id))
    }

    /// Timestamps strictly increase even when the clock has not moved past
    /// the previous slot.
    async fn next_id(&mut self) -> Result<BackupId, BackupError> {
        if self.last_stamp.is_none() {
            self.last_stamp = self
                .slot_ids()
                .await?
                .into_iter()
                .max()
                .and_then(|id| id.created_at());
        }

        let mut stamp = Utc::now().trunc_subsecs(6);
        if let Some(last) = self.last_stamp {
            if stamp <= last {
                stamp = last + Duration::microseconds(1);
            }
        }
        self.last_stamp = Some(stamp);
        Ok(BackupId::at(stamp))
    }

    /// Delete every slot beyond the newest `retention`. Individual delete
    /// failures are logged and skipped.
    async fn prune(&self) -> Result<usize, BackupError> {
        let mut ids = self.slot_ids().await?;
        ids.sort_by(|a, b| b.cmp(a));

        let mut removed = 0;
        for id in ids.into_iter().skip(self.retention) {
            let path = self.path_of(&id);
            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "failed to delete old backup")
                }
            }
        }
        Ok(removed)
    }

    async fn slot_ids(&self) -> Result<Vec<BackupId>, BackupError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(BackupError::io(&self.dir, err)),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BackupError::io(&self.dir, e))?
        {
            if let Some(id) = entry.file_name().to_str().and_then(BackupId::parse) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// All slots, newest first.
    pub async fn list(&self) -> Result<Vec<BackupInfo>, BackupError> {
        let mut ids = self.slot_ids().await?;
        ids.sort_by(|a, b| b.cmp(a));

        let mut infos = Vec::with_capacity(ids.len());
        for id in ids {
            let path = self.path_of(&id);
            let meta = fs::metadata(&path)
                .await
                .map_err(|e| BackupError::io(&path, e))?;
            infos.push(BackupInfo {
                created_at: id.created_at(),
                size: meta.len(),
                id,
            });
        }
        Ok(infos)
    }

    /// Raw bytes of one slot.
    pub async fn load(&self, id: &BackupId) -> Result<Vec<u8>, BackupError> {
        let path = self.path_of(id);
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(BackupError::NotFound(id.to_string()))
            }
            Err(err) => Err(BackupError::io(path, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(retention: usize) -> (TempDir, BackupManager) {
        let tmp = TempDir::new().unwrap();
        let manager = BackupManager::new(
            tmp.path().join("content.json"),
            tmp.path().join("backups"),
            retention,
        );
        (tmp, manager)
    }

    #[test]
    fn backup_id_format() {
        let stamp = DateTime::parse_from_rfc3339("2025-03-01T10:15:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        let id = BackupId::at(stamp);
        assert_eq!(id.as_str(), "content-2025-03-01T10-15-00-123456Z.json");
        assert_eq!(id.created_at(), Some(stamp));
        assert_eq!(BackupId::parse(id.as_str()), Some(id));
    }

    #[test]
    fn backup_id_rejects_foreign_names() {
        assert_eq!(BackupId::parse("../content.json"), None);
        assert_eq!(BackupId::parse("content-../../etc/passwd.json"), None);
        assert_eq!(BackupId::parse("content-2025-03-01.json"), None);
        assert_eq!(BackupId::parse("notes.txt"), None);
    }

    #[tokio::test]
    async fn snapshot_without_primary_is_none() {
        let (tmp, mut manager) = setup(10);
        assert_eq!(manager.snapshot().await, None);
        assert!(!tmp.path().join("backups").exists());
    }

    #[tokio::test]
    async fn snapshot_copies_bytes_unmodified() {
        let (tmp, mut manager) = setup(10);
        let original = b"{ \"version\": \"2.0.0\" }\n";
        std::fs::write(tmp.path().join("content.json"), original).unwrap();

        let id = manager.snapshot().await.unwrap();
        let copied = std::fs::read(manager.path_of(&id)).unwrap();
        assert_eq!(copied, original);
        assert_eq!(manager.load(&id).await.unwrap(), original);
    }

    #[tokio::test]
    async fn snapshots_are_strictly_increasing_and_pruned() {
        let (tmp, mut manager) = setup(10);
        std::fs::write(tmp.path().join("content.json"), b"{}").unwrap();

        let mut created = Vec::new();
        for _ in 0..15 {
            created.push(manager.snapshot().await.unwrap());
        }
        for pair in created.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }

        let listed: Vec<BackupId> = manager.list().await.unwrap().into_iter().map(|b| b.id).collect();
        let expected: Vec<BackupId> = created.iter().rev().take(10).cloned().collect();
        assert_eq!(listed, expected);
    }

    #[tokio::test]
    async fn prune_ignores_unrelated_files() {
        let (tmp, mut manager) = setup(2);
        std::fs::write(tmp.path().join("content.json"), b"{}").unwrap();
        std::fs::create_dir_all(tmp.path().join("backups")).unwrap();
        std::fs::write(tmp.path().join("backups").join("README"), b"keep me").unwrap();

        for _ in 0..4 {
            manager.snapshot().await.unwrap();
        }
        assert_eq!(manager.list().await.unwrap().len(), 2);
        assert!(tmp.path().join("backups").join("README").exists());
    }

    #[tokio::test]
    async fn stamps_continue_after_existing_slots() {
        let (tmp, mut manager) = setup(10);
        std::fs::write(tmp.path().join("content.json"), b"{}").unwrap();
        std::fs::create_dir_all(tmp.path().join("backups")).unwrap();
        let future = "content-2999-01-01T00-00-00-000000Z.json";
        std::fs::write(tmp.path().join("backups").join(future), b"{}").unwrap();

        let id = manager.snapshot().await.unwrap();
        assert!(id.as_str() > future);
    }

    #[tokio::test]
    async fn load_missing_slot() {
        let (_tmp, manager) = setup(10);
        let id = BackupId::parse("content-2025-01-01T00-00-00-000000Z.json").unwrap();
        assert!(matches!(manager.load(&id).await, Err(BackupError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_without_directory_is_empty() {
        let (_tmp, manager) = setup(10);
        assert!(manager.list().await.unwrap().is_empty());
    }
}
