//! The site content store.
//!
//! One JSON document per site. Reads of an existing document take no lock;
//! everything that mutates the primary document or the backup directory runs
//! behind a single async mutex that owns the [`BackupManager`].

pub mod backup;
pub mod config;
pub mod error;

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::defaults::default_document;
use crate::document::generation::StoredDocument;
use crate::document::model::{ContentDocument, SiteContent};
use crate::document::section::Section;
use crate::events::bus::EventBus;
use crate::events::types::{ContentEvent, InitOrigin, InitializedEvent, RestoredEvent, SavedEvent};
use crate::migrate::{migrate, migrate_at};

pub use backup::{BackupId, BackupInfo, BackupManager, DEFAULT_RETENTION};
pub use config::StoreConfig;
pub use error::{MigrationError, Result, StoreError};

/// Result of a successful write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    pub last_updated: DateTime<Utc>,
    /// Slot holding the document that was replaced, if one was taken.
    pub backup_id: Option<BackupId>,
}

pub struct ContentStore {
    config: StoreConfig,
    writer: Mutex<BackupManager>,
    events: EventBus,
}

impl ContentStore {
    pub fn new(config: StoreConfig, events: EventBus) -> Self {
        let backups = BackupManager::new(
            config.content_path.clone(),
            config.backup_dir.clone(),
            config.retention,
        );
        Self {
            config,
            writer: Mutex::new(backups),
            events,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Load the primary document, creating it on first use.
    ///
    /// A missing primary document is migrated from the legacy document when
    /// one exists and built from defaults otherwise; either way the result is
    /// persisted so this happens once. A primary document that fails
    /// validation is reported as corrupt, never repaired.
    pub async fn read(&self) -> Result<ContentDocument> {
        if let Some(StoredDocument::Current(value)) = self.load_primary().await? {
            return self.checked_primary(value);
        }

        let mut backups = self.writer.lock().await;
        // Another caller may have initialized while we waited.
        match self.load_primary().await? {
            Some(StoredDocument::Current(value)) => self.checked_primary(value),
            Some(StoredDocument::Legacy(legacy)) => {
                tracing::info!(
                    path = %self.config.content_path.display(),
                    "primary document uses the legacy schema, migrating in place"
                );
                let doc = ContentDocument::from_value(migrate(&legacy).to_value()?)
                    .map_err(MigrationError::Invalid)?;
                let (doc, outcome) = self.commit(&mut backups, doc).await?;
                self.emit(ContentEvent::Saved(SavedEvent {
                    last_updated: outcome.last_updated,
                    backup_id: outcome.backup_id.as_ref().map(ToString::to_string),
                }));
                Ok(doc)
            }
            None => self.initialize().await,
        }
    }

    /// Validate `doc`, back up the current file and persist `doc` as the new
    /// primary document.
    ///
    /// A document that fails validation leaves storage untouched. A failed
    /// backup is logged and does not stop the write; a failed persist is
    /// returned.
    pub async fn write(&self, doc: Value) -> Result<WriteOutcome> {
        let doc = ContentDocument::from_value(doc).map_err(|err| {
            tracing::debug!(error = %err, "rejected content write");
            err
        })?;

        let mut backups = self.writer.lock().await;
        let (_, outcome) = self.commit(&mut backups, doc).await?;
        self.emit(ContentEvent::Saved(SavedEvent {
            last_updated: outcome.last_updated,
            backup_id: outcome.backup_id.as_ref().map(ToString::to_string),
        }));
        Ok(outcome)
    }

    /// Typed variant of [`write`](Self::write).
    pub async fn write_document(&self, doc: &SiteContent) -> Result<WriteOutcome> {
        self.write(doc.to_value()?).await
    }

    /// Items of one section, in document order.
    pub async fn section(&self, section: Section) -> Result<Vec<Value>> {
        Ok(self.read().await?.section(section).to_vec())
    }

    /// Backup slots, newest first.
    pub async fn backups(&self) -> Result<Vec<BackupInfo>> {
        let backups = self.writer.lock().await;
        Ok(backups.list().await?)
    }

    /// Replace the primary document with the contents of a backup slot.
    ///
    /// The document it replaces is itself backed up. A slot that no longer
    /// parses or validates is reported as corrupt.
    pub async fn restore(&self, id: &str) -> Result<WriteOutcome> {
        let id = BackupId::parse(id).ok_or_else(|| StoreError::InvalidBackupId(id.to_string()))?;

        let mut backups = self.writer.lock().await;
        let bytes = backups.load(&id).await?;
        let slot_path = backups.path_of(&id);
        let corrupt = |reason: String| StoreError::Corrupt {
            path: slot_path.clone(),
            reason,
        };

        let value: Value = serde_json::from_slice(&bytes).map_err(|e| corrupt(e.to_string()))?;
        let value = match StoredDocument::classify(value).map_err(|e| corrupt(e.to_string()))? {
            StoredDocument::Current(value) => value,
            StoredDocument::Legacy(legacy) => migrate(&legacy).to_value()?,
        };
        let doc = ContentDocument::from_value(value).map_err(|e| corrupt(e.to_string()))?;

        let (_, outcome) = self.commit(&mut backups, doc).await?;
        tracing::info!(restored_from = %id, "restored content from backup");
        self.emit(ContentEvent::Restored(RestoredEvent {
            restored_from: id.to_string(),
            last_updated: outcome.last_updated,
            backup_id: outcome.backup_id.as_ref().map(ToString::to_string),
        }));
        Ok(outcome)
    }

    /// Back up, stamp, persist. Caller holds the write lock.
    async fn commit(
        &self,
        backups: &mut BackupManager,
        mut doc: ContentDocument,
    ) -> Result<(ContentDocument, WriteOutcome)> {
        let backup_id = backups.snapshot().await;

        let now = Utc::now();
        doc.stamp(now);
        self.persist(&doc).await?;

        tracing::info!(
            last_updated = %now,
            backup = backup_id.as_ref().map(BackupId::as_str).unwrap_or("none"),
            "saved content"
        );
        let outcome = WriteOutcome {
            last_updated: now,
            backup_id,
        };
        Ok((doc, outcome))
    }

    /// Materialize a missing primary document. Caller holds the write lock.
    async fn initialize(&self) -> Result<ContentDocument> {
        let now = Utc::now();
        let (mut doc, origin) = match self.load_legacy().await? {
            Some(StoredDocument::Legacy(legacy)) => {
                let doc = ContentDocument::from_value(migrate_at(&legacy, now).to_value()?)
                    .map_err(MigrationError::Invalid)?;
                (doc, InitOrigin::Migrated)
            }
            Some(StoredDocument::Current(value)) => {
                let doc = ContentDocument::from_value(value).map_err(MigrationError::Invalid)?;
                (doc, InitOrigin::Imported)
            }
            None => {
                let doc = ContentDocument::from_value(default_document(now).to_value()?)?;
                (doc, InitOrigin::Defaulted)
            }
        };
        if doc.last_updated().is_none() {
            doc.stamp(now);
        }

        self.persist(&doc).await?;
        tracing::info!(
            origin = ?origin,
            path = %self.config.content_path.display(),
            "initialized content document"
        );
        self.emit(ContentEvent::Initialized(InitializedEvent {
            origin,
            timestamp: now,
        }));
        Ok(doc)
    }

    /// Publish to whoever is listening; having no subscribers is normal.
    fn emit(&self, event: ContentEvent) {
        if let Err(err) = self.events.publish(event) {
            tracing::trace!(event = ?err.0, "no content event subscribers");
        }
    }

    async fn load_primary(&self) -> Result<Option<StoredDocument>> {
        let path = &self.config.content_path;
        let Some(bytes) = read_optional(path).await? else {
            return Ok(None);
        };
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| self.corrupt(e.to_string()))?;
        StoredDocument::classify(value)
            .map(Some)
            .map_err(|e| self.corrupt(e.to_string()))
    }

    async fn load_legacy(&self) -> Result<Option<StoredDocument>> {
        let path = &self.config.legacy_path;
        let Some(bytes) = read_optional(path).await? else {
            return Ok(None);
        };
        let value: Value = serde_json::from_slice(&bytes).map_err(|source| MigrationError::Parse {
            path: path.clone(),
            source,
        })?;
        let doc = StoredDocument::classify(value).map_err(|source| MigrationError::Shape {
            path: path.clone(),
            source,
        })?;
        Ok(Some(doc))
    }

    fn checked_primary(&self, value: Value) -> Result<ContentDocument> {
        ContentDocument::from_value(value).map_err(|e| self.corrupt(e.to_string()))
    }

    fn corrupt(&self, reason: impl Into<String>) -> StoreError {
        StoreError::Corrupt {
            path: self.config.content_path.clone(),
            reason: reason.into(),
        }
    }

    /// Write to a temporary sibling and rename it over the primary document,
    /// so readers see either the old or the new file.
    async fn persist(&self, doc: &ContentDocument) -> Result<()> {
        let path = &self.config.content_path;
        let mut bytes = serde_json::to_vec_pretty(doc)?;
        bytes.push(b'\n');

        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = dir {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("content.json");
        let tmp = path.with_file_name(format!(".{file_name}-{}.tmp", Uuid::new_v4()));

        if let Err(err) = write_synced(&tmp, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(&tmp, err));
        }
        if let Err(err) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(StoreError::io(path, err));
        }
        Ok(())
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(path, err)),
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
