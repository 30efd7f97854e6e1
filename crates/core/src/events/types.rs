use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted after the primary document changes, consumed by cache
/// invalidation and page revalidation listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentEvent {
    Initialized(InitializedEvent),
    Saved(SavedEvent),
    Restored(RestoredEvent),
}

/// How a missing primary document was first materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitOrigin {
    /// Migrated from a generation 1 document.
    Migrated,
    /// A current-generation document found at the legacy path, adopted as is.
    Imported,
    /// Built from the default content.
    Defaulted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializedEvent {
    pub origin: InitOrigin,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedEvent {
    pub last_updated: DateTime<Utc>,
    pub backup_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoredEvent {
    pub restored_from: String,
    pub last_updated: DateTime<Utc>,
    pub backup_id: Option<String>,
}
