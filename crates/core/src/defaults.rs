use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::document::model::{schema_descriptor, SiteContent, SiteData, CURRENT_VERSION};

/// Article categories offered by the admin UI out of the box.
pub const DEFAULT_CATEGORIES: [&str; 4] = ["Research", "Technology", "Sustainability", "News"];

/// Settings written into freshly created and migrated documents.
pub fn default_settings() -> Map<String, Value> {
    let mut settings = Map::new();
    settings.insert("categories".into(), json!(DEFAULT_CATEGORIES));
    settings.insert(
        "backup".into(),
        json!({ "enabled": true, "maxBackups": crate::store::backup::DEFAULT_RETENTION }),
    );
    settings
}

/// The zero-state document used when neither a primary nor a legacy
/// document exists.
pub fn default_document(now: DateTime<Utc>) -> SiteContent {
    SiteContent {
        version: CURRENT_VERSION.to_string(),
        last_updated: now,
        schema: Some(schema_descriptor()),
        data: SiteData::default(),
        settings: default_settings(),
    }
}
