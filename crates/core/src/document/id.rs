//! Item id conventions.
//!
//! Ids written by the admin UI are opaque. Ids synthesized during legacy
//! migration follow `{prefix}-migrated-{uuid}`, where the prefix is the
//! singular section name and the uuid is a v7 (time-ordered, collision-free).
//! Migrated ids are not stable: migrating the same legacy document twice
//! yields different ids.

use uuid::Uuid;

use super::section::Section;

const MIGRATED_TAG: &str = "migrated";

/// Synthesize a fresh migration-tagged id for an item of `section`.
pub fn migrated_id(section: Section) -> String {
    format!("{}-{MIGRATED_TAG}-{}", section.id_prefix(), Uuid::now_v7())
}
