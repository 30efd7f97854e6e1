//! Durable storage for the marketing site's structured content.
//!
//! The [`store::ContentStore`] is the only entry point the presentation layer
//! uses: it loads (initializing or migrating on first use) and writes one
//! JSON document per site, snapshotting the previous version before every
//! write.

pub mod defaults;
pub mod document;
pub mod events;
pub mod migrate;
pub mod store;

pub use document::{ContentDocument, Section, SiteContent, ValidationError};
pub use store::{ContentStore, StoreConfig, StoreError, WriteOutcome};
