pub mod generation;
pub mod id;
pub mod model;
pub mod section;
pub mod validate;

pub use generation::{LegacyDocument, StoredDocument};
pub use model::{ContentDocument, SiteContent, CURRENT_VERSION};
pub use section::Section;
pub use validate::{validate, ValidationError};
