//! Structural validation of current-generation content documents.
//!
//! Validation is pure: it inspects a borrowed JSON value and reports the
//! first rule that fails. Cross-item invariants such as duplicate ids are
//! not checked.

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use super::generation::major_version;
use super::section::Section;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("document must be a JSON object")]
    NotAnObject,
    #[error("document field `{0}` is required")]
    MissingField(&'static str),
    #[error("unsupported document version `{0}`")]
    UnsupportedVersion(String),
    #[error("section `{0}` must be an array")]
    NotAnArray(Section),
    #[error("{section}[{index}] must be an object")]
    ItemNotAnObject { section: Section, index: usize },
    #[error("{section}[{index}].{field} is required and cannot be empty")]
    EmptyField {
        section: Section,
        index: usize,
        field: &'static str,
    },
    #[error("{section}[{index}].step must be a number")]
    NonNumericStep { section: Section, index: usize },
    #[error("{section}[{index}].updatedAt precedes createdAt")]
    TimestampsOutOfOrder { section: Section, index: usize },
}

/// Returns true when `doc` satisfies every structural rule.
pub fn validate(doc: &Value) -> bool {
    check(doc).is_ok()
}

/// Validate a document, reporting the first violated rule.
pub fn check(doc: &Value) -> Result<(), ValidationError> {
    let root = doc.as_object().ok_or(ValidationError::NotAnObject)?;

    let version = match root.get("version") {
        Some(Value::String(v)) if !v.trim().is_empty() => v,
        _ => return Err(ValidationError::MissingField("version")),
    };
    if major_version(version) != Some(2) {
        return Err(ValidationError::UnsupportedVersion(version.clone()));
    }

    let data = match root.get("data") {
        Some(Value::Object(data)) => data,
        _ => return Err(ValidationError::MissingField("data")),
    };

    for section in Section::ALL {
        let items = data
            .get(section.as_str())
            .and_then(Value::as_array)
            .ok_or(ValidationError::NotAnArray(section))?;
        for (index, item) in items.iter().enumerate() {
            check_item(section, index, item)?;
        }
    }
    Ok(())
}

fn check_item(section: Section, index: usize, item: &Value) -> Result<(), ValidationError> {
    if !item.is_object() {
        return Err(ValidationError::ItemNotAnObject { section, index });
    }

    for &field in section.required_fields() {
        if !has_text(item, field) {
            return Err(ValidationError::EmptyField {
                section,
                index,
                field,
            });
        }
    }

    if section == Section::Services && !item.get("step").is_some_and(Value::is_number) {
        return Err(ValidationError::NonNumericStep { section, index });
    }

    if let (Some(created), Some(updated)) = (timestamp(item, "createdAt"), timestamp(item, "updatedAt")) {
        if updated < created {
            return Err(ValidationError::TimestampsOutOfOrder { section, index });
        }
    }
    Ok(())
}

/// Resolve a dotted field name and require a non-blank string there.
fn has_text(item: &Value, field: &str) -> bool {
    let pointer = format!("/{}", field.replace('.', "/"));
    matches!(item.pointer(&pointer), Some(Value::String(s)) if !s.trim().is_empty())
}

fn timestamp(item: &Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = item.get(field)?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
