use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use site_content_core::Section;

/// A secondary content source consulted by handlers when a local section is
/// empty. The store never reads from it; handlers decide precedence.
pub trait FallbackSource: Send + Sync {
    /// Label reported to clients in the `source` field.
    fn name(&self) -> &str;

    fn section(&self, section: Section) -> Vec<Value>;
}

#[derive(Debug, thiserror::Error)]
pub enum FallbackError {
    #[error("failed to read fallback content: {0}")]
    Io(#[from] std::io::Error),
    #[error("fallback content is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fallback section `{0}` must be an array")]
    NotAnArray(Section),
}

/// Fallback content exported from the hosted CMS into a JSON file, loaded
/// once at startup. Accepts the four sections at the top level or under
/// `data`.
#[derive(Debug, Default)]
pub struct JsonFileFallback {
    sections: HashMap<Section, Vec<Value>>,
}

impl JsonFileFallback {
    pub fn load(path: &Path) -> Result<Self, FallbackError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_value(serde_json::from_str(&raw)?)
    }

    pub fn from_value(value: Value) -> Result<Self, FallbackError> {
        let root = value.get("data").unwrap_or(&value);
        let mut sections = HashMap::new();
        for section in Section::ALL {
            match root.get(section.as_str()) {
                None | Some(Value::Null) => {}
                Some(Value::Array(items)) => {
                    sections.insert(section, items.clone());
                }
                Some(_) => return Err(FallbackError::NotAnArray(section)),
            }
        }
        Ok(Self { sections })
    }
}

impl FallbackSource for JsonFileFallback {
    fn name(&self) -> &str {
        "fallback"
    }

    fn section(&self, section: Section) -> Vec<Value> {
        self.sections.get(&section).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_top_level_and_nested_sections() {
        let flat = JsonFileFallback::from_value(json!({"hero": [{"title": "CMS"}]})).unwrap();
        assert_eq!(flat.section(Section::Hero).len(), 1);
        assert!(flat.section(Section::Stats).is_empty());

        let nested =
            JsonFileFallback::from_value(json!({"data": {"stats": [{"label": "x"}, {"label": "y"}]}}))
                .unwrap();
        assert_eq!(nested.section(Section::Stats).len(), 2);
    }

    #[test]
    fn rejects_non_array_sections() {
        let err = JsonFileFallback::from_value(json!({"articles": {}})).unwrap_err();
        assert!(matches!(err, FallbackError::NotAnArray(Section::Articles)));
    }
}
