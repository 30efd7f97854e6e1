//! Schema generation detection and the legacy (generation 1) document shape.
//!
//! A JSON value read from disk is classified exactly once into
//! [`StoredDocument`]; downstream code matches on the variant instead of
//! probing for a `version` field again.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("document must be a JSON object")]
    NotAnObject,
    #[error("unsupported document version `{0}`")]
    UnsupportedVersion(String),
    #[error("document has no recognizable legacy shape: {0}")]
    LegacyShape(#[source] serde_json::Error),
}

/// A document as found on disk, tagged with its schema generation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDocument {
    /// Generation 1: no `version` field, or a `1.x` version.
    Legacy(LegacyDocument),
    /// Generation 2: left as raw JSON until validated.
    Current(Value),
}

impl StoredDocument {
    pub fn classify(value: Value) -> Result<Self, GenerationError> {
        let version = match value.as_object() {
            Some(map) => map.get("version").cloned(),
            None => return Err(GenerationError::NotAnObject),
        };

        match version {
            None => Self::legacy(value),
            Some(Value::String(v)) => match major_version(&v) {
                Some(1) => Self::legacy(value),
                Some(2) => Ok(StoredDocument::Current(value)),
                _ => Err(GenerationError::UnsupportedVersion(v)),
            },
            Some(other) => Err(GenerationError::UnsupportedVersion(other.to_string())),
        }
    }

    fn legacy(value: Value) -> Result<Self, GenerationError> {
        serde_json::from_value(value)
            .map(StoredDocument::Legacy)
            .map_err(GenerationError::LegacyShape)
    }
}

/// Leading numeric component of a dotted version string.
pub fn major_version(version: &str) -> Option<u64> {
    version.trim().split('.').next()?.parse().ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDocument {
    #[serde(default)]
    pub hero: Vec<LegacyHero>,
    #[serde(default)]
    pub services: Vec<LegacyService>,
    #[serde(default)]
    pub articles: Vec<LegacyArticle>,
    #[serde(default)]
    pub stats: Vec<LegacyStat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyHero {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Service features were stored either as a list or as one comma-joined string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LegacyFeatures {
    List(Vec<String>),
    Joined(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyService {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<Number>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<LegacyFeatures>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Free-form date; both RFC 3339 and plain `YYYY-MM-DD` occur.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyStat {
    #[serde(default)]
    pub label: String,
    /// Display value with its unit glued on, e.g. `"85%"` or `"2.5x"`.
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_missing_version_as_legacy() {
        let doc = StoredDocument::classify(json!({
            "hero": [{"title": "A", "subtitle": "B", "image": "/x.jpg"}],
            "services": [{"title": "S", "description": "D", "features": "a, b"}]
        }))
        .unwrap();

        match doc {
            StoredDocument::Legacy(legacy) => {
                assert_eq!(legacy.hero[0].image.as_deref(), Some("/x.jpg"));
                assert_eq!(
                    legacy.services[0].features,
                    Some(LegacyFeatures::Joined("a, b".into()))
                );
                assert!(legacy.articles.is_empty());
            }
            other => panic!("expected legacy, got {other:?}"),
        }
    }

    #[test]
    fn classify_v1_version_as_legacy() {
        let doc = StoredDocument::classify(json!({"version": "1.0.0", "hero": []})).unwrap();
        assert!(matches!(doc, StoredDocument::Legacy(_)));
    }

    #[test]
    fn classify_v2_as_current() {
        let value = json!({"version": "2.0.0", "data": {}});
        let doc = StoredDocument::classify(value.clone()).unwrap();
        assert_eq!(doc, StoredDocument::Current(value));
    }

    #[test]
    fn classify_rejects_unknown_versions() {
        assert!(matches!(
            StoredDocument::classify(json!({"version": "3.1.0"})),
            Err(GenerationError::UnsupportedVersion(v)) if v == "3.1.0"
        ));
        assert!(matches!(
            StoredDocument::classify(json!({"version": 2})),
            Err(GenerationError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            StoredDocument::classify(json!([1, 2])),
            Err(GenerationError::NotAnObject)
        ));
    }

    #[test]
    fn classify_rejects_bad_legacy_shape() {
        let err = StoredDocument::classify(json!({"hero": "nope"})).unwrap_err();
        assert!(matches!(err, GenerationError::LegacyShape(_)));
    }

    #[test]
    fn legacy_stat_value_accepts_numbers() {
        let stat: LegacyStat =
            serde_json::from_value(json!({"label": "Farms", "value": 120, "description": "d"}))
                .unwrap();
        assert_eq!(stat.value, "120");
    }

    #[test]
    fn major_version_parsing() {
        assert_eq!(major_version("2.0.0"), Some(2));
        assert_eq!(major_version(" 1 "), Some(1));
        assert_eq!(major_version("v2"), None);
    }
}
