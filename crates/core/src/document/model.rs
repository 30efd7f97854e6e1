use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

use super::section::Section;
use super::validate::{self, ValidationError};

/// Schema generation written by this crate.
pub const CURRENT_VERSION: &str = "2.0.0";

const LAST_UPDATED: &str = "lastUpdated";

/// A document that passed [`validate::check`], held as the JSON it arrived
/// in. Nothing beyond what the validator checks is interpreted, so fields it
/// does not look at are stored and served back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ContentDocument(Map<String, Value>);

impl ContentDocument {
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        validate::check(&value)?;
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ValidationError::NotAnObject),
        }
    }

    pub fn version(&self) -> &str {
        self.0.get("version").and_then(Value::as_str).unwrap_or_default()
    }

    /// `None` when the field is absent or not an RFC 3339 timestamp.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        let raw = self.0.get(LAST_UPDATED)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    pub(crate) fn stamp(&mut self, at: DateTime<Utc>) {
        self.0.insert(LAST_UPDATED.to_string(), json!(at));
    }

    /// Items of one section, in document order.
    pub fn section(&self, section: Section) -> &[Value] {
        self.0
            .get("data")
            .and_then(|data| data.get(section.as_str()))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn section_len(&self, section: Section) -> usize {
        self.section(section).len()
    }
}

/// Typed form of a current-generation document, produced by the migrator
/// and the default content provider. Items keep unknown fields in a
/// flattened `extra` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    /// Self-describing field map. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    pub data: SiteData,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub settings: Map<String, Value>,
}

impl SiteContent {
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteData {
    pub hero: Vec<HeroItem>,
    pub services: Vec<ServiceItem>,
    pub articles: Vec<ArticleItem>,
    pub stats: Vec<StatItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroItem {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub image: MediaImage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: String,
    pub step: Number,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub meta_title: String,
    pub meta_description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo: Option<Seo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<MediaImage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub direction: TrendDirection,
    pub percentage: Number,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatItem {
    pub id: String,
    pub label: String,
    pub value: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Build the `schema` map stored alongside current-generation documents.
pub fn schema_descriptor() -> Value {
    let mut map = Map::new();
    for section in Section::ALL {
        map.insert(
            section.as_str().to_string(),
            json!({
                "required": section.required_fields(),
                "optional": section.optional_fields(),
            }),
        );
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Value {
        json!({
            "version": "2.0.0",
            "lastUpdated": "2025-03-01T10:00:00Z",
            "data": {
                "hero": [{
                    "id": "hero-1",
                    "title": "Cut methane",
                    "subtitle": "At the source",
                    "image": {"url": "/hero.jpg", "alt": "Cows"},
                    "ctaVariant": "primary"
                }],
                "services": [{
                    "id": "service-1",
                    "step": 1,
                    "title": "Assess",
                    "description": "Baseline emissions"
                }],
                "articles": [],
                "stats": [{
                    "id": "stat-1",
                    "label": "Reduction",
                    "value": "30",
                    "unit": "%",
                    "description": "Average"
                }]
            },
            "settings": {"categories": ["News"]}
        })
    }

    #[test]
    fn from_value_keeps_the_document_verbatim() {
        let mut value = sample();
        value["layout"] = json!({"theme": "dark"});
        value["data"]["faq"] = json!([{"q": "Why?"}]);
        value["data"]["stats"][0]["trend"] = json!({"direction": "up", "percentage": 5, "period": "q1"});
        value["data"]["services"][0]["publishedAt"] = json!("2024-03-15");

        let doc = ContentDocument::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&doc).unwrap(), value);
    }

    #[test]
    fn fields_the_validator_ignores_are_not_interpreted() {
        let mut value = sample();
        value["data"]["hero"][0]["status"] = json!("scheduled");
        value["data"]["hero"][0]["priority"] = json!(-1);
        value["lastUpdated"] = json!("yesterday");

        let doc = ContentDocument::from_value(value).unwrap();
        assert_eq!(doc.last_updated(), None);
        assert_eq!(doc.section(Section::Hero)[0]["status"], json!("scheduled"));
    }

    #[test]
    fn stamp_sets_last_updated() {
        let mut doc = ContentDocument::from_value(sample()).unwrap();
        assert_eq!(doc.version(), "2.0.0");
        assert_eq!(
            doc.last_updated().map(|t| t.to_rfc3339()),
            Some("2025-03-01T10:00:00+00:00".to_string())
        );

        let now = Utc::now();
        doc.stamp(now);
        assert_eq!(doc.last_updated(), Some(now));
    }

    #[test]
    fn sections_preserve_order() {
        let doc = ContentDocument::from_value(sample()).unwrap();
        let stats = doc.section(Section::Stats);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0]["id"], json!("stat-1"));
        assert_eq!(doc.section_len(Section::Articles), 0);
    }

    #[test]
    fn site_content_omits_empty_collections() {
        let content = SiteContent {
            version: CURRENT_VERSION.to_string(),
            last_updated: Utc::now(),
            schema: None,
            data: SiteData {
                services: vec![ServiceItem {
                    id: "service-1".into(),
                    step: Number::from(1),
                    title: "Assess".into(),
                    description: "Baseline".into(),
                    features: Vec::new(),
                    icon: None,
                    status: None,
                    created_at: None,
                    updated_at: None,
                    extra: Map::new(),
                }],
                ..SiteData::default()
            },
            settings: Map::new(),
        };
        let value = content.to_value().unwrap();
        assert!(value.get("settings").is_none());
        assert!(value["data"]["services"][0].get("features").is_none());
        assert!(validate::validate(&value));
    }

    #[test]
    fn schema_descriptor_lists_every_section() {
        let schema = schema_descriptor();
        for section in Section::ALL {
            assert!(schema[section.as_str()]["required"].is_array());
        }
        assert_eq!(schema["hero"]["required"][3], json!("image.url"));
    }
}
