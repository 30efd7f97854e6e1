//! One-way migration from the generation 1 document shape to generation 2.
//!
//! Migration never mutates its input. Apart from synthesized ids and the
//! "now" timestamp, the output is a pure function of the legacy document.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Number;

use crate::defaults::default_settings;
use crate::document::generation::{
    LegacyArticle, LegacyDocument, LegacyFeatures, LegacyHero, LegacyService, LegacyStat,
};
use crate::document::id::migrated_id;
use crate::document::model::{
    schema_descriptor, ArticleItem, Author, ContentStatus, HeroItem, MediaImage, Seo,
    ServiceItem, SiteContent, SiteData, StatItem, Trend, TrendDirection, CURRENT_VERSION,
};
use crate::document::section::Section;

pub const HERO_IMAGE_WIDTH: u32 = 1920;
pub const HERO_IMAGE_HEIGHT: u32 = 1080;

const SERVICE_ICONS: [&str; 4] = ["🔍", "🧪", "🌱", "📊"];
const DEFAULT_SERVICE_ICON: &str = "⚙️";
const STAT_ICONS: [&str; 4] = ["📉", "🐄", "🌍", "🏭"];
const DEFAULT_STAT_ICON: &str = "📊";

const DEFAULT_CATEGORY: &str = "General";
const DEFAULT_AUTHOR: &str = "Editorial Team";
const DEFAULT_TREND_PERIOD: &str = "vs last year";
const EXCERPT_CHARS: usize = 160;

/// Migrate a legacy document, stamping items with the current time.
pub fn migrate(legacy: &LegacyDocument) -> SiteContent {
    migrate_at(legacy, Utc::now())
}

pub fn migrate_at(legacy: &LegacyDocument, now: DateTime<Utc>) -> SiteContent {
    let data = SiteData {
        hero: legacy
            .hero
            .iter()
            .enumerate()
            .map(|(i, h)| migrate_hero(i, h, now))
            .collect(),
        services: legacy
            .services
            .iter()
            .enumerate()
            .map(|(i, s)| migrate_service(i, s, now))
            .collect(),
        articles: legacy
            .articles
            .iter()
            .map(|a| migrate_article(a, now))
            .collect(),
        stats: legacy
            .stats
            .iter()
            .enumerate()
            .map(|(i, s)| migrate_stat(i, s, now))
            .collect(),
    };

    tracing::debug!(
        hero = data.hero.len(),
        services = data.services.len(),
        articles = data.articles.len(),
        stats = data.stats.len(),
        "migrated legacy content"
    );

    SiteContent {
        version: CURRENT_VERSION.to_string(),
        last_updated: now,
        schema: Some(schema_descriptor()),
        data,
        settings: default_settings(),
    }
}

fn migrate_hero(index: usize, legacy: &LegacyHero, now: DateTime<Utc>) -> HeroItem {
    HeroItem {
        id: migrated_id(Section::Hero),
        title: legacy.title.clone(),
        subtitle: legacy.subtitle.clone(),
        image: MediaImage {
            url: legacy.image.clone().unwrap_or_default(),
            alt: Some(legacy.title.clone()),
            width: Some(HERO_IMAGE_WIDTH),
            height: Some(HERO_IMAGE_HEIGHT),
        },
        button_text: legacy.button_text.clone(),
        button_link: legacy.button_link.clone(),
        priority: Some(index as u32 + 1),
        status: Some(ContentStatus::Published),
        created_at: Some(now),
        updated_at: Some(now),
        extra: legacy.extra.clone(),
    }
}

fn migrate_service(index: usize, legacy: &LegacyService, now: DateTime<Utc>) -> ServiceItem {
    let features = match &legacy.features {
        Some(LegacyFeatures::List(list)) => list.clone(),
        Some(LegacyFeatures::Joined(joined)) => split_features(joined),
        None => Vec::new(),
    };

    ServiceItem {
        id: migrated_id(Section::Services),
        step: legacy
            .step
            .clone()
            .unwrap_or_else(|| Number::from(index as u64 + 1)),
        title: legacy.title.clone(),
        description: legacy.description.clone(),
        features,
        icon: Some(positional_icon(&SERVICE_ICONS, DEFAULT_SERVICE_ICON, index)),
        status: Some(ContentStatus::Published),
        created_at: Some(now),
        updated_at: Some(now),
        extra: legacy.extra.clone(),
    }
}

fn migrate_article(legacy: &LegacyArticle, now: DateTime<Utc>) -> ArticleItem {
    let content = non_blank(legacy.content.as_deref())
        .or(non_blank(legacy.excerpt.as_deref()))
        .unwrap_or(&legacy.title)
        .to_string();
    let excerpt = non_blank(legacy.excerpt.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| excerpt_of(&content));
    let tags = legacy.tags.clone().unwrap_or_default();

    ArticleItem {
        id: migrated_id(Section::Articles),
        title: legacy.title.clone(),
        category: non_blank(legacy.category.as_deref())
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string(),
        slug: Some(
            legacy
                .slug
                .clone()
                .unwrap_or_else(|| slugify(&legacy.title)),
        ),
        seo: Some(Seo {
            meta_title: legacy.title.clone(),
            meta_description: excerpt.clone(),
            keywords: tags.clone(),
        }),
        excerpt: Some(excerpt),
        content,
        tags,
        published_at: Some(
            legacy
                .published_at
                .as_deref()
                .and_then(parse_loose_date)
                .unwrap_or(now),
        ),
        author: Some(Author {
            name: non_blank(legacy.author.as_deref())
                .unwrap_or(DEFAULT_AUTHOR)
                .to_string(),
            role: None,
            avatar: None,
        }),
        image: legacy.image.as_ref().map(|url| MediaImage {
            url: url.clone(),
            alt: Some(legacy.title.clone()),
            width: None,
            height: None,
        }),
        featured: legacy.featured,
        status: Some(ContentStatus::Published),
        created_at: Some(now),
        updated_at: Some(now),
        extra: legacy.extra.clone(),
    }
}

fn migrate_stat(index: usize, legacy: &LegacyStat, now: DateTime<Utc>) -> StatItem {
    let (value, unit) = split_stat_value(&legacy.value);

    StatItem {
        id: migrated_id(Section::Stats),
        label: legacy.label.clone(),
        value,
        description: legacy.description.clone(),
        unit,
        icon: Some(positional_icon(&STAT_ICONS, DEFAULT_STAT_ICON, index)),
        trend: Some(Trend {
            direction: TrendDirection::Stable,
            percentage: Number::from(0),
            period: DEFAULT_TREND_PERIOD.to_string(),
        }),
        status: Some(ContentStatus::Published),
        created_at: Some(now),
        updated_at: Some(now),
        extra: legacy.extra.clone(),
    }
}

fn split_features(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

fn positional_icon(table: &[&str], fallback: &str, index: usize) -> String {
    table.get(index).copied().unwrap_or(fallback).to_string()
}

/// Split a display value such as `"85%"` into its numeric part and unit by
/// character class. Digits and decimal points form the value, thousands
/// separators are dropped, and whatever else remains is the unit. A value
/// with no digits at all is kept whole.
pub fn split_stat_value(raw: &str) -> (String, Option<String>) {
    let raw = raw.trim();
    let (number, unit): (String, String) = raw
        .chars()
        .filter(|c| *c != ',')
        .partition(|c| c.is_ascii_digit() || *c == '.');

    if !number.chars().any(|c| c.is_ascii_digit()) {
        return (raw.to_string(), None);
    }
    let unit = unit.trim();
    let unit = (!unit.is_empty()).then(|| unit.to_string());
    (number, unit)
}

fn parse_loose_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

fn excerpt_of(content: &str) -> String {
    let trimmed = content.trim();
    match trimmed.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", trimmed[..cut].trim_end()),
        None => trimmed.to_string(),
    }
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::generation::StoredDocument;
    use crate::document::validate::validate;
    use serde_json::json;

    fn legacy(value: serde_json::Value) -> LegacyDocument {
        match StoredDocument::classify(value).unwrap() {
            StoredDocument::Legacy(doc) => doc,
            other => panic!("expected legacy document, got {other:?}"),
        }
    }

    fn example() -> LegacyDocument {
        legacy(json!({
            "hero": [{"title": "A", "subtitle": "B", "buttonText": "C", "image": "/x.jpg"}],
            "services": [],
            "articles": [],
            "stats": [{"label": "Rate", "value": "85%", "description": "d"}]
        }))
    }

    #[test]
    fn migrates_example_document() {
        let doc = migrate(&example());

        assert_eq!(doc.version, "2.0.0");
        let hero = &doc.data.hero[0];
        assert_eq!(hero.image.url, "/x.jpg");
        assert_eq!(hero.image.alt.as_deref(), Some("A"));
        assert_eq!(hero.image.width, Some(1920));
        assert_eq!(hero.image.height, Some(1080));
        assert!(!hero.id.is_empty());
        assert!(hero.id.starts_with("hero-migrated-"));
        assert_eq!(hero.priority, Some(1));
        assert_eq!(hero.status, Some(ContentStatus::Published));
        assert_eq!(hero.button_text.as_deref(), Some("C"));

        let stat = &doc.data.stats[0];
        assert_eq!(stat.value, "85");
        assert_eq!(stat.unit.as_deref(), Some("%"));
        assert_eq!(stat.icon.as_deref(), Some(STAT_ICONS[0]));
        let trend = stat.trend.as_ref().unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert_eq!(trend.percentage, Number::from(0));

        assert!(validate(&doc.to_value().unwrap()));
    }

    #[test]
    fn migration_does_not_touch_input() {
        let input = example();
        let before = input.clone();
        let _ = migrate(&input);
        assert_eq!(input, before);
    }

    #[test]
    fn migrating_twice_yields_valid_documents_with_fresh_ids() {
        let input = example();
        let first = migrate(&input);
        let second = migrate(&input);

        assert!(validate(&first.to_value().unwrap()));
        assert!(validate(&second.to_value().unwrap()));
        assert_ne!(first.data.hero[0].id, second.data.hero[0].id);
        assert_eq!(first.data.hero[0].title, second.data.hero[0].title);
    }

    #[test]
    fn service_features_and_icons() {
        let services: Vec<_> = (0..6)
            .map(|i| json!({"title": format!("S{i}"), "description": "d", "features": " a, ,b ,c,"}))
            .collect();
        let doc = migrate(&legacy(json!({ "services": services })));

        assert_eq!(doc.data.services[0].features, vec!["a", "b", "c"]);
        assert_eq!(doc.data.services[0].step, Number::from(1));
        assert_eq!(doc.data.services[3].icon.as_deref(), Some(SERVICE_ICONS[3]));
        assert_eq!(doc.data.services[4].icon.as_deref(), Some(DEFAULT_SERVICE_ICON));
        assert_eq!(doc.data.services[5].step, Number::from(6));

        let ids: std::collections::HashSet<_> =
            doc.data.services.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), 6);
    }

    #[test]
    fn service_feature_lists_pass_through() {
        let doc = migrate(&legacy(json!({
            "services": [{"step": 3, "title": "T", "description": "D", "features": ["x", "y"]}]
        })));
        assert_eq!(doc.data.services[0].features, vec!["x", "y"]);
        assert_eq!(doc.data.services[0].step, Number::from(3));
    }

    #[test]
    fn article_defaults() {
        let now = Utc::now();
        let doc = migrate_at(
            &legacy(json!({
                "articles": [{"title": "Seaweed Feed Trials", "content": "Trial results", "extraField": 1}]
            })),
            now,
        );
        let article = &doc.data.articles[0];

        assert_eq!(article.category, DEFAULT_CATEGORY);
        assert_eq!(article.excerpt.as_deref(), Some("Trial results"));
        assert!(article.tags.is_empty());
        assert_eq!(article.published_at, Some(now));
        assert_eq!(article.slug.as_deref(), Some("seaweed-feed-trials"));
        assert_eq!(article.author.as_ref().unwrap().name, DEFAULT_AUTHOR);
        let seo = article.seo.as_ref().unwrap();
        assert_eq!(seo.meta_title, "Seaweed Feed Trials");
        assert_eq!(seo.meta_description, "Trial results");
        assert_eq!(article.extra.get("extraField"), Some(&json!(1)));
        assert_eq!(article.status, Some(ContentStatus::Published));
    }

    #[test]
    fn article_content_falls_back_to_excerpt_then_title() {
        let doc = migrate(&legacy(json!({
            "articles": [
                {"title": "T1", "category": "News", "excerpt": "Short"},
                {"title": "T2", "category": "News"}
            ]
        })));
        assert_eq!(doc.data.articles[0].content, "Short");
        assert_eq!(doc.data.articles[1].content, "T2");
    }

    #[test]
    fn article_keeps_given_fields() {
        let doc = migrate(&legacy(json!({
            "articles": [{
                "title": "T",
                "category": "Research",
                "content": "Body",
                "excerpt": "Ex",
                "tags": ["methane"],
                "publishedAt": "2024-03-15",
                "author": "Dr. Ada"
            }]
        })));
        let article = &doc.data.articles[0];
        assert_eq!(article.category, "Research");
        assert_eq!(article.tags, vec!["methane"]);
        assert_eq!(
            article.published_at.unwrap().to_rfc3339(),
            "2024-03-15T00:00:00+00:00"
        );
        assert_eq!(article.author.as_ref().unwrap().name, "Dr. Ada");
        assert_eq!(article.seo.as_ref().unwrap().keywords, vec!["methane"]);
    }

    #[test]
    fn long_content_is_excerpted() {
        let content = "word ".repeat(100);
        let excerpt = excerpt_of(&content);
        assert!(excerpt.ends_with('…'));
        assert!(excerpt.chars().count() <= EXCERPT_CHARS + 1);
    }

    #[test]
    fn stat_values_split_by_character_class() {
        assert_eq!(split_stat_value("85%"), ("85".into(), Some("%".into())));
        assert_eq!(split_stat_value("2.5x"), ("2.5".into(), Some("x".into())));
        assert_eq!(split_stat_value("1,200+ "), ("1200".into(), Some("+".into())));
        assert_eq!(split_stat_value("40 kt"), ("40".into(), Some("kt".into())));
        assert_eq!(split_stat_value("120"), ("120".into(), None));
        assert_eq!(split_stat_value("N/A"), ("N/A".into(), None));
    }

    #[test]
    fn legacy_item_without_title_does_not_validate() {
        let doc = migrate(&legacy(json!({"hero": [{"subtitle": "B", "image": "/x.jpg"}]})));
        assert!(!validate(&doc.to_value().unwrap()));
    }
}
