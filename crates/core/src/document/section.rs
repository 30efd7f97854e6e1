use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four named content collections of a site document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Hero,
    Services,
    Articles,
    Stats,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Hero,
        Section::Services,
        Section::Articles,
        Section::Stats,
    ];

    /// Key of the section inside `data`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::Services => "services",
            Section::Articles => "articles",
            Section::Stats => "stats",
        }
    }

    /// Singular prefix used when synthesizing item ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Section::Hero => "hero",
            Section::Services => "service",
            Section::Articles => "article",
            Section::Stats => "stat",
        }
    }

    /// Fields every item of this section must carry as non-empty strings.
    /// Dotted names address nested objects (`image.url`).
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Section::Hero => &["id", "title", "subtitle", "image.url"],
            Section::Services => &["id", "title", "description"],
            Section::Articles => &["id", "title", "category", "content"],
            Section::Stats => &["id", "label", "value", "description"],
        }
    }

    /// Fields the current schema knows about but does not require.
    pub fn optional_fields(&self) -> &'static [&'static str] {
        match self {
            Section::Hero => &[
                "buttonText",
                "buttonLink",
                "image.alt",
                "image.width",
                "image.height",
                "priority",
                "status",
                "createdAt",
                "updatedAt",
            ],
            Section::Services => &["features", "icon", "status", "createdAt", "updatedAt"],
            Section::Articles => &[
                "slug",
                "excerpt",
                "tags",
                "publishedAt",
                "author",
                "seo",
                "image",
                "featured",
                "status",
                "createdAt",
                "updatedAt",
            ],
            Section::Stats => &[
                "unit",
                "icon",
                "trend",
                "status",
                "createdAt",
                "updatedAt",
            ],
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_sections() {
        for section in Section::ALL {
            assert_eq!(section.as_str().parse::<Section>().unwrap(), section);
        }
    }

    #[test]
    fn parse_unknown_section() {
        let err = "faq".parse::<Section>().unwrap_err();
        assert_eq!(err, UnknownSection("faq".to_string()));
    }
}
