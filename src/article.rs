use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Category slug used when an article has no category.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Image shown for articles without a featured image.
pub const PLACEHOLDER_IMAGE: &str =
    "https://images.unsplash.com/photo-1504711434969-e33886168f5c?w=400&h=250&fit=crop";

/// Opaque article identifier. Stored articles use integers, imported or
/// hand-written snapshots may use strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Int(i64),
    Text(String),
}

impl ArticleId {
    /// Integer form, when the identifier is (or spells) a number.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArticleId::Int(id) => Some(*id),
            ArticleId::Text(text) => text.parse().ok(),
        }
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArticleId::Int(id) => write!(f, "{}", id),
            ArticleId::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<i64> for ArticleId {
    fn from(id: i64) -> Self {
        ArticleId::Int(id)
    }
}

impl From<&str> for ArticleId {
    fn from(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(id) => ArticleId::Int(id),
            Err(_) => ArticleId::Text(s.trim().to_string()),
        }
    }
}

/// Publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::Published => "published",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ArticleStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "published" => ArticleStatus::Published,
            _ => ArticleStatus::Draft,
        }
    }
}

/// One listable content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    // Only consulted by the full-text search
    #[serde(default)]
    pub content: String,
    pub category_slug: String,
    pub category_label: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    #[serde(default)]
    pub author: String,
    #[serde(default = "default_image")]
    pub image_url: String,
}

fn default_image() -> String {
    PLACEHOLDER_IMAGE.to_string()
}

/// A category as stored: the slug used for filtering and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

impl Category {
    pub fn new(slug: &str, name: &str) -> Self {
        Category {
            slug: slug.to_string(),
            name: name.to_string(),
        }
    }
}

/// Slug to label lookup table supplied alongside a snapshot.
#[derive(Debug, Clone, Default)]
pub struct CategoryDirectory {
    labels: HashMap<String, String>,
}

impl CategoryDirectory {
    pub fn new(categories: &[Category]) -> Self {
        let labels = categories
            .iter()
            .map(|c| (c.slug.clone(), c.name.clone()))
            .collect();
        CategoryDirectory { labels }
    }

    /// Human readable name for `slug`. Unknown slugs read as "Uncategorized".
    pub fn label(&self, slug: &str) -> String {
        self.labels
            .get(slug)
            .cloned()
            .unwrap_or_else(|| "Uncategorized".to_string())
    }
}

/// Parses the timestamp spellings the store and snapshots use: RFC 3339,
/// SQLite's `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_article_id_from_path_segment() {
        assert_eq!(ArticleId::from("42"), ArticleId::Int(42));
        assert_eq!(
            ArticleId::from("ghana-economy"),
            ArticleId::Text("ghana-economy".to_string())
        );
        assert_eq!(ArticleId::Text("7".to_string()).as_i64(), Some(7));
    }

    #[test]
    fn test_article_id_untagged_json() {
        let ids: Vec<ArticleId> = serde_json::from_str(r#"[1, "two"]"#).unwrap();
        assert_eq!(ids[0], ArticleId::Int(1));
        assert_eq!(ids[1], ArticleId::Text("two".to_string()));
        assert_eq!(ids[1].to_string(), "two");
    }

    #[test]
    fn test_status_spelling() {
        assert_eq!(ArticleStatus::from("Published"), ArticleStatus::Published);
        assert_eq!(ArticleStatus::from("draft"), ArticleStatus::Draft);
        assert_eq!(
            serde_json::to_string(&ArticleStatus::Published).unwrap(),
            "\"published\""
        );
    }

    #[test]
    fn test_category_directory_falls_back() {
        let directory = CategoryDirectory::new(&[Category::new("business", "Business")]);
        assert_eq!(directory.label("business"), "Business");
        assert_eq!(directory.label(UNCATEGORIZED), "Uncategorized");
        assert_eq!(directory.label("sports"), "Uncategorized");
    }

    #[test]
    fn test_parse_timestamp_spellings() {
        let day = parse_timestamp("2024-01-15").unwrap();
        assert_eq!((day.year(), day.month(), day.day()), (2024, 1, 15));
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_some());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
