//! Filtering and ordering steps of the listing derivation.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::article::ArticleSummary;

/// Ordering of the derived list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Newest => write!(f, "newest"),
            SortMode::Oldest => write!(f, "oldest"),
            SortMode::Title => write!(f, "title"),
        }
    }
}

impl From<&str> for SortMode {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "oldest" => SortMode::Oldest,
            "title" => SortMode::Title,
            _ => SortMode::Newest,
        }
    }
}

/// Category restriction: everything, or a single slug.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryFilter {
    #[default]
    All,
    Slug(String),
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s == "all" {
            CategoryFilter::All
        } else {
            CategoryFilter::Slug(s.to_string())
        }
    }
}

impl From<String> for CategoryFilter {
    fn from(s: String) -> Self {
        CategoryFilter::from(s.as_str())
    }
}

impl From<CategoryFilter> for String {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Slug(slug) => slug,
        }
    }
}

/// Text filter. `query` must already be trimmed and lower-cased; an empty
/// query keeps everything. Every field, tags included, matches by substring.
pub fn matches_query(article: &ArticleSummary, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    article.title.to_lowercase().contains(query)
        || article.excerpt.to_lowercase().contains(query)
        || article.content.to_lowercase().contains(query)
        || article
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}

pub fn matches_category(article: &ArticleSummary, filter: &CategoryFilter) -> bool {
    match filter {
        CategoryFilter::All => true,
        CategoryFilter::Slug(slug) => article.category_slug == *slug,
    }
}

pub fn compare_articles(a: &ArticleSummary, b: &ArticleSummary, mode: SortMode) -> Ordering {
    match mode {
        SortMode::Newest => b.published_at.cmp(&a.published_at),
        SortMode::Oldest => a.published_at.cmp(&b.published_at),
        SortMode::Title => compare_titles(&a.title, &b.title),
    }
}

/// Sorts in place. `sort_by` is stable, so ties keep their input order.
pub fn sort_articles<T: Borrow<ArticleSummary>>(articles: &mut [T], mode: SortMode) {
    articles.sort_by(|a, b| compare_articles(a.borrow(), b.borrow(), mode));
}

/// Unicode-aware title comparison: accents and case are ignored first, the
/// raw strings only break ties.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
