//! Helpers behind the article detail page and the admin table.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::article::ArticleSummary;
use crate::listing::{sort_articles, SortMode};

const WORDS_PER_MINUTE: usize = 200;

/// Number of related articles shown under an article.
pub const RELATED_LIMIT: usize = 3;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Estimated reading time, e.g. "3 min read".
pub fn read_time(content: &str) -> String {
    let text = HTML_TAG.replace_all(content, " ");
    let words = text.split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{} min read", minutes)
}

/// Articles from the same category as `current`, excluding it, in input order.
pub fn related_articles<'a>(
    all: &'a [ArticleSummary],
    current: &ArticleSummary,
    limit: usize,
) -> Vec<&'a ArticleSummary> {
    all.iter()
        .filter(|article| article.id != current.id && article.category_slug == current.category_slug)
        .take(limit)
        .collect()
}

/// Newer and older neighbours of an article in the date-ordered feed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Neighbors {
    pub previous: Option<NeighborLink>,
    pub next: Option<NeighborLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborLink {
    pub id: String,
    pub title: String,
}

impl From<&ArticleSummary> for NeighborLink {
    fn from(article: &ArticleSummary) -> Self {
        NeighborLink {
            id: article.id.to_string(),
            title: article.title.clone(),
        }
    }
}

/// `previous` is the next newer article, `next` the next older one.
pub fn neighbors(all: &[ArticleSummary], current: &ArticleSummary) -> Neighbors {
    let mut ordered: Vec<&ArticleSummary> = all.iter().collect();
    sort_articles(&mut ordered, SortMode::Newest);

    let Some(position) = ordered.iter().position(|article| article.id == current.id) else {
        return Neighbors::default();
    };

    Neighbors {
        previous: position
            .checked_sub(1)
            .and_then(|index| ordered.get(index))
            .map(|article| NeighborLink::from(*article)),
        next: ordered
            .get(position + 1)
            .map(|article| NeighborLink::from(*article)),
    }
}

/// Long US-style date, e.g. "January 15, 2024".
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// First `max_chars` characters followed by an ellipsis.
pub fn excerpt_preview(text: &str, max_chars: usize) -> String {
    let preview: String = text.chars().take(max_chars).collect();
    format!("{}...", preview)
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
