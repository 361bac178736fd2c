use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{ContentSource, SourceError};
use crate::article::{
    parse_timestamp, ArticleId, ArticleStatus, ArticleSummary, Category, CategoryDirectory,
};

const FALLBACK_AUTHOR: &str = "Redeemer Buatsi";

/// The category list shown when the store has none of its own.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("politics", "Politics"),
        Category::new("business", "Business"),
        Category::new("technology", "Technology"),
        Category::new("society", "Society"),
    ]
}

struct Seed {
    id: i64,
    title: &'static str,
    excerpt: &'static str,
    content: &'static str,
    category: &'static str,
    date: &'static str,
    image: &'static str,
    tags: [&'static str; 3],
}

const SEEDS: [Seed; 3] = [
    Seed {
        id: 1,
        title: "Ghana's Economic Outlook: Navigating Post-Pandemic Recovery",
        excerpt: "An in-depth analysis of Ghana's economic strategies and recovery plans following the global pandemic impact on local industries and employment.",
        content: "<p>Ghana's economy has shown remarkable resilience in the face of unprecedented global challenges...</p>",
        category: "business",
        date: "2024-01-15",
        image: "https://images.unsplash.com/photo-1611974789855-9c2a0a7236a3?w=400&h=250&fit=crop",
        tags: ["economy", "ghana", "recovery"],
    },
    Seed {
        id: 2,
        title: "Digital Transformation in Ghanaian Media: Opportunities and Challenges",
        excerpt: "Exploring how traditional media outlets in Ghana are adapting to digital platforms and the implications for journalism and public discourse.",
        content: "<p>The media landscape in Ghana is undergoing a fundamental transformation...</p>",
        category: "technology",
        date: "2024-01-12",
        image: "https://images.unsplash.com/photo-1504711434969-e33886168f5c?w=400&h=250&fit=crop",
        tags: ["media", "digital", "journalism"],
    },
    Seed {
        id: 3,
        title: "Youth Engagement in Ghana's Democratic Process: A New Generation's Voice",
        excerpt: "Examining the increasing participation of young Ghanaians in politics and civic activities, and their impact on the country's democratic development.",
        content: "<p>Ghana's democracy is experiencing a renaissance driven by unprecedented youth engagement...</p>",
        category: "politics",
        date: "2024-01-10",
        image: "https://images.unsplash.com/photo-1529107386315-e1a2ed48a620?w=400&h=250&fit=crop",
        tags: ["politics", "youth", "democracy"],
    },
];

/// The three built-in articles, newest first.
pub fn fallback_articles() -> Vec<ArticleSummary> {
    let directory = CategoryDirectory::new(&default_categories());
    SEEDS
        .iter()
        .map(|seed| ArticleSummary {
            id: ArticleId::Int(seed.id),
            title: seed.title.to_string(),
            excerpt: seed.excerpt.to_string(),
            content: seed.content.to_string(),
            category_slug: seed.category.to_string(),
            category_label: directory.label(seed.category),
            published_at: parse_timestamp(seed.date).unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            tags: seed.tags.iter().map(|tag| tag.to_string()).collect(),
            status: ArticleStatus::Published,
            author: FALLBACK_AUTHOR.to_string(),
            image_url: seed.image.to_string(),
        })
        .collect()
}

/// A fixed, in-memory snapshot.
#[derive(Debug, Clone)]
pub struct StaticSource {
    articles: Vec<ArticleSummary>,
}

impl StaticSource {
    pub fn new(articles: Vec<ArticleSummary>) -> Self {
        Self { articles }
    }
}

impl Default for StaticSource {
    fn default() -> Self {
        Self::new(fallback_articles())
    }
}

#[async_trait]
impl ContentSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<ArticleSummary>, SourceError> {
        Ok(self.articles.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
