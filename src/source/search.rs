use async_trait::async_trait;
use tracing::debug;

use super::{ContentSource, SourceError};
use crate::article::ArticleSummary;
use crate::db::Database;
use crate::TARGET_REFRESH;

/// Store-side search: the snapshot is whatever matches `query`, published
/// only and capped at `limit`.
#[derive(Clone)]
pub struct SearchSource {
    db: Database,
    query: String,
    limit: i64,
}

impl SearchSource {
    pub fn new(db: Database, query: &str, limit: i64) -> Self {
        Self {
            db,
            query: query.trim().to_string(),
            limit,
        }
    }
}

#[async_trait]
impl ContentSource for SearchSource {
    async fn fetch(&self) -> Result<Vec<ArticleSummary>, SourceError> {
        if self.query.is_empty() {
            return Ok(Vec::new());
        }
        let articles = self.db.search_articles(&self.query, self.limit).await?;
        debug!(target: TARGET_REFRESH, "Search for {:?} matched {} article(s)", self.query, articles.len());
        Ok(articles)
    }

    fn name(&self) -> &str {
        "search"
    }
}
