use async_trait::async_trait;
use tracing::debug;

use super::{ContentSource, SourceError};
use crate::article::ArticleSummary;
use crate::db::Database;
use crate::listing::StatusScope;
use crate::TARGET_REFRESH;

/// Upper bound on one snapshot.
pub const DEFAULT_FETCH_LIMIT: i64 = 1000;

/// Reads the snapshot from the article store, newest first.
#[derive(Clone)]
pub struct DatabaseSource {
    db: Database,
    scope: StatusScope,
    limit: i64,
}

impl DatabaseSource {
    pub fn new(db: Database, scope: StatusScope) -> Self {
        Self {
            db,
            scope,
            limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

#[async_trait]
impl ContentSource for DatabaseSource {
    async fn fetch(&self) -> Result<Vec<ArticleSummary>, SourceError> {
        let articles = self.db.list_articles(self.scope, self.limit).await?;
        debug!(target: TARGET_REFRESH, "Fetched {} article(s) from the store", articles.len());
        Ok(articles)
    }

    fn name(&self) -> &str {
        "database"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleStatus;
    use crate::db::ArticleDraft;

    async fn store_with_draft() -> Database {
        let db = Database::in_memory().await.unwrap();
        for (title, status) in [
            ("Published piece", ArticleStatus::Published),
            ("Unfinished piece", ArticleStatus::Draft),
        ] {
            db.create_article(&ArticleDraft {
                title: title.to_string(),
                excerpt: "Excerpt".to_string(),
                content: "<p>Body</p>".to_string(),
                category_slug: "society".to_string(),
                tags: Vec::new(),
                status,
                author: None,
                image_url: None,
            })
            .await
            .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_scope_controls_drafts() {
        let db = store_with_draft().await;

        let public = DatabaseSource::new(db.clone(), StatusScope::PublishedOnly);
        let titles: Vec<String> = public
            .fetch()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(titles, vec!["Published piece"]);

        let admin = DatabaseSource::new(db, StatusScope::All);
        assert_eq!(admin.fetch().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_limit_caps_snapshot() {
        let db = store_with_draft().await;
        let source = DatabaseSource::new(db, StatusScope::All).with_limit(1);
        assert_eq!(source.fetch().await.unwrap().len(), 1);
    }
}
