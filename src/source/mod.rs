//! Where article snapshots come from.
//!
//! A [`ContentSource`] produces a full snapshot on every call. The listing
//! controller never talks to a source directly; the caller fetches and then
//! hands the result to `load_snapshot`.

mod database;
mod fallback;
mod search;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::article::ArticleSummary;
use crate::db::Database;
use crate::TARGET_REFRESH;

pub use self::database::{DatabaseSource, DEFAULT_FETCH_LIMIT};
pub use self::fallback::{default_categories, fallback_articles, StaticSource};
pub use self::search::SearchSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("content source unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a complete snapshot.
    async fn fetch(&self) -> Result<Vec<ArticleSummary>, SourceError>;

    fn name(&self) -> &str;
}

/// Wraps a primary source and substitutes the built-in articles when it
/// fails.
pub struct FallbackSource<S> {
    primary: S,
    fallback: StaticSource,
}

impl<S: ContentSource> FallbackSource<S> {
    pub fn new(primary: S) -> Self {
        Self {
            primary,
            fallback: StaticSource::default(),
        }
    }
}

#[async_trait]
impl<S: ContentSource> ContentSource for FallbackSource<S> {
    async fn fetch(&self) -> Result<Vec<ArticleSummary>, SourceError> {
        match self.primary.fetch().await {
            Ok(articles) => Ok(articles),
            Err(err) => {
                warn!(
                    target: TARGET_REFRESH,
                    "{} unavailable, using fallback articles: {}",
                    self.primary.name(),
                    err
                );
                self.fallback.fetch().await
            }
        }
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}

/// Writes the default categories and fallback articles into an empty store.
/// Returns how many articles were written.
pub async fn seed_fallback(db: &Database) -> Result<usize, SourceError> {
    for category in default_categories() {
        db.upsert_category(&category).await?;
    }
    let written = db.import_articles(&fallback_articles()).await?;
    info!(target: TARGET_REFRESH, "Seeded {} fallback article(s)", written);
    Ok(written)
}
