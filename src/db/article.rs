use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use tracing::{debug, error, instrument, warn};

use super::core::Database;
use crate::article::{
    parse_timestamp, ArticleId, ArticleStatus, ArticleSummary, PLACEHOLDER_IMAGE, UNCATEGORIZED,
};
use crate::db::Row;
use crate::listing::StatusScope;
use crate::TARGET_DB;

const ARTICLE_COLUMNS: &str = r#"
    a.id, a.title, a.excerpt, a.content, a.category_slug, c.name AS category_name,
    a.tags, a.status, a.author_name, a.featured_image_url, a.created_at, a.published_at
"#;

/// Editable fields of an article, as submitted by the admin form.
#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_category")]
    pub category_slug: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: ArticleStatus,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_category() -> String {
    UNCATEGORIZED.to_string()
}

impl ArticleDraft {
    /// Title, category, excerpt and content are all required.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            &self.title,
            &self.category_slug,
            &self.excerpt,
            &self.content,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err("Please fill in all required fields.".to_string());
        }
        Ok(())
    }

    /// Tags trimmed, with empty entries dropped.
    fn clean_tags(&self) -> String {
        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .collect();
        serde_json::to_string(&tags).unwrap_or_else(|_| "[]".to_string())
    }
}

fn article_from_row(row: &SqliteRow) -> ArticleSummary {
    let id: i64 = row.get("id");
    let created_at: String = row.get("created_at");
    let published_at: Option<String> = row.get("published_at");
    let date_text = published_at.unwrap_or(created_at);
    let date = parse_timestamp(&date_text).unwrap_or_else(|| {
        warn!(target: TARGET_DB, "Article {} has an unreadable date {:?}", id, date_text);
        DateTime::<Utc>::UNIX_EPOCH
    });
    let tags: String = row.get("tags");
    let category_slug: String = row.get("category_slug");
    let category_name: Option<String> = row.get("category_name");
    let status: String = row.get("status");

    ArticleSummary {
        id: ArticleId::Int(id),
        title: row.get("title"),
        excerpt: row.get("excerpt"),
        content: row.get("content"),
        category_label: category_name.unwrap_or_else(|| "Uncategorized".to_string()),
        category_slug,
        published_at: date,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        status: ArticleStatus::from(status.as_str()),
        author: row
            .get::<Option<String>, _>("author_name")
            .unwrap_or_default(),
        image_url: row
            .get::<Option<String>, _>("featured_image_url")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
    }
}

/// Unicode-aware, case-insensitive containment over title, excerpt and
/// content. `needle` must already be lower-cased.
fn mentions(article: &ArticleSummary, needle: &str) -> bool {
    [&article.title, &article.excerpt, &article.content]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

impl Database {
    #[instrument(target = "db", level = "info", skip(self, draft), fields(title = %draft.title))]
    pub async fn create_article(&self, draft: &ArticleDraft) -> Result<i64, sqlx::Error> {
        if let Err(message) = draft.validate() {
            return Err(sqlx::Error::Protocol(message));
        }
        let now = Utc::now().to_rfc3339();
        let published_at = (draft.status == ArticleStatus::Published).then(|| now.clone());

        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO articles (title, excerpt, content, category_slug, tags, status, author_name, featured_image_url, created_at, published_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?9)
            RETURNING id
            "#,
        )
        .bind(draft.title.trim())
        .bind(draft.excerpt.trim())
        .bind(&draft.content)
        .bind(draft.category_slug.trim())
        .bind(draft.clean_tags())
        .bind(draft.status.as_str())
        .bind(&draft.author)
        .bind(&draft.image_url)
        .bind(&now)
        .bind(published_at)
        .fetch_one(self.pool())
        .await
        .map_err(|err| {
            error!(target: TARGET_DB, "Failed to create article: {}", err);
            err
        })?;

        debug!(target: TARGET_DB, "Created article {} ({})", id, draft.status);
        Ok(id)
    }

    /// Replaces the editable fields of article `id`. Returns `false` when no
    /// such article exists. The first publication stamps `published_at`.
    #[instrument(target = "db", level = "info", skip(self, draft))]
    pub async fn update_article(&self, id: i64, draft: &ArticleDraft) -> Result<bool, sqlx::Error> {
        if let Err(message) = draft.validate() {
            return Err(sqlx::Error::Protocol(message));
        }
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = ?1,
                excerpt = ?2,
                content = ?3,
                category_slug = ?4,
                tags = ?5,
                status = ?6,
                author_name = ?7,
                featured_image_url = ?8,
                updated_at = ?9,
                published_at = CASE WHEN ?6 = 'published' THEN COALESCE(published_at, ?9) ELSE published_at END
            WHERE id = ?10
            "#,
        )
        .bind(draft.title.trim())
        .bind(draft.excerpt.trim())
        .bind(&draft.content)
        .bind(draft.category_slug.trim())
        .bind(draft.clean_tags())
        .bind(draft.status.as_str())
        .bind(&draft.author)
        .bind(&draft.image_url)
        .bind(&now)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(target = "db", level = "info", skip(self))]
    pub async fn delete_article(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_article(&self, id: i64) -> Result<Option<ArticleSummary>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM articles a LEFT JOIN categories c ON c.slug = a.category_slug WHERE a.id = ?1",
            ARTICLE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(row.as_ref().map(article_from_row))
    }

    /// Newest-created first, at most `limit` rows. `PublishedOnly` hides drafts.
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn list_articles(
        &self,
        scope: StatusScope,
        limit: i64,
    ) -> Result<Vec<ArticleSummary>, sqlx::Error> {
        let status_clause = match scope {
            StatusScope::PublishedOnly => "WHERE a.status = 'published'",
            StatusScope::All => "",
        };
        let sql = format!(
            "SELECT {} FROM articles a LEFT JOIN categories c ON c.slug = a.category_slug {} ORDER BY a.created_at DESC, a.id DESC LIMIT ?1",
            ARTICLE_COLUMNS, status_clause
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(self.pool())
            .await?;

        debug!(target: TARGET_DB, "Listed {} articles", rows.len());
        Ok(rows.iter().map(article_from_row).collect())
    }

    /// Case-insensitive substring search over title, excerpt and content of
    /// published articles, newest first. Matching happens in Rust because
    /// SQLite's LIKE only folds ASCII letters.
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn search_articles(
        &self,
        query: &str,
        limit: i64,
    ) -> Result<Vec<ArticleSummary>, sqlx::Error> {
        let needle = query.trim().to_lowercase();
        let limit = usize::try_from(limit).unwrap_or(0);
        // A negative LIMIT means no limit in SQLite
        let published = self.list_articles(StatusScope::PublishedOnly, -1).await?;

        let hits: Vec<ArticleSummary> = published
            .into_iter()
            .filter(|article| mentions(article, &needle))
            .take(limit)
            .collect();
        debug!(target: TARGET_DB, "Search for {:?} matched {} articles", needle, hits.len());
        Ok(hits)
    }

    pub async fn count_articles(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(self.pool())
            .await
    }

    /// Copies a snapshot into an empty store, keeping dates and statuses.
    /// Returns how many articles were written; a non-empty store is left alone.
    #[instrument(target = "db", level = "info", skip(self, articles))]
    pub async fn import_articles(&self, articles: &[ArticleSummary]) -> Result<usize, sqlx::Error> {
        if self.count_articles().await? > 0 {
            debug!(target: TARGET_DB, "Store already has articles, skipping import");
            return Ok(0);
        }

        let mut transaction = self.pool().begin().await?;
        for article in articles {
            let date = article.published_at.to_rfc3339();
            let published_at = (article.status == ArticleStatus::Published).then(|| date.clone());
            sqlx::query(
                r#"
                INSERT INTO articles (title, excerpt, content, category_slug, tags, status, author_name, featured_image_url, created_at, published_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?9)
                "#,
            )
            .bind(&article.title)
            .bind(&article.excerpt)
            .bind(&article.content)
            .bind(&article.category_slug)
            .bind(serde_json::to_string(&article.tags).unwrap_or_else(|_| "[]".to_string()))
            .bind(article.status.as_str())
            .bind(&article.author)
            .bind(&article.image_url)
            .bind(&date)
            .bind(published_at)
            .execute(&mut *transaction)
            .await?;
        }
        transaction.commit().await?;

        Ok(articles.len())
    }
}
