use tracing::info;

use super::core::Database;
use crate::TARGET_DB;

impl Database {
    pub(crate) async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool().acquire().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                excerpt TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                category_slug TEXT NOT NULL DEFAULT 'uncategorized',
                tags TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
                status TEXT NOT NULL DEFAULT 'draft', -- draft, published
                author_name TEXT,
                featured_image_url TEXT,
                created_at TEXT NOT NULL,
                published_at TEXT,
                updated_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_articles_status_created_at ON articles (status, created_at);
            CREATE INDEX IF NOT EXISTS idx_articles_category_slug ON articles (category_slug);

            CREATE TABLE IF NOT EXISTS article_views (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_id INTEGER NOT NULL,
                viewed_at TEXT NOT NULL,
                user_agent TEXT,
                FOREIGN KEY (article_id) REFERENCES articles (id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_article_views_article_id ON article_views (article_id);

            CREATE TABLE IF NOT EXISTS subscribers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                subscribed_at TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS contacts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;
        info!(target: TARGET_DB, "Tables ensured to exist");

        Ok(())
    }
}
