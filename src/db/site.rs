use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, instrument};

use super::core::{Database, DbLockErrorExt};
use crate::db::Row;
use crate::TARGET_DB;

/// A message sent through the contact form.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_articles: i64,
    pub published_articles: i64,
    pub draft_articles: i64,
    pub total_views: i64,
    pub total_subscribers: i64,
    pub total_contacts: i64,
}

/// Site-wide settings edited from the admin panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSettings {
    #[serde(default)]
    pub site_title: String,
    #[serde(default)]
    pub site_description: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub twitter_url: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub facebook_url: String,
}

impl SiteSettings {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("site_title", &self.site_title),
            ("site_description", &self.site_description),
            ("contact_email", &self.contact_email),
            ("twitter_url", &self.twitter_url),
            ("linkedin_url", &self.linkedin_url),
            ("facebook_url", &self.facebook_url),
        ]
    }

    fn set(&mut self, key: &str, value: String) {
        match key {
            "site_title" => self.site_title = value,
            "site_description" => self.site_description = value,
            "contact_email" => self.contact_email = value,
            "twitter_url" => self.twitter_url = value,
            "linkedin_url" => self.linkedin_url = value,
            "facebook_url" => self.facebook_url = value,
            _ => debug!(target: TARGET_DB, "Ignoring unknown setting {}", key),
        }
    }
}

impl Database {
    /// Records one read of an article. Busy or locked databases are retried
    /// with exponential backoff since views arrive concurrently.
    #[instrument(target = "db", level = "debug", skip(self, user_agent))]
    pub async fn track_article_view(
        &self,
        article_id: i64,
        user_agent: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let viewed_at = Utc::now().to_rfc3339();
        let mut backoff = 50; // initial delay in milliseconds
        let max_retries = 5;

        for attempt in 1..=max_retries {
            match sqlx::query(
                "INSERT INTO article_views (article_id, viewed_at, user_agent) VALUES (?1, ?2, ?3)",
            )
            .bind(article_id)
            .bind(&viewed_at)
            .bind(user_agent)
            .execute(self.pool())
            .await
            {
                Ok(_) => return Ok(()),
                Err(err) if err.is_database_lock_error() && attempt < max_retries => {
                    info!(target: TARGET_DB, "Database is locked, waiting {}ms before retrying attempt {}/{}", backoff, attempt, max_retries);
                    sleep(Duration::from_millis(backoff)).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(err) => {
                    error!(target: TARGET_DB, "Failed to track view of article {}: {}", article_id, err);
                    return Err(err);
                }
            }
        }

        Err(sqlx::Error::Protocol(
            "Maximum retries exceeded for tracking article view".into(),
        ))
    }

    pub async fn count_article_views(&self, article_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM article_views WHERE article_id = ?1")
            .bind(article_id)
            .fetch_one(self.pool())
            .await
    }

    /// Adds a newsletter subscriber. Returns `false` if the address was
    /// already subscribed.
    #[instrument(target = "db", level = "info", skip(self))]
    pub async fn add_subscriber(&self, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscribers (email, subscribed_at, is_active)
            VALUES (?1, ?2, 1)
            ON CONFLICT(email) DO NOTHING
            "#,
        )
        .bind(email.trim().to_lowercase())
        .bind(Utc::now().to_rfc3339())
        .execute(self.pool())
        .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(target = "db", level = "info", skip(self, contact), fields(email = %contact.email))]
    pub async fn submit_contact(&self, contact: &ContactMessage) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO contacts (name, email, subject, message, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            "#,
        )
        .bind(contact.name.trim())
        .bind(contact.email.trim())
        .bind(&contact.subject)
        .bind(&contact.message)
        .bind(Utc::now().to_rfc3339())
        .fetch_one(self.pool())
        .await
    }

    /// Collect the dashboard counters
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM articles) AS total_articles,
                (SELECT COUNT(*) FROM articles WHERE status = 'published') AS published_articles,
                (SELECT COUNT(*) FROM articles WHERE status = 'draft') AS draft_articles,
                (SELECT COUNT(*) FROM article_views) AS total_views,
                (SELECT COUNT(*) FROM subscribers WHERE is_active = 1) AS total_subscribers,
                (SELECT COUNT(*) FROM contacts) AS total_contacts
            "#,
        )
        .fetch_one(self.pool())
        .await?;

        Ok(DashboardStats {
            total_articles: row.get("total_articles"),
            published_articles: row.get("published_articles"),
            draft_articles: row.get("draft_articles"),
            total_views: row.get("total_views"),
            total_subscribers: row.get("total_subscribers"),
            total_contacts: row.get("total_contacts"),
        })
    }

    pub async fn load_settings(&self) -> Result<SiteSettings, sqlx::Error> {
        let rows = sqlx::query("SELECT key, value FROM settings")
            .fetch_all(self.pool())
            .await?;

        let mut settings = SiteSettings::default();
        for row in rows {
            let key: String = row.get("key");
            settings.set(&key, row.get("value"));
        }
        Ok(settings)
    }

    #[instrument(target = "db", level = "info", skip(self, settings))]
    pub async fn save_settings(&self, settings: &SiteSettings) -> Result<(), sqlx::Error> {
        let mut transaction = self.pool().begin().await?;
        for (key, value) in settings.entries() {
            sqlx::query(
                r#"
                INSERT INTO settings (key, value)
                VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
            )
            .bind(key)
            .bind(value.trim())
            .execute(&mut *transaction)
            .await?;
        }
        transaction.commit().await?;
        debug!(target: TARGET_DB, "Saved site settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::ArticleStatus;
    use crate::db::ArticleDraft;

    #[tokio::test]
    async fn test_subscriber_duplicates_are_reported() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.add_subscriber("reader@example.com").await.unwrap());
        assert!(!db.add_subscriber(" Reader@Example.com ").await.unwrap());
        assert_eq!(db.dashboard_stats().await.unwrap().total_subscribers, 1);
    }

    #[tokio::test]
    async fn test_dashboard_stats_and_views() {
        let db = Database::in_memory().await.unwrap();
        let draft = ArticleDraft {
            title: "Budget day".to_string(),
            excerpt: "What changed".to_string(),
            content: "<p>Numbers</p>".to_string(),
            category_slug: "business".to_string(),
            tags: Vec::new(),
            status: ArticleStatus::Published,
            author: None,
            image_url: None,
        };
        let id = db.create_article(&draft).await.unwrap();
        db.create_article(&ArticleDraft {
            status: ArticleStatus::Draft,
            ..draft.clone()
        })
        .await
        .unwrap();
        db.track_article_view(id, Some("test-agent")).await.unwrap();
        db.track_article_view(id, None).await.unwrap();
        db.submit_contact(&ContactMessage {
            name: "Ama".to_string(),
            email: "ama@example.com".to_string(),
            subject: None,
            message: "Hello".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(db.count_article_views(id).await.unwrap(), 2);
        assert_eq!(
            db.dashboard_stats().await.unwrap(),
            DashboardStats {
                total_articles: 2,
                published_articles: 1,
                draft_articles: 1,
                total_views: 2,
                total_subscribers: 0,
                total_contacts: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_settings_round_trip_through_rows() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(db.load_settings().await.unwrap(), SiteSettings::default());

        let settings = SiteSettings {
            site_title: "The Accra Desk".to_string(),
            contact_email: "desk@example.com".to_string(),
            ..SiteSettings::default()
        };
        db.save_settings(&settings).await.unwrap();
        assert_eq!(db.load_settings().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn test_failed_settings_save_keeps_previous_values() {
        let db = Database::in_memory().await.unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_facebook BEFORE INSERT ON settings WHEN NEW.key = 'facebook_url' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let settings = SiteSettings {
            site_title: "Half written".to_string(),
            facebook_url: "https://facebook.com/desk".to_string(),
            ..SiteSettings::default()
        };
        assert!(db.save_settings(&settings).await.is_err());
        assert_eq!(db.load_settings().await.unwrap(), SiteSettings::default());
    }
}
