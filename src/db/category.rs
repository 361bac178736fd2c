use tracing::{debug, instrument};

use super::core::Database;
use crate::article::Category;
use crate::db::Row;
use crate::TARGET_DB;

impl Database {
    /// All categories ordered by name
    pub async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        let rows = sqlx::query("SELECT slug, name FROM categories ORDER BY name")
            .fetch_all(self.pool())
            .await?;

        Ok(rows
            .iter()
            .map(|row| Category {
                slug: row.get("slug"),
                name: row.get("name"),
            })
            .collect())
    }

    /// Inserts a category, or renames it when the slug already exists.
    #[instrument(target = "db", level = "info", skip(self))]
    pub async fn upsert_category(&self, category: &Category) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO categories (slug, name)
            VALUES (?1, ?2)
            ON CONFLICT(slug) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(&category.slug)
        .bind(&category.name)
        .execute(self.pool())
        .await?;
        debug!(target: TARGET_DB, "Upserted category {}", category.slug);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_categories_sorted_and_renamed() {
        let db = Database::in_memory().await.unwrap();
        db.upsert_category(&Category::new("technology", "Technology"))
            .await
            .unwrap();
        db.upsert_category(&Category::new("business", "Biz"))
            .await
            .unwrap();
        db.upsert_category(&Category::new("business", "Business"))
            .await
            .unwrap();

        let categories = db.list_categories().await.unwrap();
        assert_eq!(
            categories,
            vec![
                Category::new("business", "Business"),
                Category::new("technology", "Technology"),
            ]
        );
    }
}
