use chrono::Utc;
use sqlx::{MySql, Pool};

use crate::modules::property::crud::PropertyError;
use crate::modules::property::model::Property;

#[derive(Clone)]
pub struct FavoriteCrud {
    pool: Pool<MySql>,
}

impl FavoriteCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Adds the listing to the user's favorites, or removes it if already
    /// there. Returns whether it is a favorite afterwards.
    pub async fn toggle(&self, user_id: &str, property_id: &str) -> Result<bool, PropertyError> {
        let removed = sqlx::query("DELETE FROM user_favorites WHERE user_id = ? AND property_id = ?")
            .bind(user_id)
            .bind(property_id)
            .execute(&self.pool)
            .await?;

        if removed.rows_affected() > 0 {
            return Ok(false);
        }

        let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM properties WHERE id = ?")
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(PropertyError::NotFound);
        }

        sqlx::query(
            "INSERT IGNORE INTO user_favorites (user_id, property_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(property_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(true)
    }

    pub async fn property_ids(&self, user_id: &str) -> Result<Vec<String>, PropertyError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT property_id FROM user_favorites WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn properties(&self, user_id: &str) -> Result<Vec<Property>, PropertyError> {
        let properties = sqlx::query_as::<_, Property>(
            r#"
            SELECT p.* FROM properties p
            JOIN user_favorites f ON f.property_id = p.id
            WHERE f.user_id = ?
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }
}
