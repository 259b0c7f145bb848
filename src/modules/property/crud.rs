use async_trait::async_trait;
use axum::{http::StatusCode, Json};
use chrono::{DateTime, Utc};
use sqlx::{MySql, Pool};

use super::model::{ListingStatus, Property};
use crate::modules::error::{internal_error, ApiError, ErrorResponse};
use crate::services::reminder::{ReminderError, ReminderStore};
use crate::services::search::SearchFilters;

// =============================================================================
// PROPERTY ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PropertyError {
    #[error("Property not found")]
    NotFound,

    #[error("You can only modify your own listings")]
    Forbidden,

    #[error("{0}")]
    Invalid(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl PropertyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PropertyError> for ApiError {
    fn from(err: PropertyError) -> Self {
        match err {
            PropertyError::Database(e) => internal_error("property store", e),
            other => (other.status_code(), Json(ErrorResponse::new(other.to_string()))),
        }
    }
}

// =============================================================================
// PROPERTY CRUD
// =============================================================================

const INSERT_COLUMNS: &str = "id, owner_id, owner_email, first_name, phone, house_no, street, area, city, \
    listing_type, property_type, building_type, furnishing, parking, price, sqft, bedrooms, bathrooms, \
    description, amenities, image_outer, image_hall, image_bedroom, image_kitchen, image_bathroom, \
    lat, lng, status, is_verified, created_at, updated_at, last_checked";

#[derive(Clone)]
pub struct PropertyCrud {
    pool: Pool<MySql>,
}

impl PropertyCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, p: &Property) -> Result<(), PropertyError> {
        let sql = format!(
            "INSERT INTO properties ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            INSERT_COLUMNS
        );

        sqlx::query(&sql)
            .bind(&p.id)
            .bind(&p.owner_id)
            .bind(&p.owner_email)
            .bind(&p.first_name)
            .bind(&p.phone)
            .bind(&p.house_no)
            .bind(&p.street)
            .bind(&p.area)
            .bind(&p.city)
            .bind(&p.listing_type)
            .bind(&p.property_type)
            .bind(&p.building_type)
            .bind(&p.furnishing)
            .bind(&p.parking)
            .bind(p.price)
            .bind(p.sqft)
            .bind(p.bedrooms)
            .bind(p.bathrooms)
            .bind(&p.description)
            .bind(&p.amenities)
            .bind(&p.images.outer)
            .bind(&p.images.hall)
            .bind(&p.images.bedroom)
            .bind(&p.images.kitchen)
            .bind(&p.images.bathroom)
            .bind(p.lat)
            .bind(p.lng)
            .bind(&p.status)
            .bind(p.is_verified)
            .bind(p.created_at)
            .bind(p.updated_at)
            .bind(p.last_checked)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Full-row write of every mutable column. Last write wins.
    pub async fn update(&self, p: &Property) -> Result<(), PropertyError> {
        let result = sqlx::query(
            r#"
            UPDATE properties SET
                first_name = ?, phone = ?, house_no = ?, street = ?, area = ?, city = ?,
                listing_type = ?, property_type = ?, building_type = ?, furnishing = ?, parking = ?,
                price = ?, sqft = ?, bedrooms = ?, bathrooms = ?, description = ?, amenities = ?,
                image_outer = ?, image_hall = ?, image_bedroom = ?, image_kitchen = ?, image_bathroom = ?,
                lat = ?, lng = ?, status = ?, is_verified = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&p.first_name)
        .bind(&p.phone)
        .bind(&p.house_no)
        .bind(&p.street)
        .bind(&p.area)
        .bind(&p.city)
        .bind(&p.listing_type)
        .bind(&p.property_type)
        .bind(&p.building_type)
        .bind(&p.furnishing)
        .bind(&p.parking)
        .bind(p.price)
        .bind(p.sqft)
        .bind(p.bedrooms)
        .bind(p.bathrooms)
        .bind(&p.description)
        .bind(&p.amenities)
        .bind(&p.images.outer)
        .bind(&p.images.hall)
        .bind(&p.images.bedroom)
        .bind(&p.images.kitchen)
        .bind(&p.images.bathroom)
        .bind(p.lat)
        .bind(p.lng)
        .bind(&p.status)
        .bind(p.is_verified)
        .bind(p.updated_at)
        .bind(&p.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PropertyError::NotFound);
        }

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Property>, PropertyError> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    pub async fn get(&self, id: &str) -> Result<Property, PropertyError> {
        self.find_by_id(id).await?.ok_or(PropertyError::NotFound)
    }

    pub async fn delete(&self, id: &str) -> Result<(), PropertyError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PropertyError::NotFound);
        }

        Ok(())
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, PropertyError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE owner_id = ? ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    pub async fn find_all(&self) -> Result<Vec<Property>, PropertyError> {
        let properties = sqlx::query_as::<_, Property>("SELECT * FROM properties ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(properties)
    }

    /// Three newest offerable listings for the home page.
    pub async fn featured(&self, limit: i64) -> Result<Vec<Property>, PropertyError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE status <> ? ORDER BY created_at DESC LIMIT ?",
        )
        .bind(ListingStatus::SENTINEL.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    /// Unbounded, unsorted: see [`SearchFilters`].
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<Property>, PropertyError> {
        let mut qb = filters.build_query();
        let properties = qb.build_query_as::<Property>().fetch_all(&self.pool).await?;
        Ok(properties)
    }

    /// Admin toggle: `is_verified` and `status` move together in one write.
    pub async fn toggle_verification(&self, id: &str) -> Result<Property, PropertyError> {
        let mut property = self.get(id).await?;

        let verified = !property.is_verified;
        property.is_verified = verified;
        property.status = if verified {
            ListingStatus::Verified
        } else {
            ListingStatus::Pending
        }
        .as_str()
        .to_string();
        property.updated_at = Utc::now();

        let result = sqlx::query(
            "UPDATE properties SET is_verified = ?, status = ?, updated_at = ? WHERE id = ?",
        )
        .bind(property.is_verified)
        .bind(&property.status)
        .bind(property.updated_at)
        .bind(&property.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PropertyError::NotFound);
        }

        Ok(property)
    }

    pub async fn stats(&self) -> Result<PropertyStats, PropertyError> {
        let row: (i64, Option<i64>, Option<i64>, Option<i64>, Option<i64>) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                CAST(SUM(is_verified) AS SIGNED),
                CAST(SUM(status = ?) AS SIGNED),
                CAST(SUM(listing_type = 'Rent') AS SIGNED),
                CAST(SUM(listing_type = 'Buy') AS SIGNED)
            FROM properties
            "#,
        )
        .bind(ListingStatus::PendingVerification.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(PropertyStats {
            listings: row.0,
            verified: row.1.unwrap_or(0),
            pending_verification: row.2.unwrap_or(0),
            rent: row.3.unwrap_or(0),
            buy: row.4.unwrap_or(0),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct PropertyStats {
    pub listings: i64,
    pub verified: i64,
    pub pending_verification: i64,
    pub rent: i64,
    pub buy: i64,
}

#[async_trait]
impl ReminderStore for PropertyCrud {
    async fn find_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<Vec<Property>, ReminderError> {
        let properties = sqlx::query_as::<_, Property>(
            "SELECT * FROM properties WHERE status = ? AND last_checked < ?",
        )
        .bind(ListingStatus::PendingVerification.as_str())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(properties)
    }

    async fn mark_checked(&self, id: &str, at: DateTime<Utc>) -> Result<(), ReminderError> {
        sqlx::query("UPDATE properties SET last_checked = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
