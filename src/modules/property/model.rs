use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// LISTING STATUS
// =============================================================================

/// Lifecycle values stored in `properties.status`.
///
/// `Rented` is the "no longer on market" sentinel: search never returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingStatus {
    PendingVerification,
    Verified,
    Pending,
    Rented,
}

impl ListingStatus {
    pub const SENTINEL: ListingStatus = ListingStatus::Rented;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingVerification => "Pending Verification",
            Self::Verified => "Verified",
            Self::Pending => "Pending",
            Self::Rented => "Rented",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending Verification" => Ok(Self::PendingVerification),
            "Verified" => Ok(Self::Verified),
            "Pending" => Ok(Self::Pending),
            "Rented" => Ok(Self::Rented),
            other => Err(format!("Unknown listing status '{}'", other)),
        }
    }
}

// =============================================================================
// PROPERTY
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct ImageSet {
    #[sqlx(rename = "image_outer")]
    pub outer: Option<String>,
    #[sqlx(rename = "image_hall")]
    pub hall: Option<String>,
    #[sqlx(rename = "image_bedroom")]
    pub bedroom: Option<String>,
    #[sqlx(rename = "image_kitchen")]
    pub kitchen: Option<String>,
    #[sqlx(rename = "image_bathroom")]
    pub bathroom: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Property {
    pub id: String,
    pub owner_id: String,
    pub owner_email: String,
    pub first_name: String,
    pub phone: Option<String>,
    pub house_no: Option<String>,
    pub street: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub listing_type: Option<String>,
    pub property_type: Option<String>,
    pub building_type: Option<String>,
    pub furnishing: Option<String>,
    pub parking: Option<String>,
    pub price: Option<f64>,
    pub sqft: Option<f64>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub description: Option<String>,
    pub amenities: Json<Vec<String>>,
    #[sqlx(flatten)]
    pub images: ImageSet,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_checked: DateTime<Utc>,
}

impl Property {
    /// A fresh listing as an owner submits it: awaiting verification, checked "now".
    pub fn new_listing(owner_id: &str, owner_email: &str, first_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id: owner_id.to_string(),
            owner_email: owner_email.to_string(),
            first_name: first_name.to_string(),
            phone: None,
            house_no: None,
            street: None,
            area: None,
            city: None,
            listing_type: None,
            property_type: None,
            building_type: None,
            furnishing: None,
            parking: None,
            price: None,
            sqft: None,
            bedrooms: None,
            bathrooms: None,
            description: None,
            amenities: Json(Vec::new()),
            images: ImageSet::default(),
            lat: None,
            lng: None,
            status: ListingStatus::PendingVerification.as_str().to_string(),
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_checked: now,
        }
    }

    pub fn has_status(&self, status: ListingStatus) -> bool {
        self.status == status.as_str()
    }

    /// Same predicate the reminder scan runs in SQL.
    pub fn is_due_for_reminder(&self, cutoff: DateTime<Utc>) -> bool {
        self.has_status(ListingStatus::PendingVerification) && self.last_checked < cutoff
    }

    /// "12B, Lake View Road, Adyar, Chennai" from whichever parts are filled in.
    pub fn display_address(&self) -> String {
        let parts: Vec<&str> = [&self.house_no, &self.street, &self.area, &self.city]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            "your listed address".to_string()
        } else {
            parts.join(", ")
        }
    }
}
