use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use sqlx::types::Json;

use super::model::{ImageSet, ListingStatus, Property};

// =============================================================================
// LENIENT NUMBERS
// =============================================================================
//
// The listing form posts every input as a string ("15000", ""), older clients
// post numbers. Both are accepted; blank or unparsable values become None.

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    }
    .filter(|n| n.is_finite()))
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|n| n.fract() == 0.0 && *n >= i32::MIN as f64 && *n <= i32::MAX as f64)
        .map(|n| n as i32))
}

// =============================================================================
// IMAGES
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImagesPayload {
    #[serde(default)]
    pub outer: Option<String>,
    #[serde(default)]
    pub hall: Option<String>,
    #[serde(default)]
    pub bedroom: Option<String>,
    #[serde(default)]
    pub kitchen: Option<String>,
    #[serde(default)]
    pub bathroom: Option<String>,
}

fn slot(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

impl From<ImagesPayload> for ImageSet {
    fn from(p: ImagesPayload) -> Self {
        Self {
            outer: slot(p.outer),
            hall: slot(p.hall),
            bedroom: slot(p.bedroom),
            kitchen: slot(p.kitchen),
            bathroom: slot(p.bathroom),
        }
    }
}

impl From<ImageSet> for ImagesPayload {
    fn from(i: ImageSet) -> Self {
        // empty slots are sent as "" so the client can fall back to a placeholder
        Self {
            outer: Some(i.outer.unwrap_or_default()),
            hall: Some(i.hall.unwrap_or_default()),
            bedroom: Some(i.bedroom.unwrap_or_default()),
            kitchen: Some(i.kitchen.unwrap_or_default()),
            bathroom: Some(i.bathroom.unwrap_or_default()),
        }
    }
}

// =============================================================================
// CREATE / UPDATE
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[serde(default)]
    pub owner_email: Option<String>,
    #[validate(length(min = 1, message = "Owner name is required"))]
    pub first_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub house_no: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub listing_type: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub building_type: Option<String>,
    #[serde(default)]
    pub furnishing: Option<String>,
    #[serde(default)]
    pub parking: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[validate(required(message = "Price is required"), range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[validate(range(min = 0.0, message = "Area cannot be negative"))]
    pub sqft: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(range(min = 0, message = "Bedrooms cannot be negative"))]
    pub bedrooms: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    #[validate(range(min = 0, message = "Bathrooms cannot be negative"))]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: ImagesPayload,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[validate(required(message = "Please pin the location on the map"))]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[validate(required(message = "Please pin the location on the map"))]
    pub lng: Option<f64>,
}

/// Partial update; absent fields are left untouched.
///
/// `status` may be set here without touching `is_verified`; only the admin
/// verification toggle moves the two together.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Owner name cannot be empty"))]
    pub first_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub house_no: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub listing_type: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub building_type: Option<String>,
    #[serde(default)]
    pub furnishing: Option<String>,
    #[serde(default)]
    pub parking: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    #[validate(range(min = 0.0, message = "Area cannot be negative"))]
    pub sqft: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub bedrooms: Option<i32>,
    #[serde(default, deserialize_with = "lenient_i32")]
    pub bathrooms: Option<i32>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<ImagesPayload>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub lng: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

fn text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn tags(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

impl CreatePropertyRequest {
    /// Builds the stored listing. The owner's account email is used unless the
    /// form names a different contact address.
    pub fn into_listing(self, owner_id: &str, account_email: &str, now: DateTime<Utc>) -> Property {
        let owner_email = text(self.owner_email).unwrap_or_else(|| account_email.to_string());
        let mut p = Property::new_listing(owner_id, &owner_email, self.first_name.trim(), now);

        p.phone = text(self.phone);
        p.house_no = text(self.house_no);
        p.street = text(self.street);
        p.area = text(self.area);
        p.city = text(self.city);
        p.listing_type = text(self.listing_type);
        p.property_type = text(self.property_type);
        p.building_type = text(self.building_type);
        p.furnishing = text(self.furnishing);
        p.parking = text(self.parking);
        p.price = self.price;
        p.sqft = self.sqft;
        p.bedrooms = self.bedrooms;
        p.bathrooms = self.bathrooms;
        p.description = text(self.description);
        p.amenities = Json(tags(self.amenities));
        p.images = self.images.into();
        p.lat = self.lat;
        p.lng = self.lng;
        p
    }
}

impl UpdatePropertyRequest {
    /// Overwrites the fields present in the request. A blank string clears an
    /// optional text field.
    pub fn apply(self, p: &mut Property, now: DateTime<Utc>) -> Result<(), String> {
        if let Some(status) = self.status {
            p.status = status.parse::<ListingStatus>()?.as_str().to_string();
        }
        if let Some(first_name) = self.first_name {
            p.first_name = first_name.trim().to_string();
        }

        macro_rules! set_text {
            ($($field:ident),*) => {
                $(if self.$field.is_some() { p.$field = text(self.$field); })*
            };
        }
        set_text!(
            phone, house_no, street, area, city, listing_type, property_type, building_type,
            furnishing, parking, description
        );

        if self.price.is_some() {
            p.price = self.price;
        }
        if self.sqft.is_some() {
            p.sqft = self.sqft;
        }
        if self.bedrooms.is_some() {
            p.bedrooms = self.bedrooms;
        }
        if self.bathrooms.is_some() {
            p.bathrooms = self.bathrooms;
        }
        if let Some(amenities) = self.amenities {
            p.amenities = Json(tags(amenities));
        }
        if let Some(images) = self.images {
            p.images = images.into();
        }
        if self.lat.is_some() {
            p.lat = self.lat;
        }
        if self.lng.is_some() {
            p.lng = self.lng;
        }

        p.updated_at = now;
        Ok(())
    }
}

// =============================================================================
// SEARCH
// =============================================================================

/// Raw `/search-properties` query string. Values stay strings here so that a
/// malformed number degrades to "filter absent" instead of a 400.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPropertiesQuery {
    pub query: Option<String>,
    pub max_price: Option<String>,
    pub max_sqft: Option<String>,
    pub listing_type: Option<String>,
    pub property_type: Option<String>,
    pub furnishing: Option<String>,
    pub building_type: Option<String>,
    pub parking: Option<String>,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyResponse {
    #[serde(rename = "_id")]
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
    pub amenities: Vec<String>,
    pub images: ImagesPayload,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub status: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_checked: DateTime<Utc>,
}

impl From<Property> for PropertyResponse {
    fn from(p: Property) -> Self {
        Self {
            id: p.id,
            owner_id: p.owner_id,
            owner_email: p.owner_email,
            first_name: p.first_name,
            phone: p.phone,
            house_no: p.house_no,
            street: p.street,
            area: p.area,
            city: p.city,
            listing_type: p.listing_type,
            property_type: p.property_type,
            building_type: p.building_type,
            furnishing: p.furnishing,
            parking: p.parking,
            price: p.price,
            sqft: p.sqft,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            description: p.description,
            amenities: p.amenities.0,
            images: p.images.into(),
            lat: p.lat,
            lng: p.lng,
            status: p.status,
            is_verified: p.is_verified,
            created_at: p.created_at,
            updated_at: p.updated_at,
            last_checked: p.last_checked,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyListResponse {
    pub success: bool,
    pub count: usize,
    pub properties: Vec<PropertyResponse>,
}

impl PropertyListResponse {
    pub fn new(properties: Vec<Property>) -> Self {
        Self {
            success: true,
            count: properties.len(),
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PropertyResponseEnvelope {
    pub success: bool,
    pub message: &'static str,
    pub property: PropertyResponse,
}

#[derive(Debug, Serialize)]
pub struct DeletePropertyResponse {
    pub success: bool,
    pub message: &'static str,
}
