use serde::{Deserialize, Serialize};

use crate::modules::auth::schema::UserResponse;
use crate::modules::property::crud::PropertyStats;
use crate::modules::property::schema::PropertyResponse;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub users: i64,
    pub listings: i64,
    pub verified: i64,
    pub pending_verification: i64,
    pub rent: i64,
    pub buy: i64,
}

impl DashboardStats {
    pub fn new(users: i64, listings: PropertyStats) -> Self {
        Self {
            users,
            listings: listings.listings,
            verified: listings.verified,
            pending_verification: listings.pending_verification,
            rent: listings.rent,
            buy: listings.buy,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AllPropertiesResponse {
    pub success: bool,
    pub stats: DashboardStats,
    pub count: usize,
    pub properties: Vec<PropertyResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub message: &'static str,
    pub is_verified: bool,
    pub status: String,
    pub property: PropertyResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateRoleResponse {
    pub success: bool,
    pub user: UserResponse,
}
