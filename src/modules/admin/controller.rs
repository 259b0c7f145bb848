use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use super::schema::{
    AllPropertiesResponse, DashboardStats, UpdateRoleRequest, UpdateRoleResponse, VerifyResponse,
};
use crate::modules::auth::crud::{AuthError, UserCrud};
use crate::modules::auth::model::Role;
use crate::modules::error::ApiError;
use crate::modules::property::crud::PropertyCrud;
use crate::modules::property::schema::DeletePropertyResponse;
use crate::services::jwt::Claims;
use crate::AppState;

pub async fn all_properties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AllPropertiesResponse>, ApiError> {
    let crud = PropertyCrud::new(state.db.clone());
    let properties = crud.find_all().await?;
    let listing_stats = crud.stats().await?;
    let users = UserCrud::new(state.db.clone()).count().await?;

    Ok(Json(AllPropertiesResponse {
        success: true,
        stats: DashboardStats::new(users, listing_stats),
        count: properties.len(),
        properties: properties.into_iter().map(Into::into).collect(),
    }))
}

/// Flips `is_verified` and moves `status` with it in one write.
pub async fn toggle_verification(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let property = PropertyCrud::new(state.db.clone())
        .toggle_verification(&id)
        .await?;

    state
        .metrics
        .listings_verified_total
        .with_label_values(&[if property.is_verified { "verified" } else { "unverified" }])
        .inc();
    tracing::info!(
        property_id = %id,
        admin = %claims.sub,
        verified = property.is_verified,
        "verification toggled"
    );

    Ok(Json(VerifyResponse {
        success: true,
        message: if property.is_verified {
            "Property verified"
        } else {
            "Property verification revoked"
        },
        is_verified: property.is_verified,
        status: property.status.clone(),
        property: property.into(),
    }))
}

pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeletePropertyResponse>, ApiError> {
    PropertyCrud::new(state.db.clone()).delete(&id).await?;
    tracing::info!(property_id = %id, admin = %claims.sub, "listing removed by admin");

    Ok(Json(DeletePropertyResponse {
        success: true,
        message: "Property deleted successfully",
    }))
}

pub async fn update_role(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UpdateRoleResponse>, ApiError> {
    let role: Role = req.role.parse().map_err(AuthError::Invalid)?;

    let user = UserCrud::new(state.db.clone())
        .set_role(&user_id, role.as_str())
        .await?;
    tracing::info!(%user_id, role = %role, admin = %claims.sub, "role changed");

    Ok(Json(UpdateRoleResponse {
        success: true,
        user: user.into(),
    }))
}
