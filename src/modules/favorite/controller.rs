use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::crud::FavoriteCrud;
use crate::modules::error::ApiError;
use crate::modules::property::schema::PropertyListResponse;
use crate::services::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub success: bool,
    pub favorited: bool,
    pub message: &'static str,
}

pub async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(property_id): Path<String>,
) -> Result<Json<ToggleFavoriteResponse>, ApiError> {
    let favorited = FavoriteCrud::new(state.db.clone())
        .toggle(&claims.sub, &property_id)
        .await?;

    tracing::debug!(user_id = %claims.sub, %property_id, favorited, "favorite toggled");

    Ok(Json(ToggleFavoriteResponse {
        success: true,
        favorited,
        message: if favorited {
            "Added to favorites"
        } else {
            "Removed from favorites"
        },
    }))
}

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PropertyListResponse>, ApiError> {
    let properties = FavoriteCrud::new(state.db.clone())
        .properties(&claims.sub)
        .await?;

    Ok(Json(PropertyListResponse::new(properties)))
}
