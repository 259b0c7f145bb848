use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use super::crud::{PropertyCrud, PropertyError};
use super::model::Property;
use super::schema::{
    CreatePropertyRequest, DeletePropertyResponse, PropertyListResponse, PropertyResponseEnvelope,
    SearchPropertiesQuery, UpdatePropertyRequest,
};
use crate::modules::auth::model::Role;
use crate::modules::error::{validation_error, ApiError};
use crate::services::jwt::Claims;
use crate::services::metrics::SearchMetricsCollector;
use crate::services::notify::{self, templates};
use crate::services::search::SearchFilters;
use crate::AppState;

const FEATURED_LIMIT: i64 = 3;

fn ensure_can_modify(claims: &Claims, property: &Property) -> Result<(), PropertyError> {
    if claims.sub == property.owner_id || claims.role == Role::Admin.as_str() {
        Ok(())
    } else {
        Err(PropertyError::Forbidden)
    }
}

pub async fn list_property(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<PropertyResponseEnvelope>), ApiError> {
    req.validate().map_err(validation_error)?;

    let property = req.into_listing(&claims.sub, &claims.email, Utc::now());
    PropertyCrud::new(state.db.clone()).create(&property).await?;

    state
        .metrics
        .listings_created_total
        .with_label_values(&[property.listing_type.as_deref().unwrap_or("unknown")])
        .inc();
    tracing::info!(property_id = %property.id, owner_id = %property.owner_id, "listing submitted");

    match templates::owner_destination(&property, state.notifier.channel()) {
        Some(to) => notify::spawn_send(
            state.notifier.clone(),
            templates::listing_received(&property, to),
        ),
        None => tracing::debug!(property_id = %property.id, "no contact for listing receipt"),
    }

    Ok((
        StatusCode::CREATED,
        Json(PropertyResponseEnvelope {
            success: true,
            message: "Property listed successfully",
            property: property.into(),
        }),
    ))
}

pub async fn update_property(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePropertyRequest>,
) -> Result<Json<PropertyResponseEnvelope>, ApiError> {
    req.validate().map_err(validation_error)?;

    let crud = PropertyCrud::new(state.db.clone());
    let mut property = crud.get(&id).await?;
    ensure_can_modify(&claims, &property)?;

    req.apply(&mut property, Utc::now())
        .map_err(PropertyError::Invalid)?;
    crud.update(&property).await?;

    tracing::info!(property_id = %id, by = %claims.sub, "listing updated");

    Ok(Json(PropertyResponseEnvelope {
        success: true,
        message: "Property updated successfully",
        property: property.into(),
    }))
}

pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeletePropertyResponse>, ApiError> {
    let crud = PropertyCrud::new(state.db.clone());
    let property = crud.get(&id).await?;
    ensure_can_modify(&claims, &property)?;

    crud.delete(&id).await?;
    tracing::info!(property_id = %id, by = %claims.sub, "listing deleted");

    Ok(Json(DeletePropertyResponse {
        success: true,
        message: "Property deleted successfully",
    }))
}

pub async fn my_properties(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PropertyListResponse>, ApiError> {
    let properties = PropertyCrud::new(state.db.clone())
        .find_by_owner(&claims.sub)
        .await?;

    Ok(Json(PropertyListResponse::new(properties)))
}

pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<PropertyResponseEnvelope>, ApiError> {
    let property = PropertyCrud::new(state.db.clone()).get(&id).await?;

    Ok(Json(PropertyResponseEnvelope {
        success: true,
        message: "Property found",
        property: property.into(),
    }))
}

pub async fn featured_properties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PropertyListResponse>, ApiError> {
    let properties = PropertyCrud::new(state.db.clone())
        .featured(FEATURED_LIMIT)
        .await?;

    Ok(Json(PropertyListResponse::new(properties)))
}

pub async fn search_properties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchPropertiesQuery>,
) -> Result<Json<PropertyListResponse>, ApiError> {
    let filters = SearchFilters::from(query);
    tracing::debug!(?filters, "property search");

    let properties = PropertyCrud::new(state.db.clone()).search(&filters).await?;

    SearchMetricsCollector::new(state.metrics.clone()).record_search(!filters.is_empty(), properties.len());

    Ok(Json(PropertyListResponse::new(properties)))
}
