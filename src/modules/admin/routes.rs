use axum::{
    middleware,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::modules::auth::middleware::require_admin;
use crate::AppState;

pub fn admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/all-properties", get(controller::all_properties))
        .route("/admin/verify/{id}", put(controller::toggle_verification))
        .route("/admin/properties/{id}", delete(controller::delete_property))
        .route("/admin/users/{id}/role", put(controller::update_role))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}
