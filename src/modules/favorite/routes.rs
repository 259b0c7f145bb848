use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::modules::auth::middleware::require_auth;
use crate::AppState;

pub fn favorite_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/favorites", get(controller::list_favorites))
        .route("/favorites/{id}", post(controller::toggle_favorite))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}
