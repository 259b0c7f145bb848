use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use super::controller;
use crate::modules::auth::middleware::require_auth;
use crate::AppState;

pub fn property_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let public = Router::new()
        .route("/properties/{id}", get(controller::get_property))
        .route("/featured-properties", get(controller::featured_properties))
        .route("/search-properties", get(controller::search_properties));

    let owner = Router::new()
        .route("/list-property", post(controller::list_property))
        .route("/update-property/{id}", put(controller::update_property))
        .route("/delete-property/{id}", delete(controller::delete_property))
        .route("/my-properties", get(controller::my_properties))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    public.merge(owner)
}
