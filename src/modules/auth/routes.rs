use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::controller;
use super::middleware::require_auth;
use crate::services::rate_limit::{create_rate_limiter, RateLimitLayer};
use crate::AppState;

/// Credential endpoints share one limiter; `/me` is behind the bearer guard.
pub fn auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let limiter = create_rate_limiter(state.auth_rate_burst, state.auth_rate_burst);

    let credentials = Router::new()
        .route("/register", post(controller::register))
        .route("/login", post(controller::login))
        .route("/send-otp", post(controller::send_otp))
        .route("/verify-otp", post(controller::verify_otp))
        .route("/forgot-password", post(controller::forgot_password))
        .route("/reset-password", post(controller::reset_password))
        .route_layer(RateLimitLayer::new(limiter));

    let session = Router::new()
        .route("/me", get(controller::me))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    credentials.merge(session)
}
