pub mod config;
pub mod modules;
pub mod services;

use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use config::{DbPool, OtpConfig};
use modules::admin::admin_routes;
use modules::auth::auth_routes;
use modules::favorite::favorite_routes;
use modules::metrics::metrics_routes;
use modules::property::property_routes;
use services::jwt::JwtService;
use services::metrics::{metrics_middleware, MetricsRegistry};
use services::notify::Notifier;
use services::security::security_headers;

pub struct AppState {
    pub db: DbPool,
    pub jwt_service: JwtService,
    pub notifier: Arc<dyn Notifier>,
    pub metrics: Arc<MetricsRegistry>,
    pub otp: OtpConfig,
    pub require_verified_login: bool,
    pub auth_rate_burst: u32,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .merge(auth_routes(state.clone()))
        .merge(property_routes(state.clone()))
        .merge(favorite_routes(state.clone()))
        .merge(admin_routes(state.clone()));

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .merge(metrics_routes())
        .layer(middleware::from_fn_with_state(state.metrics.clone(), metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1MB max body
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> &'static str {
    "EstatePro API"
}
