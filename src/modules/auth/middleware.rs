use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::crud::UserCrud;
use super::model::Role;
use crate::modules::error::{api_error, ApiError};
use crate::services::jwt::Claims;
use crate::AppState;

/// Bearer token guard. On success the verified [`Claims`] are stored as a
/// request extension for handlers to take via `Extension<Claims>`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticate(&state, req.headers()) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}

/// Like [`require_auth`], and the token must carry the admin role. The
/// stored account is checked too, so a demoted admin loses access before
/// their token expires.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let claims = match authenticate(&state, req.headers()) {
        Ok(claims) => claims,
        Err(e) => return e.into_response(),
    };

    if claims.role != Role::Admin.as_str() {
        tracing::warn!(user_id = %claims.sub, "non-admin hit an admin route");
        return api_error(StatusCode::FORBIDDEN, "Admin access required").into_response();
    }

    // Token says admin; the database has the final word
    match UserCrud::new(state.db.clone()).find_by_id(&claims.sub).await {
        Ok(Some(user)) if user.is_admin() => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Ok(Some(_)) => {
            tracing::warn!(user_id = %claims.sub, "admin token for a demoted account");
            api_error(StatusCode::FORBIDDEN, "Admin access required").into_response()
        }
        Ok(None) => api_error(StatusCode::UNAUTHORIZED, "Account no longer exists").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let token = extract_bearer(headers)
        .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Missing authorization token"))?;

    state
        .jwt_service
        .verify_access_token(token)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!("rejected token: {}", e);
            api_error(StatusCode::UNAUTHORIZED, "Invalid or expired token")
        })
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
