use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::crud::{AuthError, Identifier, OtpCrud, UserCrud};
use super::model::{normalize_email, normalize_phone, Role, User};
use super::schema::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MeResponse, MessageResponse,
    RegisterRequest, ResetPasswordRequest, SendOtpRequest, VerifyOtpRequest,
};
use crate::modules::error::{validation_error, ApiError};
use crate::modules::favorite::crud::FavoriteCrud;
use crate::services::hashing;
use crate::services::jwt::Claims;
use crate::services::notify::{self, templates, Channel};
use crate::AppState;

fn phone_or_invalid(raw: &str) -> Result<String, AuthError> {
    normalize_phone(raw).ok_or_else(|| AuthError::Invalid("Invalid phone number".to_string()))
}

fn issue_token(state: &AppState, user: User) -> Result<AuthResponse, AuthError> {
    let token = state
        .jwt_service
        .create_access_token(&user.id, &user.email, &user.role)?;

    Ok(AuthResponse {
        success: true,
        token,
        role: user.role.clone(),
        expires_in: state.jwt_service.get_access_token_duration_secs(),
        user: user.into(),
    })
}

/// Stores a fresh code under `key` and sends it to `deliver_to` in the background.
async fn send_code(
    state: &AppState,
    key: &str,
    deliver_to: String,
    purpose: &str,
) -> Result<(), AuthError> {
    let code = OtpCrud::new(state.db.clone())
        .issue(key, state.otp.ttl, Utc::now())
        .await?;

    state.metrics.otp_issued_total.with_label_values(&[purpose]).inc();
    tracing::info!(destination = %deliver_to, purpose, "one-time code issued");

    notify::spawn_send(
        state.notifier.clone(),
        templates::one_time_code(deliver_to, &code, state.otp.ttl.num_minutes()),
    );
    Ok(())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    req.validate().map_err(validation_error)?;

    let role: Role = req.user_type.parse().map_err(AuthError::Invalid)?;
    if !role.is_self_assignable() {
        return Err(AuthError::Invalid("Role cannot be self-assigned".to_string()).into());
    }

    let phone = match req.phone.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(phone_or_invalid(raw)?),
        _ => None,
    };

    let crud = UserCrud::new(state.db.clone());
    let email = normalize_email(&req.email);

    if crud.find_by_email(&email).await?.is_some() {
        return Err(AuthError::UserAlreadyExists.into());
    }
    if let Some(phone) = &phone {
        if crud.find_by_phone(phone).await?.is_some() {
            return Err(AuthError::PhoneAlreadyExists.into());
        }
    }

    let password_hash = hashing::hash_password(&req.password).map_err(AuthError::from)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email,
        phone,
        first_name: req.first_name.trim().to_string(),
        password_hash,
        role: role.as_str().to_string(),
        is_verified: false,
        created_at: now,
        updated_at: now,
    };

    crud.create(&user).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    if let Some(phone) = user.phone.clone() {
        send_code(&state, &phone, phone.clone(), "register").await?;
    }

    Ok((StatusCode::CREATED, Json(issue_token(&state, user)?)))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let identifier = match (req.email.as_deref(), req.phone.as_deref()) {
        (Some(email), _) if !email.trim().is_empty() => Identifier::Email(normalize_email(email)),
        (_, Some(phone)) if !phone.trim().is_empty() => {
            Identifier::Phone(normalize_phone(phone).ok_or(AuthError::InvalidCredentials)?)
        }
        _ => return Err(AuthError::Invalid("Email or phone is required".to_string()).into()),
    };

    let result = UserCrud::new(state.db.clone())
        .authenticate(&identifier, &req.password)
        .await;

    let outcome = match &result {
        Ok(_) => "success",
        Err(AuthError::InvalidCredentials) => "invalid",
        Err(_) => "error",
    };
    state.metrics.login_attempts_total.with_label_values(&[outcome]).inc();

    let user = result?;

    if state.require_verified_login && !user.is_verified && !user.is_admin() {
        return Err(AuthError::NotVerified.into());
    }

    Ok(Json(issue_token(&state, user)?))
}

pub async fn send_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SendOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let phone = phone_or_invalid(&req.phone)?;
    send_code(&state, &phone, phone.clone(), "phone").await?;

    Ok(Json(MessageResponse::new("Verification code sent")))
}

pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyOtpRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let phone = phone_or_invalid(&req.phone)?;

    OtpCrud::new(state.db.clone())
        .verify(&phone, &req.code, state.otp.max_attempts, Utc::now())
        .await?;

    let updated = UserCrud::new(state.db.clone()).mark_phone_verified(&phone).await?;
    tracing::info!(%phone, accounts = updated, "phone verified");

    Ok(Json(MessageResponse::new("Phone number verified")))
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate().map_err(validation_error)?;
    let email = normalize_email(&req.email);

    if let Some(user) = UserCrud::new(state.db.clone()).find_by_email(&email).await? {
        let deliver_to = match state.notifier.channel() {
            Channel::Voice => user.phone.clone(),
            Channel::Email | Channel::Log => Some(user.email.clone()),
        };

        match deliver_to {
            Some(to) => send_code(&state, &email, to, "password_reset").await?,
            None => tracing::warn!(user_id = %user.id, "no contact for password reset code"),
        }
    }

    Ok(Json(MessageResponse::new(
        "If an account exists for that email, a reset code has been sent",
    )))
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate().map_err(validation_error)?;
    let email = normalize_email(&req.email);

    OtpCrud::new(state.db.clone())
        .verify(&email, &req.code, state.otp.max_attempts, Utc::now())
        .await?;

    let crud = UserCrud::new(state.db.clone());
    let user = crud.find_by_email(&email).await?.ok_or(AuthError::UserNotFound)?;
    let password_hash = hashing::hash_password(&req.password).map_err(AuthError::from)?;
    crud.update_password(&user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "password reset");
    Ok(Json(MessageResponse::new("Password updated")))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<MeResponse>, ApiError> {
    let user = UserCrud::new(state.db.clone())
        .find_by_id(&claims.sub)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let favorites = FavoriteCrud::new(state.db.clone())
        .property_ids(&user.id)
        .await?;

    Ok(Json(MeResponse {
        success: true,
        user: user.into(),
        favorites,
    }))
}
