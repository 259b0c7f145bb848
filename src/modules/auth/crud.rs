use axum::{http::StatusCode, Json};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::{MySql, Pool};

use super::model::{OneTimeCode, User};
use crate::modules::error::{internal_error, ApiError, ErrorResponse};
use crate::services::hashing;

// =============================================================================
// AUTH ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is not verified")]
    NotVerified,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Phone number is already registered")]
    PhoneAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Invalid(String),

    #[error("No verification code was requested")]
    CodeNotFound,

    #[error("Verification code has expired")]
    CodeExpired,

    #[error("Invalid verification code")]
    CodeMismatch,

    #[error("Too many incorrect attempts, request a new code")]
    TooManyAttempts,

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotVerified => StatusCode::FORBIDDEN,
            Self::UserAlreadyExists | Self::PhoneAlreadyExists => StatusCode::CONFLICT,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::Invalid(_)
            | Self::CodeNotFound
            | Self::CodeExpired
            | Self::CodeMismatch
            | Self::TooManyAttempts => StatusCode::BAD_REQUEST,
            Self::Token(_) | Self::Hashing(_) | Self::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => internal_error("user store", e),
            AuthError::Token(e) => internal_error("token signing", e),
            AuthError::Hashing(e) => internal_error("password hashing", e),
            other => (other.status_code(), Json(ErrorResponse::new(other.to_string()))),
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::Hashing(err.to_string())
    }
}

fn is_duplicate_key(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// =============================================================================
// USER CRUD
// =============================================================================

#[derive(Clone)]
pub struct UserCrud {
    pool: Pool<MySql>,
}

impl UserCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<(), AuthError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, phone, first_name, password_hash, role, is_verified, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.first_name)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.is_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AuthError::UserAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE phone = ?")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Checks a password for the account behind `identifier` (email or phone).
    /// An unknown identifier and a wrong password fail the same way.
    pub async fn authenticate(&self, identifier: &Identifier, password: &str) -> Result<User, AuthError> {
        let user = match identifier {
            Identifier::Email(email) => self.find_by_email(email).await?,
            Identifier::Phone(phone) => self.find_by_phone(phone).await?,
        }
        .ok_or(AuthError::InvalidCredentials)?;

        if !hashing::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn update_password(&self, user_id: &str, password_hash: &str) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    /// Marks every account registered with `phone` as verified.
    pub async fn mark_phone_verified(&self, phone: &str) -> Result<u64, AuthError> {
        let result = sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = ? WHERE phone = ?")
            .bind(Utc::now())
            .bind(phone)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_role(&self, user_id: &str, role: &str) -> Result<User, AuthError> {
        let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        self.find_by_id(user_id).await?.ok_or(AuthError::UserNotFound)
    }

    pub async fn count(&self) -> Result<i64, AuthError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}

/// Login identifier as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identifier {
    Email(String),
    Phone(String),
}

// =============================================================================
// ONE-TIME CODES
// =============================================================================

#[derive(Clone)]
pub struct OtpCrud {
    pool: Pool<MySql>,
}

/// Six decimal digits, leading zeros kept.
pub fn generate_code() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:06}", n)
}

impl OtpCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    /// Stores a fresh code for `destination`, replacing any earlier one, and
    /// returns the plain code for delivery.
    pub async fn issue(&self, destination: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, AuthError> {
        let code = generate_code();

        sqlx::query(
            r#"
            INSERT INTO one_time_codes (destination, code_hash, attempts, expires_at, created_at)
            VALUES (?, ?, 0, ?, ?)
            ON DUPLICATE KEY UPDATE
                code_hash = VALUES(code_hash),
                attempts = 0,
                expires_at = VALUES(expires_at),
                created_at = VALUES(created_at)
            "#,
        )
        .bind(destination)
        .bind(hashing::hash_code(destination, &code))
        .bind(now + ttl)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(code)
    }

    pub async fn find(&self, destination: &str) -> Result<Option<OneTimeCode>, AuthError> {
        let code = sqlx::query_as::<_, OneTimeCode>("SELECT * FROM one_time_codes WHERE destination = ?")
            .bind(destination)
            .fetch_optional(&self.pool)
            .await?;
        Ok(code)
    }

    /// Consumes the code on a match. Expired codes and codes that reach
    /// `max_attempts` wrong guesses are deleted.
    pub async fn verify(
        &self,
        destination: &str,
        code: &str,
        max_attempts: i32,
        now: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let stored = self.find(destination).await?.ok_or(AuthError::CodeNotFound)?;

        if stored.is_expired(now) {
            self.delete(destination).await?;
            return Err(AuthError::CodeExpired);
        }

        if stored.code_hash == hashing::hash_code(destination, code) {
            self.delete(destination).await?;
            return Ok(());
        }

        if stored.attempts + 1 >= max_attempts {
            self.delete(destination).await?;
            return Err(AuthError::TooManyAttempts);
        }

        sqlx::query("UPDATE one_time_codes SET attempts = attempts + 1 WHERE destination = ?")
            .bind(destination)
            .execute(&self.pool)
            .await?;

        Err(AuthError::CodeMismatch)
    }

    pub async fn delete(&self, destination: &str) -> Result<(), AuthError> {
        sqlx::query("DELETE FROM one_time_codes WHERE destination = ?")
            .bind(destination)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
