use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

lazy_static! {
    static ref PHONE_CHARS: Regex = Regex::new(r"^\+?[0-9][0-9 ()\-]*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Tenant,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Tenant => "tenant",
            Self::Admin => "admin",
        }
    }

    /// Roles a visitor may pick at registration.
    pub fn is_self_assignable(&self) -> bool {
        !matches!(self, Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "tenant" | "user" => Ok(Self::Tenant),
            "admin" => Ok(Self::Admin),
            other => Err(format!("Unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub phone: Option<String>,
    pub first_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

/// Hashed code waiting to be confirmed. Keyed by destination (phone or email),
/// so issuing a new code replaces the old one.
#[derive(Debug, Clone, FromRow)]
pub struct OneTimeCode {
    pub destination: String,
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Canonical stored form of a phone number: digits with an optional leading
/// `+`, spaces and punctuation dropped. None if it does not look like a phone.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if !PHONE_CHARS.is_match(raw) {
        return None;
    }

    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if !(7..=15).contains(&digits.len()) {
        return None;
    }

    if raw.starts_with('+') {
        Some(format!("+{}", digits))
    } else {
        Some(digits)
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
