pub mod admin;
pub mod auth;
pub mod error;
pub mod favorite;
pub mod metrics;
pub mod property;
