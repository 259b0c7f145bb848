pub mod hashing;
pub mod jwt;
pub mod metrics;
pub mod notify;
pub mod rate_limit;
pub mod reminder;
pub mod search;
pub mod security;
