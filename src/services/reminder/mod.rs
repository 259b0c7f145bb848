pub mod poller;

pub use poller::{ReminderPoller, TickReport};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::modules::property::model::Property;

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid staleness window: {0}")]
    InvalidWindow(String),
}

/// Listing persistence the poller needs: one scan and one stamp.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Listings in `Pending Verification` whose `last_checked` is strictly before `cutoff`.
    async fn find_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<Vec<Property>, ReminderError>;

    async fn mark_checked(&self, id: &str, at: DateTime<Utc>) -> Result<(), ReminderError>;
}
