use rand::Rng;
use std::time::Duration;

use super::NotifyError;

/// Backoff policy for queued notification deliveries.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
    /// Total sends per notification, first try included. 1 means no retry.
    pub max_attempts: u32,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_secs: 30,
            max_delay_secs: 3600,
            max_attempts: 1,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, base_delay_secs: u64) -> Self {
        Self {
            base_delay_secs,
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// delay = min(base × 2^attempt × (1 ± jitter), max_delay)
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay_secs as f64 * 2_f64.powi(attempt.min(30) as i32);

        let mut rng = rand::rng();
        let jitter = 1.0 + (rng.random::<f64>() * 2.0 - 1.0) * self.jitter_factor;

        let capped = (exponential * jitter).min(self.max_delay_secs as f64).max(0.0);
        Duration::from_secs(capped as u64)
    }

    /// `attempts_made` sends have already happened.
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}

/// Whether sending the same notification again could succeed.
pub fn is_retryable(err: &NotifyError) -> bool {
    match err {
        NotifyError::InvalidDestination(_) | NotifyError::OutboxClosed => false,
        NotifyError::Rejected { status, .. } => *status == 429 || *status >= 500,
        NotifyError::Http(_) => true,
    }
}
