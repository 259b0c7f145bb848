pub mod types;
pub mod templates;
pub mod log_sink;
pub mod email;
pub mod voice;
pub mod retry;
pub mod outbox;

pub use types::*;
pub use log_sink::LogNotifier;
pub use email::EmailNotifier;
pub use voice::VoiceNotifier;
pub use retry::RetryConfig;
pub use outbox::Outbox;

use std::sync::Arc;

/// Fire-and-forget delivery: the request never waits on the provider and a
/// failure only reaches the log.
pub fn spawn_send(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        if let Err(e) = notifier.send(&notification).await {
            tracing::warn!(
                to = %notification.to,
                channel = %notifier.channel(),
                "Notification not delivered: {}",
                e
            );
        }
    });
}
