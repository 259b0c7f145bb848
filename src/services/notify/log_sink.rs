use async_trait::async_trait;

use super::{Channel, Notification, Notifier, NotifyError};

/// Writes the notification to the log instead of delivering it. Default for
/// development and for deployments without a provider account.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn channel(&self) -> Channel {
        Channel::Log
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "📞 {}",
            notification.body
        );
        Ok(())
    }
}
