use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::retry::{is_retryable, RetryConfig};
use super::{Channel, Notification, Notifier, NotifyError};

/// Queues notifications and delivers them on a background task, retrying
/// transient failures. `send` returns once the message is queued.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::Sender<Notification>,
    channel: Channel,
}

impl Outbox {
    pub fn spawn(
        inner: Arc<dyn Notifier>,
        retry: RetryConfig,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Notification>(capacity.max(1));
        let channel = inner.channel();

        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let inner = inner.clone();
                let retry = retry.clone();
                // Each message retries on its own task so one slow destination
                // does not hold up the queue.
                tokio::spawn(async move {
                    deliver_with_retry(inner.as_ref(), &notification, &retry).await;
                });
            }
            tracing::info!("Notification outbox drained");
        });

        (Self { tx, channel }, handle)
    }
}

/// Sends `notification`, sleeping between attempts per `retry`. Returns
/// whether it was eventually delivered.
pub async fn deliver_with_retry(
    inner: &dyn Notifier,
    notification: &Notification,
    retry: &RetryConfig,
) -> bool {
    let mut attempts = 0u32;

    loop {
        match inner.send(notification).await {
            Ok(()) => return true,
            Err(e) => {
                attempts += 1;
                if !is_retryable(&e) || !retry.should_retry(attempts) {
                    tracing::warn!(
                        to = %notification.to,
                        attempts,
                        "Giving up on notification: {}",
                        e
                    );
                    return false;
                }

                let delay = retry.calculate_delay(attempts - 1);
                tracing::debug!(
                    to = %notification.to,
                    attempt = attempts,
                    "Notification failed ({}), retrying in {:?}",
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[async_trait]
impl Notifier for Outbox {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.tx
            .send(notification.clone())
            .await
            .map_err(|_| NotifyError::OutboxClosed)
    }
}
