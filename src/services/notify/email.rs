use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{Channel, Notification, Notifier, NotifyError};

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends mail through an HTTP mail relay (`POST {relay_url}` with a bearer key).
pub struct EmailNotifier {
    client: reqwest::Client,
    relay_url: String,
    api_key: String,
    from: String,
}

impl EmailNotifier {
    pub fn new(relay_url: String, api_key: String, from: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            client,
            relay_url,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> Channel {
        Channel::Email
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        if !notification.to.contains('@') {
            return Err(NotifyError::InvalidDestination(notification.to.clone()));
        }

        let response = self
            .client
            .post(&self.relay_url)
            .bearer_auth(&self.api_key)
            .json(&RelayMessage {
                from: &self.from,
                to: &notification.to,
                subject: &notification.subject,
                text: &notification.body,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %notification.to, "✅ Email sent via relay");
        Ok(())
    }
}
