use async_trait::async_trait;
use std::time::Duration;

use super::{Channel, Notification, Notifier, NotifyError};

/// Places an automated call that reads the message aloud, through a
/// Twilio-compatible REST API (`POST {base}/Accounts/{sid}/Calls.json`).
pub struct VoiceNotifier {
    client: reqwest::Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    default_country_code: String,
}

impl VoiceNotifier {
    pub fn new(
        api_base: String,
        account_sid: String,
        auth_token: String,
        from_number: String,
        default_country_code: String,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            account_sid,
            auth_token,
            from_number,
            default_country_code,
        }
    }

    /// E.164 form of a stored phone number: digits only, prefixed with the
    /// default country code when the owner typed a local number.
    pub fn normalize_number(&self, raw: &str) -> Result<String, NotifyError> {
        let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() < 7 || digits.len() > 15 {
            return Err(NotifyError::InvalidDestination(raw.to_string()));
        }

        if raw.trim_start().starts_with('+') {
            Ok(format!("+{}", digits))
        } else {
            Ok(format!("{}{}", self.default_country_code, digits))
        }
    }
}

/// TwiML document that speaks `message` once.
pub fn say_twiml(message: &str) -> String {
    format!(
        "<Response><Say voice=\"alice\">{}</Say></Response>",
        escape_xml(message)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[async_trait]
impl Notifier for VoiceNotifier {
    fn channel(&self) -> Channel {
        Channel::Voice
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let to = self.normalize_number(&notification.to)?;
        let url = format!("{}/Accounts/{}/Calls.json", self.api_base, self.account_sid);
        let twiml = say_twiml(&notification.body);

        let params = [
            ("To", to.as_str()),
            ("From", self.from_number.as_str()),
            ("Twiml", twiml.as_str()),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
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

        let json: serde_json::Value = response.json().await.unwrap_or_default();
        tracing::info!(
            to = %to,
            call_sid = json["sid"].as_str().unwrap_or(""),
            "📞 Voice call queued"
        );
        Ok(())
    }
}
