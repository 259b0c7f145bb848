use async_trait::async_trait;
use std::fmt;

/// Transport a notification travels over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Log,
    Email,
    Voice,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Email => "email",
            Self::Voice => "voice",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered message addressed to one destination (email address or phone number).
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Provider rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    #[error("Notification outbox is closed")]
    OutboxClosed,
}

/// Out-of-band delivery. A failed send is the caller's to log; it is never fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn channel(&self) -> Channel;

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
