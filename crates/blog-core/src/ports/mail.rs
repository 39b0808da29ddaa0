//! Outgoing mail port.

use async_trait::async_trait;

/// A plain-text message ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Mail transport - SMTP in production, a logger when unconfigured.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Email address parse error: {0}")]
    Address(String),

    #[error("Email build error: {0}")]
    Build(String),

    #[error("Mail transport error: {0}")]
    Transport(String),
}
