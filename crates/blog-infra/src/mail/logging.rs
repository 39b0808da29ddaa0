use async_trait::async_trait;
use tokio::sync::Mutex;

use blog_core::ports::{MailError, Mailer, OutgoingMail};

/// Logs messages instead of delivering them and keeps them in an outbox.
///
/// Used when no SMTP host is configured.
#[derive(Default)]
pub struct LoggingMailer {
    outbox: Mutex<Vec<OutgoingMail>>,
}

impl LoggingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages "sent" so far, oldest first.
    pub async fn outbox(&self) -> Vec<OutgoingMail> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for LoggingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            subject = %mail.subject,
            recipients = mail.to.len(),
            "SMTP not configured, logging email instead of sending"
        );
        tracing::debug!(body = %mail.body, "Email body");

        self.outbox.lock().await.push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logged_mail_lands_in_outbox() {
        let mailer = LoggingMailer::new();
        let mail = OutgoingMail {
            from: "blog@example.com".to_string(),
            to: vec!["friend@example.com".to_string()],
            reply_to: None,
            subject: "Hello".to_string(),
            body: "Body".to_string(),
        };

        mailer.send(&mail).await.unwrap();

        assert_eq!(mailer.outbox().await, vec![mail]);
    }
}
