//! Error alerting layer for tracing.
//!
//! Events at or above the configured level are forwarded to an
//! [`AlertSender`] from a background task, so logging never waits on the
//! network.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{Layer, layer::Context};

/// Alert message containing error details.
#[derive(Debug, Clone)]
pub struct AlertMessage {
    pub service: String,
    pub level: String,
    pub message: String,
    pub target: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub fields: Vec<(String, String)>,
}

impl AlertMessage {
    /// One-line rendering used by every sender.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "[{}] {} {}: {}",
            self.service, self.level, self.target, self.message
        );
        for (name, value) in &self.fields {
            text.push_str(&format!(" {name}={value}"));
        }
        text
    }
}

/// Configuration for the alert layer.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Least severe level that triggers an alert.
    pub min_level: Level,
    /// Channel buffer size. Alerts beyond it are dropped.
    pub buffer_size: usize,
    pub service_name: String,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_level: Level::ERROR,
            buffer_size: 100,
            service_name: "blog-server".to_string(),
        }
    }
}

/// Destination for alerts.
#[async_trait::async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Failed to send alert: {0}")]
    SendError(String),
}

/// Writes alerts to stderr.
pub struct ConsoleAlertSender;

#[async_trait::async_trait]
impl AlertSender for ConsoleAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        eprintln!("ALERT {} at {}", alert.summary(), alert.timestamp);
        Ok(())
    }
}

/// Posts alerts to a chat webhook (Slack and Discord accept `text`).
pub struct WebhookAlertSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlertSender {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertSender for WebhookAlertSender {
    async fn send(&self, alert: AlertMessage) -> Result<(), AlertError> {
        let payload = serde_json::json!({
            "text": alert.summary(),
            "timestamp": alert.timestamp.to_rfc3339(),
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| AlertError::SendError(e.to_string()))?;

        Ok(())
    }
}

/// Tracing layer that forwards severe events to an [`AlertSender`].
pub struct AlertLayer {
    sender: mpsc::Sender<AlertMessage>,
    min_level: Level,
    service_name: String,
}

impl AlertLayer {
    /// Must be called from inside a Tokio runtime.
    pub fn new(alert_sender: Arc<dyn AlertSender>, config: AlertConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<AlertMessage>(config.buffer_size.max(1));

        tokio::spawn(async move {
            while let Some(alert) = rx.recv().await {
                if let Err(e) = alert_sender.send(alert).await {
                    eprintln!("Failed to send alert: {}", e);
                }
            }
        });

        Self {
            sender: tx,
            min_level: config.min_level,
            service_name: config.service_name,
        }
    }

    pub fn console(config: AlertConfig) -> Self {
        Self::new(Arc::new(ConsoleAlertSender), config)
    }

    pub fn webhook(url: String, config: AlertConfig) -> Self {
        Self::new(Arc::new(WebhookAlertSender::new(url)), config)
    }
}

/// `Level` orders verbosity, so ERROR is the smallest value.
fn should_alert(level: &Level, min_level: &Level) -> bool {
    level <= min_level
}

/// Collects the message and fields of an event.
#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }
    }
}

impl<S> Layer<S> for AlertLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let level = event.metadata().level();
        if !should_alert(level, &self.min_level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let alert = AlertMessage {
            service: self.service_name.clone(),
            level: level.to_string(),
            message: visitor.message,
            target: event.metadata().target().to_string(),
            timestamp: chrono::Utc::now(),
            fields: visitor.fields,
        };

        // Full buffer or closed channel: drop the alert.
        let _ = self.sender.try_send(alert);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_threshold() {
        assert!(should_alert(&Level::ERROR, &Level::ERROR));
        assert!(!should_alert(&Level::WARN, &Level::ERROR));
        assert!(should_alert(&Level::ERROR, &Level::WARN));
        assert!(should_alert(&Level::WARN, &Level::WARN));
        assert!(!should_alert(&Level::INFO, &Level::WARN));
    }

    #[test]
    fn test_summary_includes_fields() {
        let alert = AlertMessage {
            service: "blog-server".to_string(),
            level: "ERROR".to_string(),
            message: "Share email failed".to_string(),
            target: "blog_core::service".to_string(),
            timestamp: chrono::Utc::now(),
            fields: vec![("post_id".to_string(), "42".to_string())],
        };

        assert_eq!(
            alert.summary(),
            "[blog-server] ERROR blog_core::service: Share email failed post_id=42"
        );
    }
}
