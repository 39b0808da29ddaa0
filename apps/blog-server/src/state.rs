//! Application state - shared across all handlers.

use std::sync::Arc;

use blog_core::ports::Mailer;
use blog_core::service::Repositories;
use blog_core::{BlogService, BlogSettings};
use blog_infra::{InMemoryStore, LoggingMailer};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub blog: Arc<BlogService>,
    /// Feed title.
    pub site_title: String,
    /// `postgres` or `memory`.
    pub storage: &'static str,
    /// `smtp` or `log`.
    pub mailer: &'static str,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (repos, storage) = Self::repositories(config).await;
        let (mailer, mailer_kind) = Self::mailer(config);

        tracing::info!(
            storage = storage,
            mailer = mailer_kind,
            "Application state initialized"
        );

        Self {
            storage,
            mailer: mailer_kind,
            ..Self::from_parts(repos, mailer, config.blog.clone(), &config.site_title)
        }
    }

    /// State over explicit parts, reported as in-memory with logged mail.
    pub fn from_parts(
        repos: Repositories,
        mailer: Arc<dyn Mailer>,
        settings: BlogSettings,
        site_title: &str,
    ) -> Self {
        Self {
            blog: Arc::new(BlogService::new(repos, mailer, settings)),
            site_title: site_title.to_string(),
            storage: "memory",
            mailer: "log",
        }
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> (Repositories, &'static str) {
        let Some(db_config) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running with the in-memory store.");
            return (Arc::new(InMemoryStore::new()).repositories(), "memory");
        };

        match blog_infra::connect(db_config).await {
            Ok(db) => (blog_infra::postgres_repositories(db), "postgres"),
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                (Arc::new(InMemoryStore::new()).repositories(), "memory")
            }
        }
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> (Repositories, &'static str) {
        tracing::info!("Running without postgres feature - using the in-memory store");
        (Arc::new(InMemoryStore::new()).repositories(), "memory")
    }

    #[cfg(feature = "smtp")]
    fn mailer(config: &AppConfig) -> (Arc<dyn Mailer>, &'static str) {
        let Some(smtp) = &config.smtp else {
            tracing::info!("SMTP_HOST not set. Outgoing mail will be logged.");
            return (Arc::new(LoggingMailer::new()), "log");
        };

        match blog_infra::SmtpMailer::new(smtp) {
            Ok(mailer) => (Arc::new(mailer), "smtp"),
            Err(e) => {
                tracing::error!("Failed to configure SMTP: {}. Logging mail instead.", e);
                (Arc::new(LoggingMailer::new()), "log")
            }
        }
    }

    #[cfg(not(feature = "smtp"))]
    fn mailer(_config: &AppConfig) -> (Arc<dyn Mailer>, &'static str) {
        tracing::info!("Running without smtp feature - outgoing mail will be logged");
        (Arc::new(LoggingMailer::new()), "log")
    }
}
