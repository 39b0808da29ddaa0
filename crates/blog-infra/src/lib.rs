//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory store and logging mailer only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `smtp` - SMTP mail delivery via lettre

pub mod mail;
pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

// Re-exports - In-Memory
pub use mail::LoggingMailer;
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, connect, postgres_repositories};

#[cfg(feature = "smtp")]
pub use mail::{SmtpConfig, SmtpMailer};
