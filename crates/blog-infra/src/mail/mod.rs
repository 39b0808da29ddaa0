//! Mail transports - SMTP and a logging fallback for unconfigured setups.

mod logging;
#[cfg(feature = "smtp")]
mod smtp;

pub use logging::LoggingMailer;
#[cfg(feature = "smtp")]
pub use smtp::{DEFAULT_SMTP_PORT, SmtpConfig, SmtpMailer};
