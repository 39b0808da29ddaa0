//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blog_core::BlogSettings;
use blog_core::i18n::LanguageConfig;
use blog_core::pagination::{DEFAULT_INDEX_PAGE_SIZE, DEFAULT_SEARCH_PAGE_SIZE};

#[cfg(feature = "postgres")]
use blog_infra::DatabaseConfig;
#[cfg(feature = "smtp")]
use blog_infra::SmtpConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Shown as the feed title.
    pub site_title: String,
    #[cfg(feature = "postgres")]
    pub database: Option<DatabaseConfig>,
    #[cfg(feature = "smtp")]
    pub smtp: Option<SmtpConfig>,
    pub blog: BlogSettings,
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse `LANGUAGES` / `DEFAULT_LANGUAGE`. The default language is always
/// supported.
pub fn parse_languages(languages: Option<&str>, default: Option<&str>) -> LanguageConfig {
    let fallback = LanguageConfig::default();

    let mut supported: Vec<String> = languages
        .map(|list| {
            list.split(',')
                .map(|l| l.trim().to_ascii_lowercase())
                .filter(|l| !l.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if supported.is_empty() {
        supported = fallback.supported.clone();
    }

    let default = default
        .map(|d| d.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| supported[0].clone());
    if !supported.contains(&default) {
        supported.insert(0, default.clone());
    }

    LanguageConfig { default, supported }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "postgres")]
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parse_or("DB_MAX_CONNECTIONS", 20),
            min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
        });

        #[cfg(feature = "smtp")]
        let smtp = env::var("SMTP_HOST").ok().map(|host| SmtpConfig {
            host,
            port: parse_or("SMTP_PORT", blog_infra::mail::DEFAULT_SMTP_PORT),
            user: env::var("SMTP_USER").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
        });

        let languages = parse_languages(
            env::var("LANGUAGES").ok().as_deref(),
            env::var("DEFAULT_LANGUAGE").ok().as_deref(),
        );

        let blog = BlogSettings {
            search_page_size: parse_or("SEARCH_PAGE_SIZE", DEFAULT_SEARCH_PAGE_SIZE),
            index_page_size: parse_or("INDEX_PAGE_SIZE", DEFAULT_INDEX_PAGE_SIZE),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| BlogSettings::default().mail_from),
            languages,
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080),
            site_title: env::var("SITE_TITLE").unwrap_or_else(|_| "Blog".to_string()),
            #[cfg(feature = "postgres")]
            database,
            #[cfg(feature = "smtp")]
            smtp,
            blog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_default_to_english_and_spanish() {
        let config = parse_languages(None, None);
        assert_eq!(config.default, "en");
        assert_eq!(config.supported, vec!["en", "es"]);
    }

    #[test]
    fn test_default_language_is_always_supported() {
        let config = parse_languages(Some("es, FR"), Some("de"));
        assert_eq!(config.default, "de");
        assert_eq!(config.supported, vec!["de", "es", "fr"]);
    }

    #[test]
    fn test_first_language_is_default_when_unset() {
        let config = parse_languages(Some("es,en"), None);
        assert_eq!(config.default, "es");
    }
}
