//! Language negotiation for translated content.

use serde::{Deserialize, Serialize};

/// The language a request is served in, plus the fallback used when a
/// translation is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    pub language: String,
    pub fallback: String,
}

/// Languages the site publishes in.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub default: String,
    pub supported: Vec<String>,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default: "en".to_string(),
            supported: vec!["en".to_string(), "es".to_string()],
        }
    }
}

impl LanguageConfig {
    pub fn default_locale(&self) -> Locale {
        self.locale(&self.default)
    }

    /// Pick the best supported language from an `Accept-Language` header.
    ///
    /// Entries are ranked by their `q` value; a regional tag such as `es-MX`
    /// matches the primary language `es`. Anything unparseable or
    /// unsupported falls back to the default language.
    pub fn negotiate(&self, accept_language: Option<&str>) -> Locale {
        let Some(header) = accept_language else {
            return self.default_locale();
        };

        let mut ranked: Vec<(f32, usize, String)> = header
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.trim().split(';');
                let tag = parts.next()?.trim().to_ascii_lowercase();
                if tag.is_empty() {
                    return None;
                }
                let quality = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((quality, position, tag))
            })
            .collect();

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));

        ranked
            .iter()
            .find_map(|(_, _, tag)| self.match_tag(tag))
            .map(|language| self.locale(&language))
            .unwrap_or_else(|| self.default_locale())
    }

    fn match_tag(&self, tag: &str) -> Option<String> {
        if let Some(exact) = self.supported.iter().find(|s| s.as_str() == tag) {
            return Some(exact.clone());
        }
        let primary = tag.split('-').next()?;
        self.supported.iter().find(|s| s.as_str() == primary).cloned()
    }

    fn locale(&self, language: &str) -> Locale {
        Locale {
            language: language.to_string(),
            fallback: self.default.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, "en")]
    #[case(Some("es"), "es")]
    #[case(Some("es-MX,es;q=0.9,en;q=0.8"), "es")]
    #[case(Some("fr-FR,fr;q=0.9,es;q=0.5"), "es")]
    #[case(Some("en;q=0.2, es;q=0.7"), "es")]
    #[case(Some("de"), "en")]
    #[case(Some("es;q=0"), "en")]
    #[case(Some(""), "en")]
    fn test_negotiate(#[case] header: Option<&str>, #[case] expected: &str) {
        let config = LanguageConfig::default();
        let locale = config.negotiate(header);
        assert_eq!(locale.language, expected);
        assert_eq!(locale.fallback, "en");
    }
}
