use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::slugify;
use crate::error::DomainError;
use crate::i18n::Locale;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTranslation {
    pub language: String,
    pub name: String,
    pub slug: String,
}

impl CategoryTranslation {
    pub fn new(language: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            language: language.into(),
            slug: slugify(&name),
            name,
        }
    }
}

/// Category entity - a translated grouping with a display color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    /// Six hex digits, no leading `#`.
    pub color: String,
    pub translations: Vec<CategoryTranslation>,
}

impl Category {
    pub fn new(color: &str, translation: CategoryTranslation) -> Result<Self, DomainError> {
        validate_color(color)?;
        Ok(Self {
            id: Uuid::new_v4(),
            color: color.to_ascii_lowercase(),
            translations: vec![translation],
        })
    }

    pub fn with_translation(mut self, translation: CategoryTranslation) -> Self {
        self.translations
            .retain(|t| t.language != translation.language);
        self.translations.push(translation);
        self
    }

    /// Case-insensitive match against the name in any language. Surrounding
    /// whitespace in `name` is ignored.
    pub fn matches_name(&self, name: &str) -> bool {
        let wanted = name.trim().to_lowercase();
        self.translations
            .iter()
            .any(|t| t.name.to_lowercase() == wanted)
    }

    pub fn localized(&self, locale: &Locale) -> Option<CategoryRef> {
        let translation = self
            .translations
            .iter()
            .find(|t| t.language == locale.language)
            .or_else(|| {
                self.translations
                    .iter()
                    .find(|t| t.language == locale.fallback)
            })
            .or_else(|| self.translations.first())?;

        Some(CategoryRef {
            id: self.id,
            name: translation.name.clone(),
            slug: translation.slug.clone(),
            color: self.color.clone(),
        })
    }
}

/// A category rendered in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub color: String,
}

/// Check that a color is a six digit hex code.
pub fn validate_color(color: &str) -> Result<(), DomainError> {
    if color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "'{color}' is not a six digit hex color"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_validation() {
        assert!(validate_color("1a2B3c").is_ok());
        assert!(validate_color("#1a2b3c").is_err());
        assert!(validate_color("12345").is_err());
        assert!(validate_color("zzzzzz").is_err());
    }

    #[test]
    fn test_matches_name_ignores_case_across_languages() {
        let category = Category::new("ff0000", CategoryTranslation::new("en", "Reeds"))
            .unwrap()
            .with_translation(CategoryTranslation::new("es", "Cañas"));

        assert!(category.matches_name("reeds"));
        assert!(category.matches_name("CAÑAS"));
        assert!(!category.matches_name("reed"));
    }

    #[test]
    fn test_matches_name_ignores_surrounding_whitespace() {
        let category = Category::new("ff0000", CategoryTranslation::new("en", "Reeds")).unwrap();

        assert!(category.matches_name(" Reeds"));
        assert!(category.matches_name("reeds\t"));
    }
}
