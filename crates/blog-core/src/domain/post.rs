use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::slugify;
use crate::i18n::Locale;

use super::Tag;

/// Visibility of a post. A flag, not a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PostStatus::Draft),
            "published" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// Language-specific content of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostTranslation {
    pub language: String,
    pub title: String,
    pub slug: String,
    pub body: String,
}

impl PostTranslation {
    /// Create a translation, deriving the slug from the title.
    pub fn new(language: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            language: language.into(),
            slug: slugify(&title),
            title,
            body: body.into(),
        }
    }
}

/// Post entity - a translated blog article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub status: PostStatus,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub visits: i64,
    pub translations: Vec<PostTranslation>,
    pub tags: Vec<Tag>,
}

impl Post {
    /// Create a new draft post with a single translation.
    pub fn new(author_id: Uuid, translation: PostTranslation) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id: None,
            status: PostStatus::Draft,
            publish: now,
            created_at: now,
            updated_at: now,
            visits: 0,
            translations: vec![translation],
            tags: Vec::new(),
        }
    }

    pub fn publish_at(mut self, publish: DateTime<Utc>) -> Self {
        self.publish = publish;
        self.status = PostStatus::Published;
        self
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_translation(mut self, translation: PostTranslation) -> Self {
        self.translations
            .retain(|t| t.language != translation.language);
        self.translations.push(translation);
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub fn has_been_updated(&self) -> bool {
        self.created_at != self.updated_at
    }

    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }

    /// Pick the translation for `locale`, falling back to the default
    /// language and then to whatever translation exists.
    pub fn translation(&self, locale: &Locale) -> Option<&PostTranslation> {
        self.translations
            .iter()
            .find(|t| t.language == locale.language)
            .or_else(|| {
                self.translations
                    .iter()
                    .find(|t| t.language == locale.fallback)
            })
            .or_else(|| self.translations.first())
    }

    /// Path of the detail page for the given slug: `/<year>/<month>/<day>/<slug>/`.
    pub fn absolute_path(&self, slug: &str) -> String {
        post_path(self.publish, slug)
    }

    pub fn has_tag(&self, tag_id: Uuid) -> bool {
        self.tags.iter().any(|t| t.id == tag_id)
    }
}

/// Build the detail path for a post published at `publish`.
pub fn post_path(publish: DateTime<Utc>, slug: &str) -> String {
    format!(
        "/{}/{}/{}/{}/",
        publish.year(),
        publish.month(),
        publish.day(),
        slug
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn locale(language: &str) -> Locale {
        Locale {
            language: language.to_string(),
            fallback: "en".to_string(),
        }
    }

    #[test]
    fn test_new_post_is_draft_with_slug() {
        let post = Post::new(
            Uuid::new_v4(),
            PostTranslation::new("en", "Intro to Reeds", "body"),
        );
        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.translations[0].slug, "intro-to-reeds");
        assert!(!post.has_been_updated());
    }

    #[test]
    fn test_translation_falls_back_to_default_language() {
        let post = Post::new(Uuid::new_v4(), PostTranslation::new("en", "Reeds", ""))
            .with_translation(PostTranslation::new("es", "Cañas", ""));

        assert_eq!(post.translation(&locale("es")).unwrap().title, "Cañas");
        assert_eq!(post.translation(&locale("de")).unwrap().title, "Reeds");
    }

    #[test]
    fn test_absolute_path_uses_publish_date() {
        let publish = Utc.with_ymd_and_hms(2023, 4, 9, 12, 0, 0).unwrap();
        let post = Post::new(Uuid::new_v4(), PostTranslation::new("en", "Reeds", ""))
            .publish_at(publish);
        assert_eq!(post.absolute_path("reeds"), "/2023/4/9/reeds/");
        assert!(post.is_published());
    }
}
