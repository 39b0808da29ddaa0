//! Read models returned by listing queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CategoryRef, Tag};

/// A published post as it appears in listings, rendered in one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub publish: DateTime<Utc>,
    pub author: String,
    pub category: Option<CategoryRef>,
    pub tags: Vec<Tag>,
    pub visits: i64,
    pub comment_count: i64,
    /// Trigram similarity, only set for text searches.
    pub similarity: Option<f64>,
}

impl PostSummary {
    pub fn absolute_path(&self) -> String {
        super::post::post_path(self.publish, &self.slug)
    }
}

/// A month that has at least one published post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMonth {
    pub year: i32,
    pub month: u32,
}
