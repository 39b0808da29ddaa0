use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Post;
use crate::content::image_upload_path;

/// Image attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostImage {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    /// Storage path, see [`crate::content::image_upload_path`].
    pub image: String,
    pub source_or_author: Option<String>,
}

impl PostImage {
    pub fn new(post_id: Uuid, name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            name: name.into(),
            image: image.into(),
            source_or_author: None,
        }
    }

    /// An image uploaded for `post`, stored under the post's title.
    pub fn uploaded(post: &Post, name: impl Into<String>, filename: &str) -> Self {
        let title = post
            .translations
            .first()
            .map(|t| t.title.as_str())
            .unwrap_or_default();
        Self::new(post.id, name, image_upload_path(title, filename))
    }

    pub fn credited_to(mut self, source: impl Into<String>) -> Self {
        self.source_or_author = Some(source.into());
        self
    }
}
