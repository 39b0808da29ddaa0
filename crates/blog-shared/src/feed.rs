//! JSON Feed 1.1 document types.
//!
//! See: https://www.jsonfeed.org/version/1.1/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

/// Media type of a JSON Feed document.
pub const JSON_FEED_CONTENT_TYPE: &str = "application/feed+json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDocument {
    pub version: String,
    pub title: String,
    pub home_page_url: String,
    pub feed_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub items: Vec<FeedItemDto>,
}

impl FeedDocument {
    pub fn new(title: impl Into<String>, home_page_url: impl Into<String>) -> Self {
        let home_page_url = home_page_url.into();
        Self {
            version: JSON_FEED_VERSION.to_string(),
            title: title.into(),
            feed_url: format!("{}/feed/", home_page_url.trim_end_matches('/')),
            home_page_url,
            description: None,
            language: None,
            items: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItemDto {
    pub id: String,
    pub url: String,
    pub title: String,
    pub content_html: String,
    pub summary: String,
    pub date_published: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feed_points_at_feed_route() {
        let feed = FeedDocument::new("Reed Notes", "http://blog.test/");

        assert_eq!(feed.version, JSON_FEED_VERSION);
        assert_eq!(feed.feed_url, "http://blog.test/feed/");

        let json = serde_json::to_value(&feed).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["items"], serde_json::json!([]));
    }
}
