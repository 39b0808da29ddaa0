//! Data Transfer Objects - response and form types for the blog API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field name to validation messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDto {
    pub name: String,
    pub slug: String,
    /// Tag search page.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    /// Hex color without the leading `#`.
    pub color: String,
    /// Category search page.
    pub url: String,
}

/// A post as shown in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub publish: DateTime<Utc>,
    pub author: String,
    pub category: Option<CategoryDto>,
    pub tags: Vec<TagDto>,
    pub visits: i64,
    pub comment_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Pagination metadata of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub page_size: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
    pub start_index: u64,
    pub end_index: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Which filter branch ran: `text`, `date`, `tag`, `category` or `none`.
    pub kind: String,
    /// Text for the search box.
    pub placeholder: String,
    pub order_by: Option<String>,
    pub results: PageDto<PostSummaryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub headline: Vec<PostSummaryDto>,
    pub posts: PageDto<PostSummaryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorDto {
    pub username: String,
    pub bio: Option<String>,
    pub credentials: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDto {
    pub name: String,
    pub path: String,
    pub source_or_author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDto {
    pub id: Uuid,
    pub name: String,
    pub body: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub id: Uuid,
    pub language: String,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub body: String,
    pub body_html: String,
    pub publish: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Whether the post was edited after creation.
    pub edited: bool,
    pub visits: i64,
    pub author: AuthorDto,
    pub category: Option<CategoryDto>,
    pub tags: Vec<TagDto>,
    pub images: Vec<ImageDto>,
    pub comments: Vec<CommentDto>,
    pub related: Vec<PostSummaryDto>,
    pub share_url: String,
}

/// The post a share form refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareTargetDto {
    pub id: Uuid,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub post: ShareTargetDto,
    pub sent: bool,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub comment: Option<CommentDto>,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterResponse {
    pub subscribed: bool,
    pub errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveMonthDto {
    pub year: i32,
    pub month: u32,
    /// Date search page for the month.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SidebarResponse {
    pub latest: Vec<PostSummaryDto>,
    pub most_commented: Vec<PostSummaryDto>,
    pub popular: Vec<PostSummaryDto>,
    pub archive: Vec<ArchiveMonthDto>,
    pub categories: Vec<CategoryDto>,
    pub total_posts: u64,
}
