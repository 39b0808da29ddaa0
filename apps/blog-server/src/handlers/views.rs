//! Mapping from service views to response DTOs.

use actix_web::HttpRequest;
use blog_core::domain::{ArchiveMonth, CategoryRef, Comment, PostImage, PostSummary, Tag};
use blog_core::i18n::Locale;
use blog_core::pagination::{Page, PageWindow};
use blog_core::service::{
    AuthorView, FeedItem, IndexListing, PostView, SearchResults, SharedPost, Sidebar,
};
use blog_shared::dto::{
    ArchiveMonthDto, AuthorDto, CategoryDto, CommentDto, ImageDto, IndexResponse, PageDto,
    PaginationMeta, PostDetailResponse, PostSummaryDto, SearchResponse, ShareTargetDto,
    SidebarResponse, TagDto,
};
use blog_shared::feed::{FeedDocument, FeedItemDto};

use crate::state::AppState;

/// Locale negotiated from the `Accept-Language` header.
pub fn locale(req: &HttpRequest, state: &AppState) -> Locale {
    let header = req
        .headers()
        .get(actix_web::http::header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    state.blog.locale(header)
}

/// Scheme and host the request arrived on.
pub fn base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

pub fn share_path(post_id: uuid::Uuid) -> String {
    format!("/{post_id}/share/")
}

fn tag(tag: &Tag) -> TagDto {
    TagDto {
        name: tag.name.clone(),
        slug: tag.slug.clone(),
        url: format!("/search/tag/{}/", urlencoding::encode(&tag.slug)),
    }
}

fn category(category: &CategoryRef) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name: category.name.clone(),
        slug: category.slug.clone(),
        color: category.color.clone(),
        url: format!("/search/category/{}/", urlencoding::encode(&category.name)),
    }
}

fn archive_month(month: &ArchiveMonth) -> ArchiveMonthDto {
    ArchiveMonthDto {
        year: month.year,
        month: month.month,
        url: format!("/search/date/{}/{}/", month.year, month.month),
    }
}

pub fn comment(comment: &Comment) -> CommentDto {
    CommentDto {
        id: comment.id,
        name: comment.name.clone(),
        body: comment.body.clone(),
        created: comment.created_at,
    }
}

fn image(image: &PostImage) -> ImageDto {
    ImageDto {
        name: image.name.clone(),
        path: image.image.clone(),
        source_or_author: image.source_or_author.clone(),
    }
}

fn author(author: AuthorView) -> AuthorDto {
    AuthorDto {
        username: author.username,
        bio: author.bio,
        credentials: author.credentials,
    }
}

pub fn summary(post: &PostSummary) -> PostSummaryDto {
    PostSummaryDto {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        url: post.absolute_path(),
        publish: post.publish,
        author: post.author.clone(),
        category: post.category.as_ref().map(category),
        tags: post.tags.iter().map(tag).collect(),
        visits: post.visits,
        comment_count: post.comment_count,
        similarity: post.similarity,
    }
}

fn summaries(posts: &[PostSummary]) -> Vec<PostSummaryDto> {
    posts.iter().map(summary).collect()
}

pub fn pagination(window: &PageWindow) -> PaginationMeta {
    PaginationMeta {
        number: window.number,
        num_pages: window.num_pages,
        count: window.count,
        page_size: window.page_size,
        has_next: window.has_next(),
        has_previous: window.has_previous(),
        next_page_number: window.next_page_number(),
        previous_page_number: window.previous_page_number(),
        start_index: window.start_index(),
        end_index: window.end_index(),
    }
}

fn page(page: Page<PostSummary>) -> PageDto<PostSummaryDto> {
    PageDto {
        pagination: pagination(&page.window),
        items: summaries(&page.items),
    }
}

pub fn search(results: SearchResults, order_by: Option<String>) -> SearchResponse {
    SearchResponse {
        kind: results.request.kind().to_string(),
        placeholder: results.placeholder,
        order_by,
        results: page(results.page),
    }
}

pub fn index(listing: IndexListing) -> IndexResponse {
    IndexResponse {
        headline: summaries(&listing.headline),
        posts: page(listing.page),
    }
}

pub fn detail(view: PostView) -> PostDetailResponse {
    let PostView {
        post,
        translation,
        body_html,
        author: author_view,
        category: category_ref,
        images,
        comments,
        related,
    } = view;

    PostDetailResponse {
        id: post.id,
        url: post.absolute_path(&translation.slug),
        share_url: share_path(post.id),
        edited: post.has_been_updated(),
        language: translation.language,
        title: translation.title,
        slug: translation.slug,
        body: translation.body,
        body_html,
        publish: post.publish,
        created: post.created_at,
        updated: post.updated_at,
        visits: post.visits,
        author: author(author_view),
        category: category_ref.as_ref().map(category),
        tags: post.tags.iter().map(tag).collect(),
        images: images.iter().map(image).collect(),
        comments: comments.iter().map(comment).collect(),
        related: summaries(&related),
    }
}

pub fn share_target(post: SharedPost) -> ShareTargetDto {
    ShareTargetDto {
        id: post.id,
        title: post.title,
        url: post.path,
    }
}

pub fn sidebar(sidebar: Sidebar) -> SidebarResponse {
    SidebarResponse {
        latest: summaries(&sidebar.latest),
        most_commented: summaries(&sidebar.most_commented),
        popular: summaries(&sidebar.popular),
        archive: sidebar.archive.iter().map(archive_month).collect(),
        categories: sidebar.categories.iter().map(category).collect(),
        total_posts: sidebar.total_posts,
    }
}

/// JSON Feed document with absolute links under `base_url`.
pub fn feed(items: Vec<FeedItem>, title: &str, base_url: &str, locale: &Locale) -> FeedDocument {
    let base_url = base_url.trim_end_matches('/');
    let mut document = FeedDocument::new(title, format!("{base_url}/"));
    document.language = Some(locale.language.clone());
    document.items = items
        .into_iter()
        .map(|item| {
            let url = format!("{base_url}{}", item.path);
            FeedItemDto {
                id: url.clone(),
                url,
                title: item.title,
                content_html: item.content_html,
                summary: item.summary,
                date_published: item.publish,
                date_modified: item.updated,
                tags: item.tags.into_iter().map(|t| t.name).collect(),
            }
        })
        .collect();
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_url_encodes_name() {
        let reeds = CategoryRef {
            id: uuid::Uuid::new_v4(),
            name: "Double Reeds / Cañas?".to_string(),
            slug: "double-reeds-canas".to_string(),
            color: "1a2b3c".to_string(),
        };

        assert_eq!(
            category(&reeds).url,
            "/search/category/Double%20Reeds%20%2F%20Ca%C3%B1as%3F/"
        );
    }
}
