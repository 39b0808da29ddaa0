//! Index listing, post detail and comments.

use actix_web::{HttpRequest, HttpResponse, web};
use blog_core::forms::CommentForm;
use blog_shared::ApiResponse;
use blog_shared::dto::CommentResponse;
use serde::Deserialize;

use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// `order_by` and `page` query parameters. Both are free text.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub order_by: Option<String>,
    pub page: Option<String>,
}

/// `/{year}/{month}/{day}/{slug}/`
#[derive(Debug, Deserialize)]
pub struct PostPath {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub slug: String,
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<ListingParams>,
) -> AppResult<HttpResponse> {
    let locale = views::locale(&req, &state);
    let listing = state
        .blog
        .index(params.order_by.as_deref(), params.page.as_deref(), &locale)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::index(listing))))
}

/// GET /{year}/{month}/{day}/{slug}/
pub async fn detail(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<PostPath>,
) -> AppResult<HttpResponse> {
    let locale = views::locale(&req, &state);
    let view = state
        .blog
        .post_detail(path.year, path.month, path.day, &path.slug, &locale)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::detail(view))))
}

/// POST /{year}/{month}/{day}/{slug}/comment/
///
/// 201 with the comment when accepted, 200 with field errors otherwise.
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<PostPath>,
    form: web::Form<CommentForm>,
) -> AppResult<HttpResponse> {
    let outcome = state
        .blog
        .add_comment(path.year, path.month, path.day, &path.slug, form.into_inner())
        .await?;

    let accepted = outcome.is_accepted();
    let body = CommentResponse {
        comment: outcome.value.as_ref().map(views::comment),
        errors: outcome.errors,
    };

    if accepted {
        Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(body, "Comment added")))
    } else {
        Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
    }
}
