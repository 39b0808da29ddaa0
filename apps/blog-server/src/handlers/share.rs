//! Share a post by email.

use actix_web::{HttpRequest, HttpResponse, web};
use blog_core::forms::ShareForm;
use blog_shared::ApiResponse;
use blog_shared::dto::ShareResponse;
use uuid::Uuid;

use super::views;
use crate::middleware::error::AppResult;
use crate::observability::RequestId;
use crate::state::AppState;

/// GET /{post_id}/share/
pub async fn share_form(
    state: web::Data<AppState>,
    req: HttpRequest,
    post_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let locale = views::locale(&req, &state);
    let post = state.blog.share_target(post_id.into_inner(), &locale).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::share_target(post))))
}

/// POST /{post_id}/share/
pub async fn share_post(
    state: web::Data<AppState>,
    req: HttpRequest,
    request_id: RequestId,
    post_id: web::Path<Uuid>,
    form: web::Form<ShareForm>,
) -> AppResult<HttpResponse> {
    let locale = views::locale(&req, &state);
    let base_url = views::base_url(&req);
    let post_id = post_id.into_inner();

    tracing::debug!(request_id = %request_id, post_id = %post_id, "Share requested");

    let outcome = state
        .blog
        .share_post(post_id, form.into_inner(), &base_url, &locale)
        .await?;

    let body = ShareResponse {
        post: views::share_target(outcome.post),
        sent: outcome.sent,
        errors: outcome.errors,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}
