//! Syndication feed.

use actix_web::{HttpRequest, HttpResponse, web};
use blog_shared::feed::JSON_FEED_CONTENT_TYPE;

use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /feed/
pub async fn feed(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let locale = views::locale(&req, &state);
    let items = state.blog.feed(&locale).await?;
    let document = views::feed(items, &state.site_title, &views::base_url(&req), &locale);

    Ok(HttpResponse::Ok()
        .content_type(JSON_FEED_CONTENT_TYPE)
        .json(document))
}
