//! Sidebar widgets.

use actix_web::{HttpRequest, HttpResponse, web};
use blog_shared::ApiResponse;

use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /sidebar/
pub async fn sidebar(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let locale = views::locale(&req, &state);
    let sidebar = state.blog.sidebar(&locale).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::sidebar(sidebar))))
}
