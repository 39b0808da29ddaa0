//! Newsletter signup.

use actix_web::{HttpResponse, web};
use blog_core::forms::NewsletterForm;
use blog_shared::ApiResponse;
use blog_shared::dto::NewsletterResponse;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /newsletter/
pub async fn subscribe(
    state: web::Data<AppState>,
    form: web::Form<NewsletterForm>,
) -> AppResult<HttpResponse> {
    let outcome = state.blog.subscribe(form.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(NewsletterResponse {
        subscribed: outcome.is_accepted(),
        errors: outcome.errors,
    })))
}
