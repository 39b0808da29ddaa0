//! HTTP handlers and route configuration.

mod feed;
mod health;
mod newsletter;
mod posts;
mod search;
mod share;
mod sidebar;
mod views;


use actix_web::web;

use crate::middleware::error::extractor_errors;

const POST_PATH: &str = r"/{year:\d+}/{month:\d+}/{day:\d+}/{slug}";

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    extractor_errors(cfg);

    cfg.route("/", web::get().to(posts::index))
        .service(
            web::scope("/search")
                .route("/", web::get().to(search::search))
                .route("/category/{category}/", web::get().to(search::by_category))
                .route("/tag/{tag_slug}/", web::get().to(search::by_tag))
                .route("/date/{year}/{month}/", web::get().to(search::by_date))
                .route("/{query}/", web::get().to(search::by_text)),
        )
        .route("/feed/", web::get().to(feed::feed))
        .route("/sidebar/", web::get().to(sidebar::sidebar))
        .route("/newsletter/", web::post().to(newsletter::subscribe))
        .route("/api/health", web::get().to(health::health_check))
        .route(&format!("{POST_PATH}/"), web::get().to(posts::detail))
        .route(
            &format!("{POST_PATH}/comment/"),
            web::post().to(posts::add_comment),
        )
        .service(
            web::resource("/{post_id}/share/")
                .route(web::get().to(share::share_form))
                .route(web::post().to(share::share_post)),
        );
}
