//! Search pages. Each route selects one filter branch.

use actix_web::{HttpRequest, HttpResponse, web};
use blog_core::search::SearchRequest;
use blog_shared::ApiResponse;
use serde::Deserialize;

use super::posts::ListingParams;
use super::views;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Loose parameters accepted by `/search/`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub tag: Option<String>,
    pub category: Option<String>,
}

impl SearchParams {
    fn into_request(self) -> SearchRequest {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        SearchRequest::from_params(
            non_empty(self.query),
            self.year.zip(self.month),
            non_empty(self.tag),
            non_empty(self.category),
        )
    }
}

async fn run(
    state: &AppState,
    req: &HttpRequest,
    request: SearchRequest,
    params: ListingParams,
) -> AppResult<HttpResponse> {
    let locale = views::locale(req, state);
    let results = state
        .blog
        .search(
            request,
            params.order_by.as_deref(),
            params.page.as_deref(),
            &locale,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(views::search(results, params.order_by))))
}

/// GET /search/
pub async fn search(
    state: web::Data<AppState>,
    req: HttpRequest,
    filter: web::Query<SearchParams>,
    params: web::Query<ListingParams>,
) -> AppResult<HttpResponse> {
    run(&state, &req, filter.into_inner().into_request(), params.into_inner()).await
}

/// GET /search/{query}/
pub async fn by_text(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Path<String>,
    params: web::Query<ListingParams>,
) -> AppResult<HttpResponse> {
    let request = SearchRequest::Text {
        query: query.into_inner(),
    };
    run(&state, &req, request, params.into_inner()).await
}

/// GET /search/category/{category}/
pub async fn by_category(
    state: web::Data<AppState>,
    req: HttpRequest,
    name: web::Path<String>,
    params: web::Query<ListingParams>,
) -> AppResult<HttpResponse> {
    let request = SearchRequest::Category {
        name: name.into_inner(),
    };
    run(&state, &req, request, params.into_inner()).await
}

/// GET /search/tag/{tag_slug}/
pub async fn by_tag(
    state: web::Data<AppState>,
    req: HttpRequest,
    slug: web::Path<String>,
    params: web::Query<ListingParams>,
) -> AppResult<HttpResponse> {
    let request = SearchRequest::Tag {
        slug: slug.into_inner(),
    };
    run(&state, &req, request, params.into_inner()).await
}

/// GET /search/date/{year}/{month}/
pub async fn by_date(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i32, u32)>,
    params: web::Query<ListingParams>,
) -> AppResult<HttpResponse> {
    let (year, month) = path.into_inner();
    run(&state, &req, SearchRequest::Date { year, month }, params.into_inner()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_query_falls_through_to_tag() {
        let params = SearchParams {
            query: Some("  ".to_string()),
            tag: Some("cane".to_string()),
            ..SearchParams::default()
        };
        assert_eq!(
            params.into_request(),
            SearchRequest::Tag {
                slug: "cane".to_string()
            }
        );
    }

    #[test]
    fn test_date_needs_year_and_month() {
        let params = SearchParams {
            year: Some(2023),
            ..SearchParams::default()
        };
        assert_eq!(params.into_request(), SearchRequest::None);
    }
}
