//! Request handlers.

use super::AppState;
use crate::error::SearchError;
use crate::pipeline::SearchOutcome;
use crate::upload::ProductListing;
use actix_web::{get, post, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub book_name: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    success: bool,
    #[serde(flatten)]
    outcome: SearchOutcome,
}

impl From<SearchOutcome> for SearchResponse {
    fn from(outcome: SearchOutcome) -> Self {
        Self { success: true, outcome }
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[post("/search-book")]
async fn search_book(
    state: web::Data<AppState>,
    body: web::Json<SearchRequest>,
) -> Result<HttpResponse, SearchError> {
    let outcome = state.search.search(&body.book_name).await?;
    Ok(HttpResponse::Ok().json(SearchResponse::from(outcome)))
}

#[post("/search-book-advanced")]
async fn search_book_advanced(
    state: web::Data<AppState>,
    body: web::Json<SearchRequest>,
) -> Result<HttpResponse, SearchError> {
    let outcome = state.search.search_advanced(&body.book_name).await?;
    Ok(HttpResponse::Ok().json(SearchResponse::from(outcome)))
}

#[post("/upload-listing")]
async fn upload_listing(
    state: web::Data<AppState>,
    body: web::Json<ProductListing>,
) -> impl Responder {
    info!("Upload requested for '{}'", body.title);
    HttpResponse::Ok().json(state.uploader.publish(&body).await)
}
