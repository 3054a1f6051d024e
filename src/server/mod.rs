//! HTTP surface: book search, advanced search and listing upload.

pub mod routes;

use crate::config::Config;
use crate::pipeline::BookSearch;
use crate::upload::Uploader;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use tracing::info;

/// Collaborators shared by every request.
pub struct AppState {
    pub search: BookSearch,
    pub uploader: Uploader,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            search: BookSearch::from_config(config)?,
            uploader: Uploader::from_config(config)?,
        })
    }
}

/// Registers all routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::health)
        .service(routes::search_book)
        .service(routes::search_book_advanced)
        .service(routes::upload_listing);
}

/// Builds the shared state once and serves until shutdown.
pub async fn run(config: &Config) -> Result<()> {
    let state = web::Data::new(AppState::from_config(config)?);
    let addr = (config.bind_address.as_str(), config.port);

    info!("Listening on {}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        App::new().wrap(Logger::default()).app_data(state.clone()).configure(configure)
    })
    .bind(addr)
    .with_context(|| format!("Failed to bind {}:{}", addr.0, addr.1))?
    .run()
    .await
    .context("HTTP server failed")
}
