//! SerpAPI Google Shopping client.

use super::parser::parse_shopping_results;
use crate::config::Config;
use crate::error::SourceError;
use crate::offers::RawListing;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Trait for shopping searches - enables mocking for tests.
#[async_trait]
pub trait ShoppingSearch: Send + Sync {
    /// Searches for offers of a book by free-text name.
    async fn search(&self, book_name: &str) -> Result<Vec<RawListing>, SourceError>;
}

/// Google Shopping search through SerpAPI, restricted to Turkey.
pub struct SerpClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    max_results: usize,
}

impl SerpClient {
    /// Creates a new SerpAPI client from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a new client with an optional custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            api_key: config.serp_api_key.clone(),
            base_url: base_url.unwrap_or_else(|| config.serp_base_url.clone()),
            max_results: config.max_results,
        })
    }
}

#[async_trait]
impl ShoppingSearch for SerpClient {
    async fn search(&self, book_name: &str) -> Result<Vec<RawListing>, SourceError> {
        let api_key =
            self.api_key.as_deref().ok_or(SourceError::MissingCredentials("SERP_API_KEY"))?;

        let query = format!("{} kitap", book_name);
        let url = format!(
            "{}/search.json?engine=google_shopping&q={}&gl=tr&hl=tr&num=10&api_key={}",
            self.base_url,
            urlencoding::encode(&query),
            urlencoding::encode(api_key)
        );

        info!("Searching Google Shopping: {}", query);

        let response = self.client.get(&url).header("Accept", "application/json").send().await?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 || status == 503 {
            warn!("SerpAPI rate limited ({})", status);
            return Err(SourceError::RateLimited(status.as_u16()));
        }

        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        parse_shopping_results(&body, self.max_results)
    }
}
