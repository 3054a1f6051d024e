//! RapidAPI (Real-Time Amazon Data) review client.

use super::models::{Review, ReviewSummary};
use crate::config::Config;
use crate::error::SourceError;
use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

const RAPIDAPI_HOST: &str = "real-time-amazon-data.p.rapidapi.com";

/// Trait for review lookups - enables mocking for tests.
#[async_trait]
pub trait ReviewSource: Send + Sync {
    /// Collects reviews for a book title.
    async fn fetch(&self, title: &str) -> Result<ReviewSummary, SourceError>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    products: Vec<SearchProduct>,
}

#[derive(Debug, Deserialize)]
struct SearchProduct {
    asin: Option<String>,
    #[serde(default)]
    product_title: Option<String>,
    #[serde(default)]
    product_num_ratings: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ReviewPage {
    #[serde(default)]
    reviews: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(default)]
    review_star_rating: Option<serde_json::Value>,
    #[serde(default)]
    review_title: Option<String>,
    #[serde(default)]
    review_comment: Option<String>,
    #[serde(default)]
    review_author: Option<String>,
    #[serde(default)]
    review_date: Option<String>,
    #[serde(default)]
    is_verified_purchase: bool,
}

impl From<RawReview> for Review {
    fn from(raw: RawReview) -> Self {
        let rating = match raw.review_star_rating {
            Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0).clamp(0.0, 5.0),
            Some(serde_json::Value::String(s)) => Review::parse_rating(&s),
            _ => 0.0,
        };
        let date = raw.review_date.unwrap_or_default();

        Review {
            rating,
            title: raw.review_title.unwrap_or_default(),
            comment: raw.review_comment.unwrap_or_default(),
            author: raw.review_author.unwrap_or_else(|| "Anonim".to_string()),
            year: Review::parse_year(&date),
            date,
            verified: raw.is_verified_purchase,
        }
    }
}

/// Amazon review lookup through RapidAPI.
pub struct RapidApiReviews {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    limit: usize,
    max_pages: u32,
}

impl RapidApiReviews {
    /// Creates a new review client from configuration.
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
            api_key: config.rapidapi_key.clone(),
            base_url: base_url.unwrap_or_else(|| config.reviews_base_url.clone()),
            limit: config.review_limit,
            max_pages: config.review_max_pages,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        api_key: &str,
    ) -> Result<T, SourceError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header("x-rapidapi-host", RAPIDAPI_HOST)
            .header("x-rapidapi-key", api_key)
            .send()
            .await?;

        let status = response.status();
        if status == 429 || status == 503 {
            return Err(SourceError::RateLimited(status.as_u16()));
        }
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Finds the ASIN and rating count of the first search hit.
    async fn find_product(
        &self,
        title: &str,
        api_key: &str,
    ) -> Result<(String, Option<u64>), SourceError> {
        let query = format!("{} book", title);
        let url = format!(
            "{}/search?query={}&country=US&page=1",
            self.base_url,
            urlencoding::encode(&query)
        );

        let envelope: Envelope<SearchData> = self.get_json(&url, api_key).await?;
        let product = envelope
            .data
            .and_then(|d| d.products.into_iter().find(|p| p.asin.is_some()))
            .ok_or(SourceError::Empty)?;

        let asin = product.asin.ok_or(SourceError::Empty)?;
        info!("Found product {} ({})", product.product_title.as_deref().unwrap_or(""), asin);
        Ok((asin, product.product_num_ratings))
    }
}

#[async_trait]
impl ReviewSource for RapidApiReviews {
    async fn fetch(&self, title: &str) -> Result<ReviewSummary, SourceError> {
        let api_key =
            self.api_key.as_deref().ok_or(SourceError::MissingCredentials("RAPIDAPI_KEY"))?;

        let (asin, rating_count) = self.find_product(title, api_key).await?;

        let mut reviews: Vec<Review> = Vec::new();
        let mut page = 1;

        while reviews.len() < self.limit && page <= self.max_pages {
            let url = format!(
                "{}/product-reviews?asin={}&country=US&page={}&sort_by=TOP_REVIEWS&star_rating=ALL",
                self.base_url, asin, page
            );

            let envelope: Envelope<ReviewPage> = match self.get_json(&url, api_key).await {
                Ok(envelope) => envelope,
                Err(e) if reviews.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Review page {} failed, keeping {} reviews: {}", page, reviews.len(), e);
                    break;
                }
            };

            let batch = envelope.data.map(|d| d.reviews).unwrap_or_default();
            if batch.is_empty() {
                debug!("No reviews on page {}, stopping", page);
                break;
            }

            debug!("Page {} returned {} reviews", page, batch.len());
            reviews.extend(batch.into_iter().map(Review::from));
            page += 1;
        }

        reviews.truncate(self.limit);

        if reviews.is_empty() {
            return Err(SourceError::Empty);
        }

        info!("Collected {} reviews for {}", reviews.len(), asin);
        Ok(ReviewSummary::from_reviews(reviews, rating_count))
    }
}
