//! SerpAPI Google Shopping response parsing.

use crate::error::SourceError;
use crate::offers::models::{FALLBACK_SOURCE, PLACEHOLDER_IMAGE};
use crate::offers::{Platform, RawListing};
use serde::Deserialize;
use tracing::{debug, warn};

/// Source id for listings that came from SerpAPI.
pub const SERP_SOURCE: &str = "serpapi";

#[derive(Debug, Deserialize)]
struct SerpResponse {
    #[serde(default)]
    shopping_results: Vec<ShoppingResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShoppingResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    price: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    product_link: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    thumbnail: Option<String>,
}

/// Parses a Google Shopping response body.
///
/// Only the first `max_results` entries are inspected; entries without a
/// title or price are skipped.
pub fn parse_shopping_results(
    body: &str,
    max_results: usize,
) -> Result<Vec<RawListing>, SourceError> {
    let response: SerpResponse = serde_json::from_str(body)?;

    if response.shopping_results.is_empty() {
        if let Some(error) = response.error {
            // SerpAPI reports "no results" through the error field
            if error.contains("hasn't returned any results") {
                debug!("No shopping results: {}", error);
                return Ok(Vec::new());
            }
            warn!("SerpAPI error: {}", error);
            return Err(SourceError::Malformed(error));
        }
    }

    let listings: Vec<RawListing> = response
        .shopping_results
        .into_iter()
        .take(max_results)
        .filter_map(|result| {
            let title = result.title.filter(|t| !t.trim().is_empty())?;
            let raw_price = result.price.filter(|p| !p.trim().is_empty())?;

            Some(RawListing {
                title,
                raw_price,
                platform_source: result.source.unwrap_or_default(),
                source: SERP_SOURCE.to_string(),
                url: result.link.or(result.product_link),
                image_url: result.thumbnail,
            })
        })
        .collect();

    debug!("Parsed {} shopping listings", listings.len());
    Ok(listings)
}

/// Fixed listings used when the shopping search fails.
pub fn fallback_listings(book_name: &str) -> Vec<RawListing> {
    vec![
        RawListing {
            title: format!("{} - Kitapyurdu", book_name),
            raw_price: "35,90 TL".to_string(),
            platform_source: "Kitapyurdu".to_string(),
            source: FALLBACK_SOURCE.to_string(),
            url: Some(Platform::Kitapyurdu.listing_url(book_name)),
            image_url: Some(PLACEHOLDER_IMAGE.to_string()),
        },
        RawListing {
            title: format!("{} - İdefix", book_name),
            raw_price: "42,50 TL".to_string(),
            platform_source: "İdefix".to_string(),
            source: FALLBACK_SOURCE.to_string(),
            url: Some(Platform::Idefix.listing_url(book_name)),
            image_url: Some(
                "https://via.placeholder.com/300x400/0066cc/ffffff?text=Kitap".to_string(),
            ),
        },
    ]
}
