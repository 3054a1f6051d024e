//! Direct product creation through the supplier API.

use super::{ProductListing, StagedRow, StepResult, UploadOutcome, UploadStrategy};
use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Endpoint paths tried in order, relative to `{base}/suppliers/{id}`.
pub const ENDPOINTS: [&str; 3] = ["products", "product", "products/create"];

/// Tries each endpoint with each auth header variant until one is accepted.
pub struct ApiUpload {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    supplier_id: Option<String>,
}

impl ApiUpload {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config, None)
    }

    /// Creates a new strategy with an optional custom base URL (for testing).
    pub fn with_base_url(config: &Config, base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| config.marketplace_api_base.clone()),
            api_key: config.marketplace_api_key.clone(),
            supplier_id: config.marketplace_supplier_id.clone(),
        })
    }

    /// Header sets tried in order: Bearer, Basic, API key header, Basic plus supplier header.
    pub fn auth_variants(api_key: &str, supplier_id: &str) -> Vec<Vec<(&'static str, String)>> {
        let basic = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(format!("{supplier_id}:{api_key}"))
        );
        vec![
            vec![("Authorization", format!("Bearer {api_key}"))],
            vec![("Authorization", basic.clone())],
            vec![("X-API-Key", api_key.to_string())],
            vec![("Authorization", basic), ("X-Supplier-Id", supplier_id.to_string())],
        ]
    }

    fn payload(listing: &ProductListing, staged: &StagedRow) -> serde_json::Value {
        json!({
            "barcode": staged.barcode,
            "title": listing.title,
            "productMainId": staged.barcode,
            "brandId": 1,
            "categoryId": super::staging::CATEGORY_ID,
            "quantity": staged.stock,
            "stockCode": "",
            "dimensionalWeight": 1,
            "description": listing.description,
            "listPrice": listing.price,
            "salePrice": listing.price,
            "vatRate": 0,
            "cargoCompanyId": 1,
            "images": [{ "url": listing.image_url.as_deref().unwrap_or("") }],
            "attributes": [{ "attributeId": 1, "attributeValueId": 1 }]
        })
    }
}

#[async_trait]
impl UploadStrategy for ApiUpload {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn attempt(&self, listing: &ProductListing, staged: &StagedRow) -> StepResult {
        let (Some(api_key), Some(supplier_id)) =
            (self.api_key.as_deref(), self.supplier_id.as_deref())
        else {
            return StepResult::Escalate("API credentials are not configured".to_string());
        };

        let body = Self::payload(listing, staged).to_string();
        let variants = Self::auth_variants(api_key, supplier_id);

        for endpoint in ENDPOINTS {
            let url = format!("{}/suppliers/{}/{}", self.base_url, supplier_id, endpoint);

            for (i, headers) in variants.iter().enumerate() {
                let mut request = self
                    .client
                    .post(&url)
                    .header("Content-Type", "application/json")
                    .header("Accept", "application/json")
                    .header("Accept-Language", "tr-TR,tr;q=0.9,en;q=0.8")
                    .header("User-Agent", USER_AGENT)
                    .body(body.clone());
                for (name, value) in headers {
                    request = request.header(*name, value.as_str());
                }

                let response = match request.send().await {
                    Ok(response) => response,
                    Err(e) => {
                        debug!("POST {} (auth #{}) failed: {}", url, i + 1, e);
                        continue;
                    }
                };

                let status = response.status();
                debug!("POST {} (auth #{}) -> {}", url, i + 1, status);

                match status.as_u16() {
                    200 | 201 => {
                        info!("Product {} accepted by {}", staged.barcode, url);
                        let verb = if status == 201 { "oluşturuldu" } else { "yüklendi" };
                        return StepResult::Done(UploadOutcome::success(
                            format!("Ürün API'ye başarıyla {verb}. Endpoint: {url}"),
                            self.name(),
                        ));
                    }
                    401 | 403 => continue,
                    code => {
                        let text = response.text().await.unwrap_or_default();
                        let snippet: String = text.chars().take(200).collect();
                        warn!("Marketplace API rejected product: {} {}", code, snippet);
                        return StepResult::Done(UploadOutcome::warning(
                            format!("API hatası: {code} - {snippet}"),
                            self.name(),
                        ));
                    }
                }
            }
        }

        StepResult::Escalate("every endpoint and auth method was refused".to_string())
    }
}
