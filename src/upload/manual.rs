//! Last rung of the ladder: point the seller at the staged file and panel.

use super::{ProductListing, StagedRow, StepResult, UploadOutcome, UploadStrategy};
use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Returns an informational outcome with the staging path and a marketplace link.
pub struct ManualHandoff {
    client: Client,
    storefront_url: String,
    panel_url: String,
    staging_path: PathBuf,
    open_browser: bool,
}

impl ManualHandoff {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            storefront_url: config.marketplace_storefront_url.clone(),
            panel_url: config.marketplace_panel_url.clone(),
            staging_path: config.staging_path.clone(),
            open_browser: config.open_browser,
        })
    }

    /// Storefront search link for `title`, if the storefront answers.
    pub async fn storefront_link(&self, title: &str) -> Option<String> {
        let query = title.split_whitespace().collect::<Vec<_>>().join("+");
        let url = format!("{}/sr?q={}", self.storefront_url, query);
        debug!("GET {}", url);

        match self
            .client
            .get(&url)
            .emulation(Emulation::Chrome131)
            .header("Accept-Language", "tr-TR,tr;q=0.9")
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => Some(url),
            Ok(response) => {
                debug!("Storefront lookup returned {}", response.status());
                None
            }
            Err(e) => {
                debug!("Storefront lookup failed: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl UploadStrategy for ManualHandoff {
    fn name(&self) -> &'static str {
        "manual"
    }

    async fn attempt(&self, listing: &ProductListing, staged: &StagedRow) -> StepResult {
        if self.open_browser {
            match webbrowser::open(&self.panel_url) {
                Ok(()) => info!("Opened seller panel: {}", self.panel_url),
                Err(e) => warn!("Could not open browser: {}", e),
            }
        }

        let link =
            self.storefront_link(&listing.title).await.unwrap_or_else(|| self.panel_url.clone());

        StepResult::Done(UploadOutcome::info(
            format!(
                "Excel dosyası hazır: {}. Satıcı paneline gidip son satırı (barkod {}) yükleyin. Link: {}",
                self.staging_path.display(),
                staged.barcode,
                link
            ),
            self.name(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::UploadStatus;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn listing() -> ProductListing {
        ProductListing {
            title: "Suç ve Ceza".to_string(),
            description: String::new(),
            price: 100.0,
            market_price: None,
            image_url: None,
            author: None,
        }
    }

    fn staged() -> StagedRow {
        StagedRow { barcode: "mfsucvecez2025".into(), stock: 10, shipping_days: 2, year: 2025 }
    }

    fn make_test_config(storefront: String) -> Config {
        Config {
            marketplace_storefront_url: storefront,
            open_browser: false,
            staging_path: PathBuf::from("reports/urunler.xlsx"),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_handoff_links_storefront_search() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/sr"))
            .and(query_param("q", "Suç ve Ceza"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let handoff = ManualHandoff::new(&make_test_config(mock_server.uri())).unwrap();
        let StepResult::Done(outcome) = handoff.attempt(&listing(), &staged()).await else {
            panic!("manual hand-off is always terminal");
        };

        assert_eq!(outcome.status, UploadStatus::Info);
        assert!(outcome.message.contains("reports/urunler.xlsx"));
        assert!(outcome.message.contains("mfsucvecez2025"));
        assert!(outcome.message.contains("/sr?q=Suç+ve+Ceza"));
    }

    #[tokio::test]
    async fn test_handoff_falls_back_to_panel() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let handoff = ManualHandoff::new(&make_test_config(mock_server.uri())).unwrap();
        let StepResult::Done(outcome) = handoff.attempt(&listing(), &staged()).await else {
            panic!("manual hand-off is always terminal");
        };
        assert!(outcome.message.ends_with("https://partner.trendyol.com/product-management"));
    }
}
