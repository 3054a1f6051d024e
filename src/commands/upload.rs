//! Upload command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::upload::{ProductListing, UploadStatus, Uploader};
use anyhow::{Context, Result};
use tracing::info;

/// Stages a listing and walks the upload ladder.
pub struct UploadCommand {
    config: Config,
}

impl UploadCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Publishes `listing` and returns formatted output with whether it succeeded.
    pub async fn execute(&self, listing: &ProductListing) -> Result<(String, bool)> {
        let uploader =
            Uploader::from_config(&self.config).context("Failed to create upload strategies")?;
        Ok(self.execute_with(&uploader, listing).await)
    }

    /// Publishes with a provided uploader (for testing).
    pub async fn execute_with(
        &self,
        uploader: &Uploader,
        listing: &ProductListing,
    ) -> (String, bool) {
        info!("Publishing '{}' via {}", listing.title, uploader.strategies().join(" -> "));

        let outcome = uploader.publish(listing).await;
        let ok = outcome.status != UploadStatus::Error;
        (Formatter::new(self.config.format).format_upload(&outcome), ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::{StagedRow, StagingSheet, StepResult, UploadStrategy};
    use async_trait::async_trait;

    struct Refusing;

    #[async_trait]
    impl UploadStrategy for Refusing {
        fn name(&self) -> &'static str {
            "api"
        }

        async fn attempt(&self, _listing: &ProductListing, _staged: &StagedRow) -> StepResult {
            StepResult::Escalate("refused".to_string())
        }
    }

    fn listing() -> ProductListing {
        ProductListing {
            title: "Sefiller".to_string(),
            description: String::new(),
            price: 120.0,
            market_price: Some(150.0),
            image_url: None,
            author: Some("Victor Hugo".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upload_command_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingSheet::new(dir.path().join("s.xlsx"));
        let uploader = Uploader::new(staging, vec![Box::new(Refusing)]);
        let cmd = UploadCommand::new(Config::default());

        let (output, ok) = cmd.execute_with(&uploader, &listing()).await;

        assert!(!ok);
        assert!(output.starts_with("[ERROR]"));
        assert!(output.contains("api: refused"));
        // Row is staged even though every strategy refused
        assert!(dir.path().join("s.xlsx").exists());
    }
}
