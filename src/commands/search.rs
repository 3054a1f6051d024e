//! Search command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::pipeline::BookSearch;
use anyhow::{Context, Result};
use tracing::info;

/// Executes a book search.
pub struct SearchCommand {
    config: Config,
}

impl SearchCommand {
    /// Creates a new search command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Executes the search and returns formatted output.
    pub async fn execute(&self, book_name: &str, advanced: bool) -> Result<String> {
        let search =
            BookSearch::from_config(&self.config).context("Failed to create HTTP clients")?;

        self.execute_with(&search, book_name, advanced).await
    }

    /// Executes the search with provided collaborators (for testing).
    pub async fn execute_with(
        &self,
        search: &BookSearch,
        book_name: &str,
        advanced: bool,
    ) -> Result<String> {
        let outcome = if advanced {
            search.search_advanced(book_name).await?
        } else {
            search.search(book_name).await?
        };

        info!("Found {} offers for '{}'", outcome.search_results.len(), book_name);

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_outcome(&outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::content::LanguageModel;
    use crate::error::{SheetError, SourceError};
    use crate::offers::RawListing;
    use crate::profit::ProfitCalculator;
    use crate::report::{ReportInput, ReportWriter, XlsxReportWriter};
    use crate::reviews::{ReviewSource, ReviewSummary};
    use crate::shopping::ShoppingSearch;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Mock shopping search for testing.
    struct MockShopping {
        listings: Vec<RawListing>,
        call_count: Arc<AtomicU32>,
    }

    #[async_trait]
    impl ShoppingSearch for MockShopping {
        async fn search(&self, _book_name: &str) -> Result<Vec<RawListing>, SourceError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(self.listings.clone())
        }
    }

    struct Offline;

    #[async_trait]
    impl LanguageModel for Offline {
        async fn complete(&self, _prompt: &str) -> Result<String, SourceError> {
            Err(SourceError::MissingCredentials("GEMINI_API_KEY"))
        }
    }

    #[async_trait]
    impl ReviewSource for Offline {
        async fn fetch(&self, _title: &str) -> Result<ReviewSummary, SourceError> {
            Err(SourceError::MissingCredentials("RAPIDAPI_KEY"))
        }
    }

    impl ReportWriter for Offline {
        fn write(&self, _input: &ReportInput<'_>) -> Result<PathBuf, SheetError> {
            Err(SheetError::NoWorksheet)
        }
    }

    fn make_test_config(format: OutputFormat) -> Config {
        Config { format, ..Config::default() }
    }

    fn listing(title: &str, price: &str, platform: &str) -> RawListing {
        RawListing {
            title: title.to_string(),
            raw_price: price.to_string(),
            platform_source: platform.to_string(),
            source: "serpapi".to_string(),
            url: None,
            image_url: None,
        }
    }

    fn make_search(
        listings: Vec<RawListing>,
        reports: Arc<dyn ReportWriter>,
    ) -> (BookSearch, Arc<AtomicU32>) {
        let call_count = Arc::new(AtomicU32::new(0));
        let search = BookSearch::new(
            Arc::new(MockShopping { listings, call_count: call_count.clone() }),
            Arc::new(Offline),
            Arc::new(Offline),
            reports,
            ProfitCalculator::from_config(&Config::default()),
        );
        (search, call_count)
    }

    #[tokio::test]
    async fn test_search_command_basic() {
        let (search, calls) = make_search(
            vec![
                listing("Simyacı", "₺65,00", "idefix"),
                listing("Simyacı", "59,90 TL", "Kitapyurdu.com"),
            ],
            Arc::new(Offline),
        );
        let cmd = SearchCommand::new(make_test_config(OutputFormat::Table));

        let output = cmd.execute_with(&search, "Simyacı", false).await.unwrap();

        assert!(output.contains("Best:     Simyacı"));
        assert!(output.contains("59.90 TL"));
        assert!(output.contains("Total: 2 offers"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_search_command_not_found() {
        let (search, _) = make_search(vec![], Arc::new(Offline));
        let cmd = SearchCommand::new(make_test_config(OutputFormat::Table));

        let err = cmd.execute_with(&search, "Yok", false).await.unwrap_err();
        assert!(err.to_string().contains("Kitap bulunamadı"));
    }

    #[tokio::test]
    async fn test_search_command_json_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let (search, _) = make_search(
            vec![listing("Simyacı", "59,90 TL", "Kitapyurdu")],
            Arc::new(XlsxReportWriter::new(dir.path())),
        );
        let cmd = SearchCommand::new(make_test_config(OutputFormat::Json));

        let output = cmd.execute_with(&search, "Simyacı", true).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        let report = json["excel_report"].as_str().unwrap();
        assert!(report.contains("gelismis_kitap_analizi_Simyacı_"));
        assert!(json["sales_prediction"].is_object());
    }
}
