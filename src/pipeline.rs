//! End-to-end book search: offers, best price, content, profit and report.

use crate::config::Config;
use crate::content::{
    AdvancedInputs, ContentGenerator, ContentSections, GeminiClient, LanguageModel,
};
use crate::error::SearchError;
use crate::offers::{Offer, SearchResultSet};
use crate::prediction::{predict_sales, SalesPrediction};
use crate::pricing::{best_offer, dedup};
use crate::profit::{ProfitBreakdown, ProfitCalculator};
use crate::report::{ReportInput, ReportWriter, XlsxReportWriter};
use crate::reviews::{RapidApiReviews, ReviewSource, ReviewSummary};
use crate::shopping::{fallback_listings, SerpClient, ShoppingSearch};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything one search produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub search_results: SearchResultSet,
    pub best_offer: Offer,
    pub gemini_analysis: ContentSections,
    pub profit: ProfitBreakdown,
    pub excel_report: Option<PathBuf>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_prediction: Option<SalesPrediction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<ReviewSummary>,
    /// True when the shopping search failed and fallback listings were used
    pub used_fallback: bool,
}

/// Shared collaborators for searches.
pub struct BookSearch {
    shopping: Arc<dyn ShoppingSearch>,
    content: ContentGenerator,
    reviews: Arc<dyn ReviewSource>,
    reports: Arc<dyn ReportWriter>,
    profit: ProfitCalculator,
}

impl BookSearch {
    pub fn new(
        shopping: Arc<dyn ShoppingSearch>,
        llm: Arc<dyn LanguageModel>,
        reviews: Arc<dyn ReviewSource>,
        reports: Arc<dyn ReportWriter>,
        profit: ProfitCalculator,
    ) -> Self {
        let content = ContentGenerator::new(llm);
        Self { shopping, content, reviews, reports, profit }
    }

    /// Production collaborators built from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Arc::new(SerpClient::new(config)?),
            Arc::new(GeminiClient::new(config)?),
            Arc::new(RapidApiReviews::new(config)?),
            Arc::new(XlsxReportWriter::new(&config.reports_dir)),
            ProfitCalculator::from_config(config),
        ))
    }

    /// Standard search: offers, content, profit and report.
    pub async fn search(&self, book_name: &str) -> Result<SearchOutcome, SearchError> {
        self.run(book_name, false).await
    }

    /// Standard search plus reviews, sales prediction and the extra content sections.
    pub async fn search_advanced(&self, book_name: &str) -> Result<SearchOutcome, SearchError> {
        self.run(book_name, true).await
    }

    /// Normalized, deduplicated offers; fallback listings if the search itself failed.
    async fn collect_offers(&self, book_name: &str) -> Result<(Vec<Offer>, bool), SearchError> {
        let (listings, used_fallback) = match self.shopping.search(book_name).await {
            Ok(listings) if listings.is_empty() => {
                return Err(SearchError::NotFound(book_name.to_string()));
            }
            Ok(listings) => (listings, false),
            Err(e) => {
                warn!("Shopping search failed, using fallback listings: {}", e);
                (fallback_listings(book_name), true)
            }
        };

        let offers = dedup(listings.into_iter().map(Offer::from_listing).collect());
        info!("{} offers for '{}'", offers.len(), book_name);
        Ok((offers, used_fallback))
    }

    async fn run(&self, book_name: &str, advanced: bool) -> Result<SearchOutcome, SearchError> {
        let book_name = book_name.trim();
        if book_name.is_empty() {
            return Err(SearchError::InvalidRequest("book_name boş olamaz".to_string()));
        }

        info!("Searching for '{}' (advanced: {})", book_name, advanced);
        let (offers, used_fallback) = self.collect_offers(book_name).await?;

        let best = match best_offer(&offers) {
            Some(offer) => offer.clone(),
            None => {
                warn!("No priced offer for '{}', using placeholder", book_name);
                Offer::placeholder(book_name)
            }
        };
        info!("Best offer: {} - {} ({})", best.title, best.price_or_zero(), best.platform);

        let competitor_prices: Vec<f64> = offers.iter().filter_map(|o| o.price).collect();
        let profit = self.profit.breakdown(best.price_or_zero(), &competitor_prices);

        let mut results = SearchResultSet::from_offers(offers);
        results.best_offer = Some(best.clone());

        let (content, prediction, reviews) = if advanced {
            let reviews = match self.reviews.fetch(&best.title).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Review lookup failed, using sample reviews: {}", e);
                    ReviewSummary::sample()
                }
            };
            let prediction = predict_sales(&best.title, best.price_or_zero(), Some(&reviews));
            let content = self
                .content
                .generate_advanced(
                    &results,
                    &best,
                    &profit,
                    AdvancedInputs { reviews: &reviews, prediction: &prediction },
                )
                .await;
            (content, Some(prediction), Some(reviews))
        } else {
            (self.content.generate(&results, &best, &profit).await, None, None)
        };

        let outcome = SearchOutcome {
            search_results: results,
            best_offer: best,
            gemini_analysis: content,
            profit,
            excel_report: None,
            message: String::new(),
            sales_prediction: prediction,
            reviews,
            used_fallback,
        };
        self.attach_report(outcome).await
    }

    /// Writes the report on a blocking thread. A write error is noted in the
    /// message; only a crashed writer fails the search.
    async fn attach_report(&self, outcome: SearchOutcome) -> Result<SearchOutcome, SearchError> {
        let reports = Arc::clone(&self.reports);
        let (mut outcome, report) = tokio::task::spawn_blocking(move || {
            let report = reports.write(&ReportInput {
                results: &outcome.search_results,
                best: &outcome.best_offer,
                content: &outcome.gemini_analysis,
                profit: &outcome.profit,
                prediction: outcome.sales_prediction.as_ref(),
                reviews: outcome.reviews.as_ref(),
            });
            (outcome, report)
        })
        .await
        .map_err(|e| SearchError::Internal(format!("rapor oluşturma görevi çöktü: {e}")))?;

        let title = &outcome.best_offer.title;
        match report {
            Ok(path) => {
                outcome.message =
                    format!("✅ {title} için detaylı analiz ve Excel raporu tamamlandı!");
                outcome.excel_report = Some(path);
            }
            Err(e) => {
                warn!("Report could not be written: {}", e);
                outcome.message = format!(
                    "✅ {title} için analiz tamamlandı, Excel raporu oluşturulamadı: {e}"
                );
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SheetError, SourceError};
    use crate::offers::{Platform, RawListing, PLACEHOLDER_PRICE, PLACEHOLDER_SOURCE};
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    struct FixedShopping(Result<Vec<RawListing>, u16>);

    #[async_trait]
    impl ShoppingSearch for FixedShopping {
        async fn search(&self, _book_name: &str) -> Result<Vec<RawListing>, SourceError> {
            self.0.clone().map_err(SourceError::Status)
        }
    }

    struct FailingModel;

    #[async_trait]
    impl LanguageModel for FailingModel {
        async fn complete(&self, _prompt: &str) -> Result<String, SourceError> {
            Err(SourceError::RateLimited(429))
        }
    }

    struct NoReviews;

    #[async_trait]
    impl ReviewSource for NoReviews {
        async fn fetch(&self, _title: &str) -> Result<ReviewSummary, SourceError> {
            Err(SourceError::MissingCredentials("RAPIDAPI_KEY"))
        }
    }

    struct BrokenReports;

    impl ReportWriter for BrokenReports {
        fn write(&self, _input: &ReportInput<'_>) -> Result<PathBuf, SheetError> {
            Err(SheetError::NoWorksheet)
        }
    }

    struct CrashingReports;

    impl ReportWriter for CrashingReports {
        fn write(&self, _input: &ReportInput<'_>) -> Result<PathBuf, SheetError> {
            panic!("workbook writer crashed");
        }
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

    fn search_with(
        shopping: Result<Vec<RawListing>, u16>,
        reports: Arc<dyn ReportWriter>,
    ) -> BookSearch {
        BookSearch::new(
            Arc::new(FixedShopping(shopping)),
            Arc::new(FailingModel),
            Arc::new(NoReviews),
            reports,
            ProfitCalculator::from_config(&Config::default()),
        )
    }

    #[tokio::test]
    async fn test_search_picks_cheapest() {
        let dir = tempfile::tempdir().unwrap();
        let search = search_with(
            Ok(vec![
                listing("Nutuk", "₺1.250,00", "D&R"),
                listing("Nutuk", "89,90 TL", "Kitapyurdu"),
                listing("Nutuk", "89,90 TL", "Kitapyurdu"),
                listing("Nutuk Ciltli", "Fiyat yok", "idefix"),
            ]),
            Arc::new(XlsxReportWriter::new(dir.path())),
        );

        let outcome = search.search("Nutuk").await.unwrap();

        assert_eq!(outcome.best_offer.price, Some(89.9));
        assert_eq!(outcome.best_offer.platform, Platform::Kitapyurdu);
        // Duplicate removed, unpriced kept
        assert_eq!(outcome.search_results.len(), 3);
        assert_eq!(outcome.search_results.best_offer.as_ref(), Some(&outcome.best_offer));
        assert!(!outcome.used_fallback);
        assert!(outcome.excel_report.as_ref().is_some_and(|p| p.exists()));
        assert!(outcome.sales_prediction.is_none());
        assert!((outcome.profit.max_competitor_price - 1250.0).abs() < 1e-9);
        // Every model call failed, so every section is the template
        assert!(outcome.gemini_analysis.analysis.contains("kitabı analiz edildi"));
    }

    #[tokio::test]
    async fn test_failed_search_uses_fallback_listings() {
        let dir = tempfile::tempdir().unwrap();
        let search = search_with(Err(500), Arc::new(XlsxReportWriter::new(dir.path())));

        let outcome = search.search("Simyacı").await.unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.best_offer.price, Some(35.9));
        assert_eq!(outcome.best_offer.platform, Platform::Kitapyurdu);
        assert_eq!(outcome.search_results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_search_is_not_found() {
        let search = search_with(Ok(vec![]), Arc::new(BrokenReports));
        let err = assert_err!(search.search("Yok Böyle Kitap").await);
        assert!(matches!(err, SearchError::NotFound(name) if name == "Yok Böyle Kitap"));
    }

    #[tokio::test]
    async fn test_blank_name_is_invalid() {
        let search = search_with(Ok(vec![]), Arc::new(BrokenReports));
        assert!(matches!(search.search("   ").await, Err(SearchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_no_priced_offer_uses_placeholder() {
        let search =
            search_with(Ok(vec![listing("Nutuk", "Tükendi", "n11")]), Arc::new(BrokenReports));

        let outcome = search.search("Nutuk").await.unwrap();

        assert_eq!(outcome.best_offer.source, PLACEHOLDER_SOURCE);
        assert_eq!(outcome.best_offer.price, Some(PLACEHOLDER_PRICE));
        assert_eq!(outcome.search_results.len(), 1);
    }

    #[tokio::test]
    async fn test_report_failure_is_not_fatal() {
        let search =
            search_with(Ok(vec![listing("Nutuk", "50 TL", "Trendyol")]), Arc::new(BrokenReports));

        let outcome = assert_ok!(search.search("Nutuk").await);

        assert!(outcome.excel_report.is_none());
        assert!(outcome.message.contains("Excel raporu oluşturulamadı"));
    }

    #[tokio::test]
    async fn test_advanced_search_degrades_reviews_to_sample() {
        let search =
            search_with(Ok(vec![listing("Nutuk", "50 TL", "Trendyol")]), Arc::new(BrokenReports));

        let outcome = search.search_advanced("Nutuk").await.unwrap();

        let reviews = outcome.reviews.unwrap();
        assert!(reviews.is_sample);
        let prediction = outcome.sales_prediction.unwrap();
        assert_eq!(prediction.source, crate::prediction::PredictionSource::TitleHeuristic);
        assert!(outcome.gemini_analysis.sentiment_analysis.is_some());
        assert!(outcome.gemini_analysis.trend_analysis.is_some());
    }

    #[tokio::test]
    async fn test_crashed_report_writer_is_internal_error() {
        let search =
            search_with(Ok(vec![listing("Nutuk", "50 TL", "Trendyol")]), Arc::new(CrashingReports));

        let err = assert_err!(search.search("Nutuk").await);
        assert!(matches!(err, SearchError::Internal(_)));
    }
}
