//! Section-by-section content generation with per-section fallback.

use super::client::LanguageModel;
use super::prompts::{self, fallback};
use crate::offers::{Offer, SearchResultSet};
use crate::prediction::SalesPrediction;
use crate::profit::ProfitBreakdown;
use crate::reviews::ReviewSummary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Generated marketing and analysis text for the best offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSections {
    pub analysis: String,
    pub seo_content: String,
    pub sales_recommendation: String,
    pub best_offer_summary: String,
    pub profit_analysis: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_analysis: Option<String>,
}

/// Extra inputs for advanced-mode sections.
pub struct AdvancedInputs<'a> {
    pub reviews: &'a ReviewSummary,
    pub prediction: &'a SalesPrediction,
}

/// Builds prompts, calls the model once per section and substitutes template text on failure.
#[derive(Clone)]
pub struct ContentGenerator {
    llm: Arc<dyn LanguageModel>,
}

impl ContentGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    async fn section(
        &self,
        name: &str,
        prompt: String,
        fallback: impl FnOnce() -> String,
    ) -> String {
        match self.llm.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!("Content section '{}' failed, using template: {}", name, e);
                fallback()
            }
        }
    }

    /// Generates the five standard sections. Never fails.
    pub async fn generate(
        &self,
        results: &SearchResultSet,
        best: &Offer,
        profit: &ProfitBreakdown,
    ) -> ContentSections {
        let analysis = self
            .section("analysis", prompts::analysis(results, best), || fallback::analysis(best))
            .await;
        let seo_content = self.section("seo", prompts::seo(best), || fallback::seo(best)).await;
        let sales_recommendation =
            self.section("sales", prompts::sales(best), || fallback::sales(best)).await;
        let best_offer_summary =
            self.section("summary", prompts::summary(best), || fallback::summary(best)).await;
        let profit_analysis = self
            .section("profit", prompts::profit(results, best, profit), || {
                fallback::profit(best, profit)
            })
            .await;

        ContentSections {
            analysis,
            seo_content,
            sales_recommendation,
            best_offer_summary,
            profit_analysis,
            sentiment_analysis: None,
            trend_analysis: None,
        }
    }

    /// Standard sections plus review sentiment and sales-trend commentary.
    pub async fn generate_advanced(
        &self,
        results: &SearchResultSet,
        best: &Offer,
        profit: &ProfitBreakdown,
        extra: AdvancedInputs<'_>,
    ) -> ContentSections {
        let mut sections = self.generate(results, best, profit).await;

        let sentiment = self
            .section("sentiment", prompts::sentiment(best, extra.reviews), || {
                fallback::sentiment(extra.reviews)
            })
            .await;
        let trend = self
            .section("trend", prompts::trend(best, extra.prediction), || {
                fallback::trend(extra.prediction)
            })
            .await;

        sections.sentiment_analysis = Some(sentiment);
        sections.trend_analysis = Some(trend);
        sections
    }
}
