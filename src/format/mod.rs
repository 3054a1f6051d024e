//! Output formatting for search outcomes and offers (table, JSON, markdown, CSV).

use crate::config::OutputFormat;
use crate::offers::{Offer, Platform};
use crate::pipeline::SearchOutcome;
use crate::pricing::rank;
use crate::upload::UploadOutcome;

/// Formats CLI output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full search outcome: best offer, ranked offers, profit and report.
    pub fn format_outcome(&self, outcome: &SearchOutcome) -> String {
        let offers: Vec<Offer> = outcome.search_results.all_offers().cloned().collect();
        let ranked: Vec<Offer> = rank(&offers).into_iter().cloned().collect();

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
            }
            OutputFormat::Table => self.table_outcome(outcome, &ranked),
            OutputFormat::Markdown => self.markdown_outcome(outcome, &ranked),
            OutputFormat::Csv => self.csv_offers(&ranked, Some(&outcome.best_offer)),
        }
    }

    /// Formats offers in the given order.
    pub fn format_offers(&self, offers: &[Offer]) -> String {
        if offers.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No offers found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(offers).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Table => self.table_offers(offers, None),
            OutputFormat::Markdown => self.markdown_offers(offers, None),
            OutputFormat::Csv => self.csv_offers(offers, None),
        }
    }

    /// Formats one normalized price string.
    pub fn format_price(&self, raw: &str, amount: f64) -> String {
        match self.format {
            OutputFormat::Json => serde_json::json!({ "raw": raw, "amount": amount }).to_string(),
            OutputFormat::Csv => format!("raw,amount\n{},{}", Self::csv_escape(raw), amount),
            OutputFormat::Markdown => format!("`{}` → **{:.2} TL**", raw, amount),
            OutputFormat::Table => format!("{:.2}", amount),
        }
    }

    /// Formats the known storefronts.
    pub fn format_platforms(&self) -> String {
        let platforms = Platform::all();
        match self.format {
            OutputFormat::Json => {
                let list: Vec<_> = platforms
                    .iter()
                    .map(|p| serde_json::json!({ "name": p.display_name(), "domain": p.domain() }))
                    .collect();
                serde_json::to_string_pretty(&list).unwrap_or_else(|_| "[]".to_string())
            }
            OutputFormat::Csv => {
                let mut lines = vec!["name,domain".to_string()];
                lines.extend(
                    platforms.iter().map(|p| format!("{},{}", p.display_name(), p.domain())),
                );
                lines.join("\n")
            }
            OutputFormat::Markdown => {
                let mut lines =
                    vec!["| Platform | Domain |".to_string(), "|----------|--------|".to_string()];
                lines.extend(
                    platforms.iter().map(|p| format!("| {} | {} |", p.display_name(), p.domain())),
                );
                lines.join("\n")
            }
            OutputFormat::Table => platforms
                .iter()
                .map(|p| format!("{:<12} {}", p.display_name(), p.domain()))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    /// Formats an upload outcome.
    pub fn format_upload(&self, outcome: &UploadOutcome) -> String {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
            }
            _ => {
                let status = serde_json::to_value(outcome.status)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_uppercase))
                    .unwrap_or_default();
                match &outcome.strategy {
                    Some(strategy) => format!("[{}] ({}) {}", status, strategy, outcome.message),
                    None => format!("[{}] {}", status, outcome.message),
                }
            }
        }
    }

    // Table formatting

    fn table_outcome(&self, outcome: &SearchOutcome, ranked: &[Offer]) -> String {
        let best = &outcome.best_offer;
        let profit = &outcome.profit;
        let mut lines = Vec::new();

        lines.push(format!("Best:     {}", best.title));
        lines.push(format!("Price:    {}", Self::price_text(best)));
        lines.push(format!("Platform: {}", best.platform));
        if let Some(url) = &best.url {
            lines.push(format!("URL:      {}", url));
        }
        if outcome.used_fallback {
            lines.push("Note:     shopping search failed, showing fallback offers".to_string());
        }
        lines.push(String::new());

        lines.push(self.table_offers(ranked, Some(best)));
        lines.push(String::new());

        lines.push(format!(
            "Resale:   {:.2} TL (cost {:.2}, commission {:.2}, net profit {:.2})",
            profit.suggested_price, profit.total_cost, profit.commission_amount, profit.net_profit
        ));
        lines.push(format!(
            "Market:   min {:.2} / avg {:.2} / max {:.2} TL{}",
            profit.min_competitor_price,
            profit.avg_competitor_price,
            profit.max_competitor_price,
            if profit.can_compete { "" } else { " (not competitive)" }
        ));

        if let Some(prediction) = &outcome.sales_prediction {
            lines.push(format!(
                "Forecast: {} sales/month, {:.2} TL revenue, {} (confidence {:.0}%)",
                prediction.predicted_monthly_sales,
                prediction.monthly_revenue,
                prediction.trend_status,
                prediction.confidence * 100.0
            ));
        }
        if let Some(reviews) = &outcome.reviews {
            lines.push(format!(
                "Reviews:  {} reviews, average {:.2}{}",
                reviews.total,
                reviews.average_rating,
                if reviews.is_sample { " (sample)" } else { "" }
            ));
        }

        match &outcome.excel_report {
            Some(path) => lines.push(format!("Report:   {}", path.display())),
            None => lines.push("Report:   not written".to_string()),
        }
        lines.push(String::new());
        lines.push(outcome.message.clone());

        lines.join("\n")
    }

    fn table_offers(&self, offers: &[Offer], best: Option<&Offer>) -> String {
        let price_width = 12;
        let platform_width = 12;
        let title_width = 50;

        let mut lines = Vec::new();

        // Header
        lines.push(format!(
            "   {:>price_width$}  {:<platform_width$}  {}",
            "Price", "Platform", "Title"
        ));
        lines.push(format!(
            "   {:-<price_width$}  {:-<platform_width$}  {:-<title_width$}",
            "", "", ""
        ));

        // Rows
        for offer in offers {
            let marker = if best == Some(offer) { " * " } else { "   " };
            lines.push(format!(
                "{}{:>price_width$}  {:<platform_width$}  {}",
                marker,
                Self::price_text(offer),
                offer.platform.to_string(),
                Self::truncate(&offer.title, title_width)
            ));
        }

        lines.push(String::new());
        lines.push(format!("Total: {} offers", offers.len()));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_outcome(&self, outcome: &SearchOutcome, ranked: &[Offer]) -> String {
        let best = &outcome.best_offer;
        let profit = &outcome.profit;
        let mut lines = Vec::new();

        lines.push(format!("## {}", best.title));
        lines.push(String::new());
        lines.push(format!("- **Price:** {}", Self::price_text(best)));
        lines.push(format!("- **Platform:** {}", best.platform));
        if let Some(url) = &best.url {
            lines.push(format!("- **URL:** [{}]({})", best.platform, url));
        }
        lines.push(format!(
            "- **Suggested resale price:** {:.2} TL (net profit {:.2} TL)",
            profit.suggested_price, profit.net_profit
        ));
        if let Some(prediction) = &outcome.sales_prediction {
            lines.push(format!(
                "- **Forecast:** {} sales/month ({})",
                prediction.predicted_monthly_sales, prediction.trend_status
            ));
        }
        if let Some(path) = &outcome.excel_report {
            lines.push(format!("- **Report:** `{}`", path.display()));
        }
        lines.push(String::new());

        lines.push(self.markdown_offers(ranked, Some(best)));
        lines.push(String::new());

        lines.push("### Analiz".to_string());
        lines.push(String::new());
        lines.push(outcome.gemini_analysis.analysis.clone());

        lines.join("\n")
    }

    fn markdown_offers(&self, offers: &[Offer], best: Option<&Offer>) -> String {
        let mut lines = Vec::new();

        lines.push("| Price | Platform | Title |".to_string());
        lines.push("|-------|----------|-------|".to_string());

        for offer in offers {
            let price = if best == Some(offer) {
                format!("**{}**", Self::price_text(offer))
            } else {
                Self::price_text(offer)
            };
            let title = Self::truncate(&offer.title, 40);
            let title = match &offer.url {
                Some(url) => format!("[{}]({})", title, url),
                None => title,
            };
            lines.push(format!("| {} | {} | {} |", price, offer.platform, title));
        }

        lines.push(String::new());
        lines.push(format!("*{} offers found*", offers.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "title,raw_price,price,platform,source,best,url".to_string()
    }

    fn csv_offers(&self, offers: &[Offer], best: Option<&Offer>) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for offer in offers {
            lines.push(format!(
                "{},{},{},{},{},{},{}",
                Self::csv_escape(&offer.title),
                Self::csv_escape(&offer.raw_price),
                offer.price.map(|p| p.to_string()).unwrap_or_default(),
                Self::csv_escape(offer.platform.display_name()),
                offer.source,
                best == Some(offer),
                offer.url.as_deref().unwrap_or("")
            ));
        }

        lines.join("\n")
    }

    fn price_text(offer: &Offer) -> String {
        match offer.price {
            Some(price) => format!("{:.2} TL", price),
            None => "N/A".to_string(),
        }
    }

    fn truncate(text: &str, width: usize) -> String {
        if text.chars().count() > width {
            format!("{}...", text.chars().take(width - 3).collect::<String>())
        } else {
            text.to_string()
        }
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
