//! Naive sales prediction from title keywords or review signals.

use crate::reviews::ReviewSummary;
use serde::{Deserialize, Serialize};

/// Monthly decay applied to the six-month projection.
pub const PROJECTION_FACTORS: [f64; 6] = [1.0, 0.9, 0.8, 0.7, 0.6, 0.5];

const POPULAR_KEYWORDS: &[&str] = &[
    "bestseller", "çok satan", "popüler", "klasik", "önerilen", "roman", "hikaye", "macera",
    "fantastik", "bilim kurgu", "çocuk", "genç", "eğitim", "tarih", "felsefe",
];

const FAMOUS_TITLES: &[&str] = &[
    "harry potter", "lotr", "yüzüklerin efendisi", "hobbit", "game of thrones",
    "taht oyunları", "suç ve ceza", "anna karenina", "savaş ve barış", "don kişot",
];

const NICHE_KEYWORDS: &[&str] = &[
    "akademik", "tez", "araştırma", "özel", "teknik", "ders", "sınav", "test", "çalışma", "ödev",
];

const CLASSIC_AUTHORS: &[&str] = &["dostoyevski", "tolstoy", "gorki", "çehov", "puşkin"];

/// Where the popularity score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    TitleHeuristic,
    Reviews,
}

/// Sales projected for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjection {
    pub label: String,
    pub sales: u32,
    pub revenue: f64,
}

/// Predicted monthly sales for a book at a given price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPrediction {
    pub predicted_monthly_sales: u32,
    pub confidence: f64,
    pub monthly_revenue: f64,
    pub popularity_score: f64,
    pub trend_status: String,
    pub trend_direction: String,
    pub search_volume: u32,
    pub daily_average: u32,
    pub source: PredictionSource,
    pub projection: Vec<MonthlyProjection>,
}

/// Predicts sales for `title` sold at `price`.
///
/// Fetched (non-sample) reviews take precedence over title keywords.
pub fn predict_sales(title: &str, price: f64, reviews: Option<&ReviewSummary>) -> SalesPrediction {
    let (predicted, popularity, confidence, source) = match reviews.filter(|r| !r.is_sample) {
        Some(summary) => {
            let popularity = popularity_from_reviews(summary);
            let from_ratings = summary.rating_count.and_then(sales_from_rating_count);
            let (predicted, confidence) = match from_ratings {
                Some(base) => (base * 6 / 5, (popularity + 0.3).min(0.8)),
                None => ((50.0 * popularity) as u32, popularity),
            };
            (predicted, popularity, confidence, PredictionSource::Reviews)
        }
        None => {
            let popularity = popularity_from_title(title);
            let predicted = sales_from_popularity(title, popularity);
            (predicted, popularity, (popularity + 0.2).min(0.9), PredictionSource::TitleHeuristic)
        }
    };

    let projection = PROJECTION_FACTORS
        .iter()
        .enumerate()
        .map(|(i, factor)| {
            let sales = (predicted as f64 * factor) as u32;
            let label = format!("{}. Ay", i + 1);
            MonthlyProjection { label, sales, revenue: sales as f64 * price }
        })
        .collect();

    SalesPrediction {
        predicted_monthly_sales: predicted,
        confidence,
        monthly_revenue: predicted as f64 * price,
        popularity_score: popularity,
        trend_status: trend_status(popularity).to_string(),
        trend_direction: if popularity > 0.6 { "increasing" } else { "stable" }.to_string(),
        search_volume: (1000.0 * popularity * 10.0) as u32,
        daily_average: predicted / 30,
        source,
        projection,
    }
}

/// Popularity in `[0.1, 1.0]` guessed from title keywords and length.
pub fn popularity_from_title(title: &str) -> f64 {
    let lower = title.to_lowercase();
    let mut score = 0.5;

    if FAMOUS_TITLES.iter().any(|k| lower.contains(k)) {
        score += 0.3;
    }

    score += 0.1 * POPULAR_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as f64;
    score -= 0.1 * NICHE_KEYWORDS.iter().filter(|k| lower.contains(*k)).count() as f64;

    let length = title.chars().count();
    if length < 20 {
        score += 0.05;
    } else if length > 50 {
        score -= 0.05;
    }

    if CLASSIC_AUTHORS.iter().any(|a| lower.contains(a)) {
        score += 0.2;
    }

    score.clamp(0.1, 1.0)
}

/// Popularity in `[0.1, 1.0]` from rating volume, average rating and review count.
pub fn popularity_from_reviews(summary: &ReviewSummary) -> f64 {
    let rating_count = summary.rating_count.unwrap_or(summary.total as u64) as f64;

    let score = (rating_count / 100.0).min(1.0) * 0.4
        + (summary.average_rating / 5.0) * 0.3
        + (summary.total as f64 / 50.0).min(1.0) * 0.2;

    score.clamp(0.1, 1.0)
}

/// Rough monthly sales implied by a product's total rating count.
pub fn sales_from_rating_count(rating_count: u64) -> Option<u32> {
    match rating_count {
        n if n > 1000 => Some(500),
        n if n > 500 => Some(300),
        n if n > 100 => Some(150),
        _ => None,
    }
}

/// Monthly sales from popularity, adjusted by genre and popularity tier. Never below 10.
pub fn sales_from_popularity(title: &str, popularity: f64) -> u32 {
    let lower = title.to_lowercase();
    let has_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let mut sales = (50.0 * popularity).trunc();

    if has_any(&["roman", "hikaye", "macera"]) {
        sales *= 1.5;
    } else if has_any(&["eğitim", "ders", "sınav"]) {
        sales *= 0.7;
    } else if has_any(&["çocuk", "genç"]) {
        sales *= 1.3;
    } else if has_any(&["klasik", "felsefe"]) {
        sales *= 0.8;
    }

    if popularity > 0.8 {
        sales *= 2.0;
    } else if popularity > 0.6 {
        sales *= 1.5;
    } else if popularity < 0.3 {
        sales *= 0.5;
    }

    (sales as u32).max(10)
}

/// Turkish popularity label.
pub fn trend_status(popularity: f64) -> &'static str {
    if popularity > 0.8 {
        "Çok Popüler"
    } else if popularity > 0.6 {
        "Popüler"
    } else if popularity > 0.4 {
        "Orta Popülerlik"
    } else if popularity > 0.2 {
        "Az Popüler"
    } else {
        "Nadir"
    }
}
