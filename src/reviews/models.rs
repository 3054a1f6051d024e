//! Review records and rating aggregation.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

/// One customer review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Star rating 0-5, 0 when missing
    pub rating: f64,
    pub title: String,
    pub comment: String,
    pub author: String,
    /// Date text as reported by the source
    pub date: String,
    pub year: Option<i32>,
    pub verified: bool,
}

impl Review {
    /// Parses a star rating like `"4"`, `"4.5"` or `"4,5"`; `0.0` if unreadable.
    pub fn parse_rating(text: &str) -> f64 {
        text.trim()
            .replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
            .map(|r| r.clamp(0.0, 5.0))
            .unwrap_or(0.0)
    }

    /// Extracts the last four-digit year from date text such as
    /// "Reviewed in the United States on March 3, 2023".
    pub fn parse_year(date: &str) -> Option<i32> {
        YEAR.find_iter(date).last().and_then(|m| m.as_str().parse().ok())
    }
}

/// Reviews collected for a book, with overall and per-year averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub reviews: Vec<Review>,
    /// Mean of the positive ratings, rounded to two decimals
    pub average_rating: f64,
    /// Year -> mean rating of that year's reviews
    pub yearly_ratings: BTreeMap<i32, f64>,
    pub total: usize,
    /// Total ratings the product page reports, when known
    pub rating_count: Option<u64>,
    /// True if this is the built-in sample set rather than fetched data
    pub is_sample: bool,
}

impl ReviewSummary {
    /// Aggregates fetched reviews.
    pub fn from_reviews(reviews: Vec<Review>, rating_count: Option<u64>) -> Self {
        let rated: Vec<f64> = reviews.iter().map(|r| r.rating).filter(|r| *r > 0.0).collect();
        let average =
            if rated.is_empty() { 0.0 } else { rated.iter().sum::<f64>() / rated.len() as f64 };

        let mut by_year: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for review in &reviews {
            if let Some(year) = review.year {
                let entry = by_year.entry(year).or_insert((0.0, 0));
                entry.0 += review.rating;
                entry.1 += 1;
            }
        }
        let yearly_ratings =
            by_year.into_iter().map(|(year, (sum, count))| (year, sum / count as f64)).collect();

        Self {
            total: reviews.len(),
            reviews,
            average_rating: (average * 100.0).round() / 100.0,
            yearly_ratings,
            rating_count,
            is_sample: false,
        }
    }

    /// Built-in sample reviews used when no source is reachable.
    pub fn sample() -> Self {
        let samples = [
            (
                "2024-01-15",
                5.0,
                "Harika bir kitap! Çok beğendim, kesinlikle tavsiye ederim.",
                "Ahmet Y.",
                "Mükemmel",
            ),
            (
                "2024-01-10",
                4.0,
                "Güzel kitap, okumaya değer. Biraz uzun ama güzel.",
                "Ayşe K.",
                "Güzel",
            ),
            (
                "2023-12-20",
                3.0,
                "Orta halli bir kitap. Beklediğim kadar iyi değildi.",
                "Mehmet S.",
                "Orta",
            ),
            (
                "2023-12-15",
                5.0,
                "Muhteşem! Çok etkileyici bir hikaye. Herkese öneririm.",
                "Fatma A.",
                "Muhteşem",
            ),
            (
                "2023-11-30",
                4.0,
                "İyi bir kitap. Yazarın diğer kitaplarından daha iyi.",
                "Ali V.",
                "İyi",
            ),
            ("2023-11-15", 2.0, "Pek beğenmedim. Çok sıkıcı ve uzun.", "Zeynep M.", "Sıkıcı"),
            (
                "2023-10-25",
                5.0,
                "Harika! Çok güzel bir kitap. Tekrar okuyacağım.",
                "Can D.",
                "Harika",
            ),
            ("2023-10-10", 4.0, "Güzel bir kitap. Tavsiye ederim.", "Elif K.", "Güzel"),
            ("2023-09-20", 3.0, "Fena değil ama daha iyi olabilirdi.", "Burak T.", "Fena değil"),
            ("2023-09-05", 5.0, "Mükemmel bir kitap! Çok beğendim.", "Selin Y.", "Mükemmel"),
        ];

        let reviews = samples
            .iter()
            .map(|(date, rating, comment, author, title)| Review {
                rating: *rating,
                title: title.to_string(),
                comment: comment.to_string(),
                author: author.to_string(),
                date: date.to_string(),
                year: Review::parse_year(date),
                verified: false,
            })
            .collect();

        Self { is_sample: true, ..Self::from_reviews(reviews, None) }
    }

    /// Share of reviews rated 4 stars or more, in percent.
    pub fn positive_share(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let positive = self.reviews.iter().filter(|r| r.rating >= 4.0).count();
        positive as f64 / self.reviews.len() as f64 * 100.0
    }
}
