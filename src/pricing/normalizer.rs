//! Price string normalization.
//!
//! Shopping results arrive with Turkish (`1.850,00 TL`), US (`₺1,850.00`) or
//! mixed formatting. Everything is reduced to a plain decimal amount, with `0.0`
//! meaning "could not parse".

use regex_lite::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Currency markers stripped before parsing.
const CURRENCY_MARKERS: [&str; 2] = ["₺", "TL"];

/// Below this amount a marked price is checked for a dropped thousands separator.
const SUSPICIOUS_BELOW: f64 = 100.0;

/// How much larger the grouped reading must be before it replaces the parsed one.
const CORRECTION_FACTOR: f64 = 10.0;

mod patterns {
    use super::*;

    /// Tried in order; the first pattern that matches anywhere wins.
    pub static AMOUNTS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
        [
            Regex::new(r"\d+\.\d{2}").unwrap(),
            Regex::new(r"\d+\.\d").unwrap(),
            Regex::new(r"\d+").unwrap(),
        ]
    });

    /// Digits joined by at least one separator, e.g. `1.234.567` or `35,90`.
    pub static GROUPED: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\d+(?:[.,]\d+)+").unwrap());
}

/// Parses a raw price string into a canonical amount.
///
/// Returns `0.0` when no digits are found. Never panics, never returns a
/// negative or non-finite value.
pub fn normalize_price(raw: &str) -> f64 {
    let marked = has_currency_marker(raw);

    let mut cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    for marker in CURRENCY_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }

    let canonical = resolve_separators(&cleaned);

    let Some(amount) = first_amount(&canonical) else {
        debug!("No digits in price text: {:?}", raw);
        return 0.0;
    };

    if amount < SUSPICIOUS_BELOW && marked {
        if let Some(grouped) = grouped_amount(raw) {
            if grouped >= amount * CORRECTION_FACTOR && grouped > 0.0 {
                debug!("Correcting truncated price {} -> {} for {:?}", amount, grouped, raw);
                return grouped;
            }
        }
    }

    amount
}

/// True if the text carries a Turkish lira marker.
pub fn has_currency_marker(raw: &str) -> bool {
    CURRENCY_MARKERS.iter().any(|marker| raw.contains(marker))
}

/// Rewrites `.`/`,` so that at most the decimal separator remains, as `.`.
fn resolve_separators(text: &str) -> String {
    let first_dot = text.find('.');
    let first_comma = text.find(',');

    match (first_dot, first_comma) {
        // Both present: whichever shows up later is the decimal point
        (Some(dot), Some(comma)) => {
            if comma > dot {
                text.replace('.', "").replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        (None, Some(_)) => {
            let parts: Vec<&str> = text.split(',').collect();
            if parts.len() == 2 && parts[1].chars().count() <= 2 {
                text.replace(',', ".")
            } else {
                text.replace(',', "")
            }
        }
        _ => text.to_string(),
    }
}

/// Runs the amount patterns in priority order.
fn first_amount(text: &str) -> Option<f64> {
    patterns::AMOUNTS
        .iter()
        .find_map(|re| re.find(text))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}

/// Reads the longest separator-joined digit run of the original text with
/// thousands grouping in mind.
///
/// A trailing group of exactly three digits marks every separator as a
/// thousands separator (`1.200` -> 1200). Otherwise the last separator is the
/// decimal point (`1.234,5` -> 1234.5).
fn grouped_amount(raw: &str) -> Option<f64> {
    let run = patterns::GROUPED
        .find_iter(raw)
        .map(|m| m.as_str())
        .max_by_key(|s| s.len())?;

    let groups: Vec<&str> = run.split(['.', ',']).collect();
    let last = groups.last()?;

    let value = if groups.len() >= 2 && last.len() == 3 {
        groups.concat()
    } else {
        let (whole, fraction) = groups.split_at(groups.len() - 1);
        format!("{}.{}", whole.concat(), fraction.concat())
    };

    value.parse::<f64>().ok().filter(|v| v.is_finite())
}
