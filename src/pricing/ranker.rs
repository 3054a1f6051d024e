//! Best-offer selection and ordering.

use crate::offers::Offer;
use std::cmp::Ordering;
use tracing::debug;

/// Returns the cheapest priced offer.
///
/// Offers without a positive price are never chosen. Among equal minimum
/// prices the first one in input order wins. `None` means no offer was
/// eligible; callers substitute [`Offer::placeholder`].
pub fn best_offer(offers: &[Offer]) -> Option<&Offer> {
    let mut best: Option<(&Offer, f64)> = None;

    for offer in offers {
        let Some(price) = offer.price.filter(|p| *p > 0.0) else {
            continue;
        };
        match best {
            Some((_, current)) if price >= current => {}
            _ => best = Some((offer, price)),
        }
    }

    if best.is_none() && !offers.is_empty() {
        debug!("None of {} offers carried a usable price", offers.len());
    }

    best.map(|(offer, _)| offer)
}

/// Orders offers by ascending price, unpriced offers last.
///
/// The sort is stable, so equal prices keep their input order.
pub fn rank(offers: &[Offer]) -> Vec<&Offer> {
    let mut ranked: Vec<&Offer> = offers.iter().collect();
    ranked.sort_by(|a, b| compare_prices(a, b));
    ranked
}

/// Drops offers repeating an earlier (platform, title, price) combination.
pub fn dedup(offers: Vec<Offer>) -> Vec<Offer> {
    let mut kept: Vec<Offer> = Vec::with_capacity(offers.len());

    for offer in offers {
        let duplicate = kept.iter().any(|k| {
            k.platform == offer.platform && k.title == offer.title && k.price == offer.price
        });
        if duplicate {
            debug!("Dropping duplicate offer: {} ({})", offer.title, offer.platform);
        } else {
            kept.push(offer);
        }
    }

    kept
}

fn compare_prices(a: &Offer, b: &Offer) -> Ordering {
    match (a.is_priced(), b.is_priced()) {
        (true, true) => a.price_or_zero().total_cmp(&b.price_or_zero()),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offers::Platform;

    fn offer(title: &str, price: Option<f64>) -> Offer {
        Offer {
            title: title.to_string(),
            raw_price: price.map(|p| p.to_string()).unwrap_or_default(),
            price,
            platform: Platform::Kitapyurdu,
            url: None,
            image_url: None,
            source: "serpapi".to_string(),
        }
    }

    #[test]
    fn test_best_offer_picks_minimum() {
        let offers = vec![offer("a", Some(0.0)), offer("b", Some(45.0)), offer("c", Some(30.0))];
        let best = best_offer(&offers).unwrap();
        assert_eq!(best.title, "c");
        assert_eq!(best.price, Some(30.0));
    }

    #[test]
    fn test_best_offer_never_picks_zero() {
        let offers = vec![offer("zero", Some(0.0)), offer("none", None), offer("real", Some(99.0))];
        assert_eq!(best_offer(&offers).unwrap().title, "real");
    }

    #[test]
    fn test_best_offer_tie_breaks_on_input_order() {
        let offers = vec![offer("first", Some(20.0)), offer("second", Some(20.0))];
        assert_eq!(best_offer(&offers).unwrap().title, "first");
    }

    #[test]
    fn test_best_offer_all_zero_is_none() {
        let offers = vec![offer("a", Some(0.0)), offer("b", None)];
        assert!(best_offer(&offers).is_none());
    }

    #[test]
    fn test_best_offer_empty_is_none() {
        assert!(best_offer(&[]).is_none());
    }

    #[test]
    fn test_best_offer_is_pure() {
        let offers = vec![offer("x", Some(12.0)), offer("y", Some(11.0))];
        let before = offers.clone();
        let _ = best_offer(&offers);
        assert_eq!(offers, before);
    }

    #[test]
    fn test_rank_orders_ascending_unpriced_last() {
        let offers = vec![
            offer("none", None),
            offer("mid", Some(50.0)),
            offer("low", Some(10.0)),
            offer("zero", Some(0.0)),
            offer("high", Some(90.0)),
        ];
        let titles: Vec<&str> = rank(&offers).iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["low", "mid", "high", "none", "zero"]);
    }

    #[test]
    fn test_rank_is_stable() {
        let offers = vec![offer("a", Some(10.0)), offer("b", Some(10.0)), offer("c", Some(5.0))];
        let titles: Vec<&str> = rank(&offers).iter().map(|o| o.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_dedup_removes_repeats() {
        let mut other_platform = offer("a", Some(10.0));
        other_platform.platform = Platform::Idefix;

        let offers = vec![
            offer("a", Some(10.0)),
            offer("a", Some(10.0)),
            offer("a", Some(11.0)),
            other_platform,
        ];
        let kept = dedup(offers);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].price, Some(10.0));
        assert_eq!(kept[1].price, Some(11.0));
        assert_eq!(kept[2].platform, Platform::Idefix);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut first = offer("a", Some(10.0));
        first.url = Some("https://first".to_string());
        let mut second = offer("a", Some(10.0));
        second.url = Some("https://second".to_string());

        let kept = dedup(vec![first, second]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url.as_deref(), Some("https://first"));
    }
}
