//! Offer and search result models.

use crate::offers::platforms::Platform;
use crate::pricing::normalize_price;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price used for the synthetic offer when nothing else is eligible.
pub const PLACEHOLDER_PRICE: f64 = 35.90;

/// Cover image used for fallback listings.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x400/8B4513/ffffff?text=Kitap";

/// Source id for offers built from the fallback list.
pub const FALLBACK_SOURCE: &str = "fallback";

/// Source id for the synthetic offer used when nothing is eligible.
pub const PLACEHOLDER_SOURCE: &str = "placeholder";

/// One listing exactly as a shopping source returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub title: String,
    pub raw_price: String,
    /// Storefront identifier as reported by the source (e.g. "Kitapyurdu.com")
    pub platform_source: String,
    /// Collaborator that produced the listing (e.g. "serpapi")
    pub source: String,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

/// One observed offer for a searched book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Listing title
    pub title: String,
    /// Price text as returned by the source
    pub raw_price: String,
    /// Parsed amount in TL, `None` if the text could not be parsed
    pub price: Option<f64>,
    /// Storefront
    pub platform: Platform,
    /// Listing URL (synthesized from the platform template if missing)
    pub url: Option<String>,
    /// Cover image URL
    pub image_url: Option<String>,
    /// Collaborator the offer came from
    pub source: String,
}

impl Offer {
    /// Builds an offer from a raw listing, normalizing its price.
    pub fn from_listing(listing: RawListing) -> Self {
        let parsed = normalize_price(&listing.raw_price);
        let platform = Platform::from_source(&listing.platform_source);

        let url = listing
            .url
            .filter(|u| !u.trim().is_empty())
            .or_else(|| Some(platform.listing_url(&listing.title)));

        Self {
            title: listing.title,
            raw_price: listing.raw_price,
            price: (parsed > 0.0).then_some(parsed),
            platform,
            url,
            image_url: listing.image_url.filter(|u| !u.trim().is_empty()),
            source: listing.source,
        }
    }

    /// Synthetic Kitapyurdu offer used when no real offer is eligible.
    pub fn placeholder(book_name: &str) -> Self {
        Self {
            title: format!("{} - Kitapyurdu", book_name),
            raw_price: "35,90 TL".to_string(),
            price: Some(PLACEHOLDER_PRICE),
            platform: Platform::Kitapyurdu,
            url: Some(Platform::Kitapyurdu.listing_url(book_name)),
            image_url: Some(PLACEHOLDER_IMAGE.to_string()),
            source: PLACEHOLDER_SOURCE.to_string(),
        }
    }

    /// True if the offer has a usable (positive) price.
    pub fn is_priced(&self) -> bool {
        self.price.is_some_and(|p| p > 0.0)
    }

    /// Price for arithmetic, `0.0` when unknown.
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

/// All offers of one search, grouped by source, plus the selected best offer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResultSet {
    /// Source id -> offers in the order the source returned them
    pub offers: BTreeMap<String, Vec<Offer>>,
    pub best_offer: Option<Offer>,
}

impl SearchResultSet {
    /// Groups offers by their source, keeping input order within each source.
    pub fn from_offers(offers: Vec<Offer>) -> Self {
        let mut grouped: BTreeMap<String, Vec<Offer>> = BTreeMap::new();
        for offer in offers {
            grouped.entry(offer.source.clone()).or_default().push(offer);
        }
        Self { offers: grouped, best_offer: None }
    }

    /// Iterates over every offer across sources.
    pub fn all_offers(&self) -> impl Iterator<Item = &Offer> {
        self.offers.values().flatten()
    }

    /// Total number of offers.
    pub fn len(&self) -> usize {
        self.offers.values().map(Vec::len).sum()
    }

    /// True if no source returned any offer.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_from_listing_parses_price() {
        let offer = Offer::from_listing(listing("Nutuk", "1.850,00 TL", "Kitapyurdu.com"));
        assert_eq!(offer.price, Some(1850.0));
        assert_eq!(offer.raw_price, "1.850,00 TL");
        assert_eq!(offer.platform, Platform::Kitapyurdu);
        assert!(offer.is_priced());
    }

    #[test]
    fn test_from_listing_unparsed_price_is_none() {
        let offer = Offer::from_listing(listing("Nutuk", "Tükendi", "Kitapyurdu"));
        assert_eq!(offer.price, None);
        assert!(!offer.is_priced());
        assert_eq!(offer.price_or_zero(), 0.0);
    }

    #[test]
    fn test_from_listing_synthesizes_url() {
        let offer = Offer::from_listing(listing("Kürk Mantolu Madonna", "45 TL", "idefix"));
        assert_eq!(offer.url.as_deref(), Some("https://www.idefix.com/kitap/kürk-mantolu-madonna"));
    }

    #[test]
    fn test_from_listing_keeps_source_url() {
        let mut raw = listing("Nutuk", "45 TL", "Trendyol");
        raw.url = Some("https://www.trendyol.com/nutuk-p-1".to_string());
        let offer = Offer::from_listing(raw);
        assert_eq!(offer.url.as_deref(), Some("https://www.trendyol.com/nutuk-p-1"));
    }

    #[test]
    fn test_from_listing_blank_url_is_replaced() {
        let mut raw = listing("Nutuk", "45 TL", "n11");
        raw.url = Some("  ".to_string());
        raw.image_url = Some(String::new());
        let offer = Offer::from_listing(raw);
        assert_eq!(offer.url.as_deref(), Some("https://www.n11.com/arama?q=nutuk"));
        assert!(offer.image_url.is_none());
    }

    #[test]
    fn test_placeholder() {
        let offer = Offer::placeholder("Simyacı");
        assert_eq!(offer.title, "Simyacı - Kitapyurdu");
        assert_eq!(offer.price, Some(PLACEHOLDER_PRICE));
        assert_eq!(offer.platform, Platform::Kitapyurdu);
        assert_eq!(offer.source, PLACEHOLDER_SOURCE);
        assert_eq!(offer.url.as_deref(), Some("https://www.kitapyurdu.com/kitap/simyacı"));
    }

    #[test]
    fn test_result_set_grouping_preserves_order() {
        let mut a = Offer::from_listing(listing("A", "10 TL", "Kitapyurdu"));
        a.source = "serpapi".to_string();
        let mut b = Offer::from_listing(listing("B", "20 TL", "idefix"));
        b.source = "fallback".to_string();
        let mut c = Offer::from_listing(listing("C", "5 TL", "n11"));
        c.source = "serpapi".to_string();

        let set = SearchResultSet::from_offers(vec![a, b, c]);
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());

        let serp: Vec<&str> = set.offers["serpapi"].iter().map(|o| o.title.as_str()).collect();
        assert_eq!(serp, vec!["A", "C"]);
        assert_eq!(set.offers["fallback"].len(), 1);
        assert!(set.best_offer.is_none());
    }

    #[test]
    fn test_empty_result_set() {
        let set = SearchResultSet::default();
        assert!(set.is_empty());
        assert_eq!(set.all_offers().count(), 0);
    }

    #[test]
    fn test_offer_serializes_platform_name() {
        let offer = Offer::placeholder("Nutuk");
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["platform"], "Kitapyurdu");
        assert_eq!(json["price"], 35.9);
    }
}
