//! Offer models and the storefront table.

pub mod models;
pub mod platforms;

pub use models::{
    Offer, RawListing, SearchResultSet, FALLBACK_SOURCE, PLACEHOLDER_PRICE, PLACEHOLDER_SOURCE,
};
pub use platforms::Platform;
