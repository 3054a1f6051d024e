//! kitap-scout - Turkish book price scout
//!
//! Finds the cheapest offer for a book across Turkish storefronts, writes
//! listing copy and spreadsheet reports, and stages marketplace uploads.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod format;
pub mod offers;
pub mod pipeline;
pub mod prediction;
pub mod pricing;
pub mod profit;
pub mod report;
pub mod reviews;
pub mod server;
pub mod shopping;
pub mod upload;

pub use config::Config;
pub use error::{SearchError, SheetError, SourceError};
pub use offers::{Offer, Platform, RawListing, SearchResultSet};
pub use pipeline::{BookSearch, SearchOutcome};
pub use pricing::{best_offer, normalize_price};
