//! Review collection for advanced searches.

pub mod client;
pub mod models;

pub use client::{RapidApiReviews, ReviewSource};
pub use models::{Review, ReviewSummary};
