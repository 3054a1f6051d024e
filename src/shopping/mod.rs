//! Shopping-search collaborator (Google Shopping via SerpAPI).

pub mod client;
pub mod parser;

pub use client::{SerpClient, ShoppingSearch};
pub use parser::{fallback_listings, parse_shopping_results, SERP_SOURCE};
