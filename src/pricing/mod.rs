//! Price parsing and best-offer selection.

pub mod normalizer;
pub mod ranker;

pub use normalizer::normalize_price;
pub use ranker::{best_offer, dedup, rank};
