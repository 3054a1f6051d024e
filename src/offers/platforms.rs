//! Known Turkish book storefronts and their URL templates.

use serde::{Deserialize, Serialize};

/// Storefront an offer was observed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Kitapyurdu,
    #[serde(rename = "İdefix")]
    Idefix,
    #[serde(rename = "D&R")]
    Dr,
    N11,
    Trendyol,
    #[default]
    Unknown,
}

impl Platform {
    /// Returns all known storefronts (excluding `Unknown`).
    pub fn all() -> &'static [Platform] {
        &[Platform::Kitapyurdu, Platform::Idefix, Platform::Dr, Platform::N11, Platform::Trendyol]
    }

    /// Maps a raw source identifier (e.g. `"Kitapyurdu.com"`, `"D&R"`) to a platform.
    pub fn from_source(source: &str) -> Self {
        let source = source.trim().to_lowercase();

        if source.contains("kitapyurdu") {
            Platform::Kitapyurdu
        } else if source.contains("defix") {
            Platform::Idefix
        } else if source.contains("d&r") || source.contains("dr.com") || source == "dr" {
            Platform::Dr
        } else if source.contains("n11") {
            Platform::N11
        } else if source.contains("trendyol") {
            Platform::Trendyol
        } else {
            Platform::Unknown
        }
    }

    /// Human-readable storefront name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Kitapyurdu => "Kitapyurdu",
            Platform::Idefix => "İdefix",
            Platform::Dr => "D&R",
            Platform::N11 => "N11",
            Platform::Trendyol => "Trendyol",
            Platform::Unknown => "Unknown",
        }
    }

    /// Storefront domain.
    pub fn domain(&self) -> &'static str {
        match self {
            Platform::Kitapyurdu => "www.kitapyurdu.com",
            Platform::Idefix => "www.idefix.com",
            Platform::Dr => "www.dr.com.tr",
            Platform::N11 => "www.n11.com",
            Platform::Trendyol => "www.trendyol.com",
            Platform::Unknown => "www.google.com",
        }
    }

    /// Synthesizes a listing URL for a title when the source gave none.
    pub fn listing_url(&self, title: &str) -> String {
        let slug = slugify(title);
        let domain = self.domain();

        match self {
            Platform::Kitapyurdu | Platform::Idefix | Platform::Dr => {
                format!("https://{}/kitap/{}", domain, slug)
            }
            Platform::N11 => format!("https://{}/arama?q={}", domain, slug),
            Platform::Trendyol => format!("https://{}/sr?q={}", domain, slug),
            Platform::Unknown => format!("https://{}/search?q={}", domain, slug),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Lowercases and replaces spaces and slashes with dashes.
pub fn slugify(title: &str) -> String {
    title.trim().to_lowercase().replace([' ', '/'], "-")
}
