//! Marketplace listing upload: stage a spreadsheet row, then walk the strategy ladder.

pub mod api;
#[cfg(feature = "browser")]
pub mod browser;
pub mod manual;
pub mod staging;

use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use api::ApiUpload;
pub use manual::ManualHandoff;
pub use staging::{generate_barcode, StagedRow, StagingSheet};

/// A product to list on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Our selling price
    pub price: f64,
    /// Reference price shown as the market price; defaults to `price`
    #[serde(default)]
    pub market_price: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Warning,
    Info,
    Error,
}

/// Final result of a publish attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub status: UploadStatus,
    pub message: String,
    /// Strategy that produced the outcome, if any ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
}

impl UploadOutcome {
    fn new(status: UploadStatus, message: String, strategy: Option<&str>) -> Self {
        Self { status, message, strategy: strategy.map(str::to_string) }
    }

    pub fn success(message: String, strategy: &str) -> Self {
        Self::new(UploadStatus::Success, message, Some(strategy))
    }

    pub fn warning(message: String, strategy: &str) -> Self {
        Self::new(UploadStatus::Warning, message, Some(strategy))
    }

    pub fn info(message: String, strategy: &str) -> Self {
        Self::new(UploadStatus::Info, message, Some(strategy))
    }

    pub fn error(message: String) -> Self {
        Self::new(UploadStatus::Error, message, None)
    }
}

/// What one rung of the ladder concluded.
#[derive(Debug)]
pub enum StepResult {
    /// Stop here with this outcome
    Done(UploadOutcome),
    /// Try the next strategy; carries the reason this one gave up
    Escalate(String),
}

/// One way of getting a staged listing onto the marketplace.
#[async_trait]
pub trait UploadStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, listing: &ProductListing, staged: &StagedRow) -> StepResult;
}

/// Stages listings and runs the strategy ladder in order.
pub struct Uploader {
    staging: StagingSheet,
    ladder: Vec<Box<dyn UploadStrategy>>,
}

impl Uploader {
    pub fn new(staging: StagingSheet, ladder: Vec<Box<dyn UploadStrategy>>) -> Self {
        Self { staging, ladder }
    }

    /// The default ladder: API, browser strategies (with the `browser` feature), manual hand-off.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut ladder: Vec<Box<dyn UploadStrategy>> = vec![Box::new(ApiUpload::new(config)?)];

        #[cfg(feature = "browser")]
        {
            ladder.push(Box::new(browser::BrowserFormFill::new(config)));
            ladder.push(Box::new(browser::DragDrop::new(config)));
        }

        ladder.push(Box::new(ManualHandoff::new(config)?));

        Ok(Self::new(StagingSheet::new(&config.staging_path), ladder))
    }

    pub fn strategies(&self) -> Vec<&'static str> {
        self.ladder.iter().map(|s| s.name()).collect()
    }

    /// Stages `listing` and publishes it. Never fails; problems are reported in the outcome.
    pub async fn publish(&self, listing: &ProductListing) -> UploadOutcome {
        let staging = self.staging.clone();
        let row = listing.clone();
        let appended = match tokio::task::spawn_blocking(move || staging.append(&row)).await {
            Ok(appended) => appended,
            Err(e) => {
                warn!("Staging task failed: {}", e);
                return UploadOutcome::error(format!("Excel dosyasına yazma hatası: {e}"));
            }
        };

        let staged = match appended {
            Ok(staged) => staged,
            Err(e) if e.is_permission_denied() => {
                warn!("Staging file is locked: {}", e);
                return UploadOutcome {
                    status: UploadStatus::Warning,
                    message: format!(
                        "Excel dosyası açık olduğu için yazılamadı. Barkod: {} - Lütfen dosyayı kapatıp tekrar deneyin.",
                        generate_barcode(&listing.title, chrono::Local::now().year())
                    ),
                    strategy: None,
                };
            }
            Err(e) => {
                warn!("Staging failed: {}", e);
                return UploadOutcome::error(format!("Excel dosyasına yazma hatası: {e}"));
            }
        };

        let staged_note = format!(
            "Ürün Excel dosyasına eklendi. Barkod: {}, Stok: {}, Sevkiyat: {} gün.",
            staged.barcode, staged.stock, staged.shipping_days
        );

        let mut reasons = Vec::new();
        for strategy in &self.ladder {
            info!("Trying upload strategy: {}", strategy.name());
            match strategy.attempt(listing, &staged).await {
                StepResult::Done(mut outcome) => {
                    outcome.message = format!("{} {}", staged_note, outcome.message);
                    return outcome;
                }
                StepResult::Escalate(reason) => {
                    info!("Strategy {} escalated: {}", strategy.name(), reason);
                    reasons.push(format!("{}: {}", strategy.name(), reason));
                }
            }
        }

        UploadOutcome::error(format!(
            "{} Hiçbir yükleme yöntemi başarılı olmadı ({}).",
            staged_note,
            reasons.join("; ")
        ))
    }
}
