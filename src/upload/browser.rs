//! Seller-panel automation through headless Chrome.

use super::{ProductListing, StagedRow, StepResult, UploadOutcome, UploadStrategy};
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

const LOGIN_PATH: &str = "/account/login";

const BULK_UPLOAD_LINK: &str = "//a[contains(text(), 'Toplu Ürün Yükleme')]";
const UPLOAD_BUTTON: &str = "//button[contains(text(), 'Yükle') or contains(text(), 'Upload')]";
const SUCCESS_BANNER: &str = "//div[contains(text(), 'başarı') or contains(text(), 'success')]";
const DROP_ZONE_INPUT: &str =
    "//div[contains(@class, 'drop-zone') or contains(@class, 'upload-area')]//input[@type='file']";

#[derive(Clone)]
struct PanelSession {
    panel_url: String,
    email: Option<String>,
    password: Option<String>,
    staging_path: PathBuf,
}

impl PanelSession {
    fn from_config(config: &Config) -> Self {
        Self {
            panel_url: config.marketplace_panel_url.clone(),
            email: config.marketplace_email.clone(),
            password: config.marketplace_password.clone(),
            staging_path: config.staging_path.clone(),
        }
    }

    fn origin(&self) -> &str {
        let url = self.panel_url.as_str();
        url.find("://")
            .map(|scheme| scheme + 3)
            .and_then(|host| url[host..].find('/').map(|i| &url[..host + i]))
            .unwrap_or(url)
    }

    fn launch() -> Result<Browser> {
        info!("Launching headless Chrome...");
        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .context("Failed to build launch options")?;
        Browser::new(options).context("Failed to launch Chrome browser")
    }

    /// Absolute staging file path plus login, checked before Chrome is launched.
    fn preflight(&self) -> Result<(String, &str, &str)> {
        let (Some(email), Some(password)) = (self.email.as_deref(), self.password.as_deref()) else {
            anyhow::bail!("seller panel login is not configured");
        };
        let absolute = std::fs::canonicalize(&self.staging_path)
            .with_context(|| format!("Staging file not found: {}", self.staging_path.display()))?;
        Ok((absolute.to_string_lossy().to_string(), email, password))
    }

    fn login(&self, tab: &Arc<Tab>, email: &str, password: &str) -> Result<()> {
        tab.navigate_to(&format!("{}{}", self.origin(), LOGIN_PATH))?;
        tab.wait_until_navigated()?;

        tab.wait_for_element("input[name='email']")?.type_into(email)?;
        tab.find_element("input[name='password']")?.type_into(password)?;
        tab.find_element("button[type='submit']")?.click()?;
        thread::sleep(Duration::from_secs(3));
        Ok(())
    }

    fn open_panel(&self, tab: &Arc<Tab>) -> Result<()> {
        tab.navigate_to(&self.panel_url)?;
        tab.wait_until_navigated()?;
        Ok(())
    }

    /// Login, open bulk upload, attach the file, submit, wait for the banner.
    fn form_fill(&self) -> Result<()> {
        let (file, email, password) = self.preflight()?;
        let browser = Self::launch()?;
        let tab = browser.new_tab()?;

        self.login(&tab, email, password)?;
        self.open_panel(&tab)?;

        tab.wait_for_xpath(BULK_UPLOAD_LINK)?.click()?;
        tab.wait_for_element("input[type='file']")?.set_input_files(&[file.as_str()])?;
        tab.wait_for_xpath(UPLOAD_BUTTON)?.click()?;
        tab.wait_for_xpath(SUCCESS_BANNER)?;
        Ok(())
    }

    /// Attach the file to the panel's drop zone and wait for the banner.
    fn drag_drop(&self) -> Result<()> {
        let (file, email, password) = self.preflight()?;
        let browser = Self::launch()?;
        let tab = browser.new_tab()?;

        self.login(&tab, email, password)?;
        self.open_panel(&tab)?;

        tab.wait_for_xpath(DROP_ZONE_INPUT)?.set_input_files(&[file.as_str()])?;
        tab.wait_for_xpath(SUCCESS_BANNER)?;
        Ok(())
    }
}

async fn run_blocking<F>(session: &PanelSession, step: F) -> Result<()>
where
    F: FnOnce(&PanelSession) -> Result<()> + Send + 'static,
{
    let session = session.clone();
    tokio::task::spawn_blocking(move || step(&session)).await.context("browser task panicked")?
}

fn escalate(strategy: &str, err: anyhow::Error) -> StepResult {
    warn!("{} upload failed: {:#}", strategy, err);
    StepResult::Escalate(format!("{err:#}"))
}

/// Logs into the seller panel and submits the staging file through the bulk-upload form.
pub struct BrowserFormFill {
    session: PanelSession,
}

impl BrowserFormFill {
    pub fn new(config: &Config) -> Self {
        Self { session: PanelSession::from_config(config) }
    }
}

#[async_trait]
impl UploadStrategy for BrowserFormFill {
    fn name(&self) -> &'static str {
        "browser_form"
    }

    async fn attempt(&self, _listing: &ProductListing, staged: &StagedRow) -> StepResult {
        match run_blocking(&self.session, PanelSession::form_fill).await {
            Ok(()) => StepResult::Done(UploadOutcome::success(
                format!("Excel dosyası panel üzerinden yüklendi. Barkod: {}", staged.barcode),
                self.name(),
            )),
            Err(e) => escalate(self.name(), e),
        }
    }
}

/// Drops the staging file onto the seller panel's upload area.
pub struct DragDrop {
    session: PanelSession,
}

impl DragDrop {
    pub fn new(config: &Config) -> Self {
        Self { session: PanelSession::from_config(config) }
    }
}

#[async_trait]
impl UploadStrategy for DragDrop {
    fn name(&self) -> &'static str {
        "drag_drop"
    }

    async fn attempt(&self, _listing: &ProductListing, staged: &StagedRow) -> StepResult {
        match run_blocking(&self.session, PanelSession::drag_drop).await {
            Ok(()) => StepResult::Done(UploadOutcome::success(
                format!("Excel dosyası sürükle-bırak ile yüklendi. Barkod: {}", staged.barcode),
                self.name(),
            )),
            Err(e) => escalate(self.name(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        let session = PanelSession::from_config(&Config::default());
        assert_eq!(session.origin(), "https://partner.trendyol.com");
    }

    #[test]
    fn test_preflight_requires_login() {
        let session = PanelSession::from_config(&Config::default());
        let err = session.preflight().unwrap_err();
        assert!(err.to_string().contains("login is not configured"));
    }

    #[test]
    fn test_preflight_requires_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            staging_path: dir.path().join("missing.xlsx"),
            marketplace_email: Some("satici@example.com".to_string()),
            marketplace_password: Some("secret".to_string()),
            ..Config::default()
        };
        let err = PanelSession::from_config(&config).preflight().unwrap_err();
        assert!(err.to_string().contains("Staging file not found"));
    }

    #[tokio::test]
    async fn test_strategy_escalates_when_not_configured() {
        let form = BrowserFormFill::new(&Config::default());
        let listing = ProductListing {
            title: "Nutuk".to_string(),
            description: String::new(),
            price: 100.0,
            market_price: None,
            image_url: None,
            author: None,
        };
        let staged =
            StagedRow { barcode: "mfnut2025".into(), stock: 10, shipping_days: 2, year: 2025 };
        assert!(matches!(form.attempt(&listing, &staged).await, StepResult::Escalate(_)));
    }
}
