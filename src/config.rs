//! Configuration management with TOML, `.env`/environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
///
/// Built once at start-up and handed to each collaborator; nothing reads the
/// environment after that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// SerpAPI key for Google Shopping searches
    #[serde(default)]
    pub serp_api_key: Option<String>,

    #[serde(default = "default_serp_base_url")]
    pub serp_base_url: String,

    /// Gemini API key
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// RapidAPI key for review lookups
    #[serde(default)]
    pub rapidapi_key: Option<String>,

    #[serde(default = "default_reviews_base_url")]
    pub reviews_base_url: String,

    /// Marketplace (Trendyol) seller API key
    #[serde(default)]
    pub marketplace_api_key: Option<String>,

    /// Marketplace seller id
    #[serde(default)]
    pub marketplace_supplier_id: Option<String>,

    #[serde(default = "default_marketplace_api_base")]
    pub marketplace_api_base: String,

    /// Public storefront searched for an existing product page
    #[serde(default = "default_marketplace_storefront_url")]
    pub marketplace_storefront_url: String,

    /// Seller panel page the manual hand-off points at
    #[serde(default = "default_marketplace_panel_url")]
    pub marketplace_panel_url: String,

    /// Seller panel login (browser strategies only)
    #[serde(default)]
    pub marketplace_email: Option<String>,

    #[serde(default)]
    pub marketplace_password: Option<String>,

    /// Directory for generated reports
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Staging spreadsheet listings are appended to before upload
    #[serde(default = "default_staging_path")]
    pub staging_path: PathBuf,

    /// Per-request timeout for HTTP collaborators
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries for the LLM call on 429/503
    #[serde(default = "default_llm_max_retries")]
    pub llm_max_retries: u32,

    /// First retry delay; doubles on each attempt
    #[serde(default = "default_llm_retry_base_ms")]
    pub llm_retry_base_ms: u64,

    /// Maximum shopping results kept per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Maximum reviews collected per book
    #[serde(default = "default_review_limit")]
    pub review_limit: usize,

    /// Safety cap on review pages
    #[serde(default = "default_review_max_pages")]
    pub review_max_pages: u32,

    /// Marketplace commission rate (0.21 = 21%)
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,

    /// Shipping cost per sale in TL
    #[serde(default = "default_shipping_cost")]
    pub shipping_cost: f64,

    /// Target profit per sale in TL
    #[serde(default = "default_profit_margin")]
    pub profit_margin: f64,

    /// Open the seller panel in the default browser on manual hand-off
    #[serde(default = "default_open_browser")]
    pub open_browser: bool,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_serp_base_url() -> String {
    "https://serpapi.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_reviews_base_url() -> String {
    "https://real-time-amazon-data.p.rapidapi.com".to_string()
}

fn default_marketplace_api_base() -> String {
    "https://api.trendyol.com/sapigw".to_string()
}

fn default_marketplace_storefront_url() -> String {
    "https://www.trendyol.com".to_string()
}

fn default_marketplace_panel_url() -> String {
    "https://partner.trendyol.com/product-management".to_string()
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_staging_path() -> PathBuf {
    PathBuf::from("reports").join("trendyol_urunler.xlsx")
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_llm_max_retries() -> u32 {
    3
}

fn default_llm_retry_base_ms() -> u64 {
    1000
}

fn default_max_results() -> usize {
    5
}

fn default_review_limit() -> usize {
    100
}

fn default_review_max_pages() -> u32 {
    10
}

fn default_commission_rate() -> f64 {
    0.21
}

fn default_shipping_cost() -> f64 {
    70.0
}

fn default_profit_margin() -> f64 {
    100.0
}

fn default_open_browser() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            serp_api_key: None,
            serp_base_url: default_serp_base_url(),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            gemini_base_url: default_gemini_base_url(),
            rapidapi_key: None,
            reviews_base_url: default_reviews_base_url(),
            marketplace_api_key: None,
            marketplace_supplier_id: None,
            marketplace_api_base: default_marketplace_api_base(),
            marketplace_storefront_url: default_marketplace_storefront_url(),
            marketplace_panel_url: default_marketplace_panel_url(),
            marketplace_email: None,
            marketplace_password: None,
            reports_dir: default_reports_dir(),
            staging_path: default_staging_path(),
            request_timeout_secs: default_request_timeout_secs(),
            llm_max_retries: default_llm_max_retries(),
            llm_retry_base_ms: default_llm_retry_base_ms(),
            max_results: default_max_results(),
            review_limit: default_review_limit(),
            review_max_pages: default_review_max_pages(),
            commission_rate: default_commission_rate(),
            shipping_cost: default_shipping_cost(),
            profit_margin: default_profit_margin(),
            open_browser: default_open_browser(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("kitap-scout").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides (including values loaded from `.env`).
    pub fn with_env(mut self) -> Self {
        if let Some(key) = non_empty_env("SERP_API_KEY") {
            self.serp_api_key = Some(key);
        }

        if let Some(key) = non_empty_env("GEMINI_API_KEY") {
            self.gemini_api_key = Some(key);
        }

        if let Some(key) = non_empty_env("RAPIDAPI_KEY") {
            self.rapidapi_key = Some(key);
        }

        if let Some(key) = non_empty_env("TRENDYOL_API_KEY") {
            self.marketplace_api_key = Some(key);
        }

        if let Some(id) = non_empty_env("TRENDYOL_SUPPLIER_ID") {
            self.marketplace_supplier_id = Some(id);
        }

        if let Some(email) = non_empty_env("TRENDYOL_EMAIL") {
            self.marketplace_email = Some(email);
        }

        if let Some(password) = non_empty_env("TRENDYOL_PASSWORD") {
            self.marketplace_password = Some(password);
        }

        if let Ok(port) = std::env::var("KITAP_PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        if let Some(dir) = non_empty_env("KITAP_REPORTS_DIR") {
            self.reports_dir = PathBuf::from(dir);
        }

        self
    }

    /// Timeout applied to every HTTP collaborator request.
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
