//! Runtime configuration.
//!
//! Everything a fetcher needs is carried in an explicit [`Config`] value that
//! callers construct once and pass down — no process-wide singletons. Base
//! URLs are plain fields so tests can point the clients at a local mock
//! server instead of the real services.

use std::time::Duration;

use chrono::NaiveDate;

use crate::error::DashError;

/// FRED series id for copper, USD per metric ton, monthly.
pub const SERIES_COPPER: &str = "PCOPPUSDM";
/// FRED series id for aluminum, USD per metric ton, monthly.
pub const SERIES_ALUMINUM: &str = "PALUMUSDM";
/// FRED series id for the USD/JPY exchange rate, monthly average.
pub const SERIES_USDJPY: &str = "EXJPUS";

const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const ESTAT_BASE_URL: &str = "https://api.e-stat.go.jp/rest/3.0/app/json";

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// FRED API key. Required for the metal/FX sections; checked at client
    /// construction so the failure is a clean `MissingCredential`.
    pub fred_api_key: Option<String>,
    /// e-Stat application id. Optional: without it the labor section is
    /// skipped rather than failing the run.
    pub estat_app_id: Option<String>,

    pub fred_base_url: String,
    pub estat_base_url: String,
    /// Listing page scanned for the latest freight-index PDF.
    pub freight_listing_url: String,
    /// Pattern applied to each `href`; capture group 1 must be the
    /// zero-padded `YYYYMM` token used to pick the newest document.
    pub freight_link_pattern: String,

    /// First month fetched from every source.
    pub start: NaiveDate,
    /// Per-request timeout. Expiry surfaces as a fetch failure, not a retry.
    pub http_timeout: Duration,
    /// How long fetched payloads are reused before the next access refetches.
    pub cache_ttl: Duration,
}

impl Config {
    /// Build a configuration from the environment (reading `.env` if
    /// present) and the given start date.
    pub fn from_env(start: NaiveDate) -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::offline(start);
        config.fred_api_key = std::env::var("FRED_API_KEY").ok().filter(|v| !v.is_empty());
        config.estat_app_id = std::env::var("ESTAT_APP_ID").ok().filter(|v| !v.is_empty());
        config.freight_listing_url = std::env::var("FREIGHT_LISTING_URL").unwrap_or_default();
        config
    }

    /// Configuration with no credentials, pointing at the real endpoints.
    /// Tests overwrite the URLs; the pipeline overwrites the keys.
    pub fn offline(start: NaiveDate) -> Self {
        Self {
            fred_api_key: None,
            estat_app_id: None,
            fred_base_url: FRED_BASE_URL.to_string(),
            estat_base_url: ESTAT_BASE_URL.to_string(),
            freight_listing_url: String::new(),
            freight_link_pattern: r"(\d{6})\.pdf$".to_string(),
            start,
            http_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(60 * 60),
        }
    }

    /// The FRED key, or the hard-stop error for sections that cannot run
    /// without it.
    pub fn require_fred_key(&self) -> Result<&str, DashError> {
        self.fred_api_key
            .as_deref()
            .ok_or(DashError::MissingCredential { name: "FRED_API_KEY" })
    }
}
