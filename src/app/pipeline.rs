//! Shared dashboard pipeline used by both the terminal report and the
//! export command:
//!
//! fetch (FRED / e-Stat / PDF) -> extract -> convert -> outer-join -> summary
//!
//! The metal/FX section is required and its failures abort the run; the
//! labor and freight sections are caught at their own boundary and surface
//! as scoped section states, so one source's failure never blanks the whole
//! dashboard.

use std::time::Duration;

use chrono::Local;
use serde_json::Value;

use crate::cache::TtlCache;
use crate::config::{Config, SERIES_ALUMINUM, SERIES_COPPER, SERIES_USDJPY};
use crate::data::{EstatClient, FredClient, FreightSource};
use crate::domain::{MasterTable, TimeSeries};
use crate::error::DashError;
use crate::extract::{LabelFilter, extract_labeled_series};
use crate::report::{DashboardData, SectionOutcome, SectionReport};

pub const COL_COPPER: &str = "copper_jpy_kg";
pub const COL_ALUMINUM: &str = "aluminum_jpy_kg";
pub const COL_USDJPY: &str = "usdjpy";
pub const COL_WAGE: &str = "wage_index";
pub const COL_FREIGHT: &str = "freight_index";

/// Maximum observation records requested per statistical table.
const ESTAT_RECORD_LIMIT: u32 = 100_000;
/// Table-search hits considered; the first (most relevant) one is used.
const ESTAT_SEARCH_LIMIT: u32 = 5;

/// Per-run knobs resolved from the CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub labor_keyword: String,
    pub labor_stats_code: Option<String>,
    pub labor_industry: LabelFilter,
    pub labor_item: LabelFilter,
    pub include_labor: bool,
    pub include_freight: bool,
}

/// The per-key fetch caches, owned by the caller so repeated render passes
/// within the TTL window reuse responses.
pub struct Caches {
    pub series: TtlCache<TimeSeries>,
    pub payloads: TtlCache<Value>,
    pub documents: TtlCache<Vec<u8>>,
}

impl Caches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            series: TtlCache::new(ttl),
            payloads: TtlCache::new(ttl),
            documents: TtlCache::new(ttl),
        }
    }
}

/// Run the full pipeline with fresh caches.
pub fn run_dashboard(config: &Config, options: &RunOptions) -> Result<DashboardData, DashError> {
    let caches = Caches::new(config.cache_ttl);
    run_dashboard_with_caches(config, options, &caches)
}

/// Run the full pipeline against caller-owned caches.
pub fn run_dashboard_with_caches(
    config: &Config,
    options: &RunOptions,
    caches: &Caches,
) -> Result<DashboardData, DashError> {
    // Metal prices and FX are the dashboard's reason to exist: a missing
    // credential or fetch failure here is a hard stop.
    let fred = FredClient::new(config, &caches.series)?;
    let copper = fred.fetch_series(SERIES_COPPER, config.start)?;
    let aluminum = fred.fetch_series(SERIES_ALUMINUM, config.start)?;
    let usdjpy = fred.fetch_series(SERIES_USDJPY, config.start)?;

    // USD/ton × USDJPY ÷ 1000 → JPY/kg, inner-joined on month.
    let copper_jpy = copper.combine(&usdjpy, |price, fx| price * fx / 1000.0);
    let aluminum_jpy = aluminum.combine(&usdjpy, |price, fx| price * fx / 1000.0);

    let mut sections = vec![SectionReport {
        name: "metals (FRED)",
        outcome: SectionOutcome::Ready {
            months: copper_jpy.len().max(aluminum_jpy.len()),
        },
    }];

    let (wage, labor_outcome) = labor_section(config, options, caches);
    sections.push(SectionReport {
        name: "labor (e-Stat)",
        outcome: labor_outcome,
    });

    let (freight, freight_outcome) = freight_section(config, options, caches);
    sections.push(SectionReport {
        name: "freight index",
        outcome: freight_outcome,
    });

    let master = MasterTable::from_series(&[
        (COL_COPPER, &copper_jpy),
        (COL_ALUMINUM, &aluminum_jpy),
        (COL_USDJPY, &usdjpy),
        (COL_WAGE, &wage),
        (COL_FREIGHT, &freight),
    ]);

    Ok(DashboardData {
        summary: master.summary(),
        master,
        sections,
        generated_at: Local::now(),
    })
}

/// Fixed source links shown under the terminal dashboard.
pub fn source_links(config: &Config) -> Vec<String> {
    let mut links: Vec<String> = [SERIES_COPPER, SERIES_ALUMINUM, SERIES_USDJPY]
        .iter()
        .map(|id| format!("https://fred.stlouisfed.org/series/{id}"))
        .collect();
    if !config.freight_listing_url.is_empty() {
        links.push(config.freight_listing_url.clone());
    }
    links
}

fn labor_section(
    config: &Config,
    options: &RunOptions,
    caches: &Caches,
) -> (TimeSeries, SectionOutcome) {
    if !options.include_labor {
        return skipped("disabled (--no-labor)");
    }
    if config.estat_app_id.is_none() {
        return skipped("ESTAT_APP_ID not set");
    }
    match fetch_wage_series(config, options, caches) {
        Ok(series) if series.is_empty() => (
            TimeSeries::empty(),
            SectionOutcome::Empty {
                note: "no records matched the label filters".to_string(),
            },
        ),
        Ok(series) => {
            let months = series.len();
            (series, SectionOutcome::Ready { months })
        }
        Err(error) => {
            tracing::warn!(%error, "labor section failed");
            (TimeSeries::empty(), SectionOutcome::Failed { error })
        }
    }
}

fn fetch_wage_series(
    config: &Config,
    options: &RunOptions,
    caches: &Caches,
) -> Result<TimeSeries, DashError> {
    let client = EstatClient::new(config, &caches.payloads)?;
    let tables = client.search_tables(
        &options.labor_keyword,
        options.labor_stats_code.as_deref(),
        ESTAT_SEARCH_LIMIT,
    )?;
    let Some(table) = tables.first() else {
        return Ok(TimeSeries::empty());
    };
    tracing::debug!(table_id = %table.id, title = %table.title, "labor table selected");

    let payload = client.fetch_table(&table.id, ESTAT_RECORD_LIMIT)?;
    Ok(extract_labeled_series(
        &payload,
        Some(&options.labor_industry),
        Some(&options.labor_item),
    ))
}

fn freight_section(
    config: &Config,
    options: &RunOptions,
    caches: &Caches,
) -> (TimeSeries, SectionOutcome) {
    if !options.include_freight {
        return skipped("disabled (--no-freight)");
    }
    if config.freight_listing_url.is_empty() {
        return skipped("no freight listing URL configured (--freight-listing)");
    }

    let source = match FreightSource::new(config, &caches.documents) {
        Ok(source) => source,
        Err(error) => return (TimeSeries::empty(), SectionOutcome::Failed { error }),
    };
    match source.fetch_latest_series() {
        Ok(series) if series.is_empty() => (
            TimeSeries::empty(),
            SectionOutcome::Empty {
                note: "no fiscal-year rows found in the PDF".to_string(),
            },
        ),
        Ok(series) => {
            let months = series.len();
            (series, SectionOutcome::Ready { months })
        }
        Err(error) => {
            tracing::warn!(%error, "freight section failed");
            (TimeSeries::empty(), SectionOutcome::Failed { error })
        }
    }
}

fn skipped(reason: &str) -> (TimeSeries, SectionOutcome) {
    (
        TimeSeries::empty(),
        SectionOutcome::Skipped {
            reason: reason.to_string(),
        },
    )
}
