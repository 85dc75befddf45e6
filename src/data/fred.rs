//! FRED observations fetcher (metal prices in USD/ton and USD/JPY).

use std::time::Instant;

use chrono::{NaiveDate, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::domain::TimeSeries;
use crate::error::DashError;

#[derive(Debug)]
pub struct FredClient<'a> {
    http: Client,
    api_key: String,
    base_url: String,
    cache: &'a TtlCache<TimeSeries>,
}

impl<'a> FredClient<'a> {
    /// Build a client, failing early with `MissingCredential` when no API
    /// key is configured — the metal section cannot run without it.
    pub fn new(config: &Config, cache: &'a TtlCache<TimeSeries>) -> Result<Self, DashError> {
        let api_key = config.require_fred_key()?.to_string();
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| DashError::fetch("fred", format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            api_key,
            base_url: config.fred_base_url.clone(),
            cache,
        })
    }

    /// Fetch one series covering `start` through today as a monthly series.
    ///
    /// Pairs with a missing or non-numeric field are dropped (FRED encodes
    /// missing values as `"."`); duplicate dates keep the last occurrence.
    /// The result is cached by (series id, start) for the configured TTL, so
    /// repeated render passes inside the window reuse it without a call.
    pub fn fetch_series(&self, series_id: &str, start: NaiveDate) -> Result<TimeSeries, DashError> {
        let key = format!("fred:{series_id}:{start}");
        if let Some(hit) = self.cache.get_at(&key, Instant::now()) {
            tracing::debug!(series_id, "FRED cache hit");
            return Ok(hit);
        }

        let start_param = start.to_string();
        let end_param = Utc::now().date_naive().to_string();
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start_param.as_str()),
                ("observation_end", end_param.as_str()),
            ])
            .send()
            .map_err(|e| DashError::fetch("fred", format!("request for {series_id} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DashError::fetch(
                "fred",
                format!("request for {series_id} returned status {}", resp.status()),
            ));
        }

        let body: ObservationsResponse = resp.json().map_err(|e| {
            DashError::payload("fred", format!("response for {series_id} is not valid JSON: {e}"))
        })?;

        let mut observations = Vec::with_capacity(body.observations.len());
        for obs in body.observations {
            let (Some(date_str), Some(value_str)) = (obs.date, obs.value) else {
                continue;
            };
            let Some(value) = parse_value(&value_str) else {
                continue;
            };
            let Ok(date) = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d") else {
                continue;
            };
            observations.push((date, value));
        }

        let series = TimeSeries::from_observations(observations);
        tracing::debug!(series_id, n = series.len(), "FRED series fetched");
        self.cache.insert_at(key, series.clone(), Instant::now());
        Ok(series)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<Observation>,
}

/// Both fields string-typed and optional: records missing either are
/// dropped, not an error.
#[derive(Debug, Deserialize)]
struct Observation {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    value: Option<String>,
}

fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}
