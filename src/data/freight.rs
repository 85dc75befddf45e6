//! Freight-index PDF discovery and fetch.
//!
//! The index is published as a report PDF linked from a listing page, one
//! file per month with a zero-padded `YYYYMM` token in the filename. We scan
//! the listing's anchors for hrefs matching the configured pattern and take
//! the lexicographically maximal token — valid precisely because the token
//! is zero-padded.

use std::time::Instant;

use regex::Regex;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use url::Url;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::domain::TimeSeries;
use crate::error::DashError;
use crate::extract::extract_fiscal_series_from_pdf;

pub struct FreightSource<'a> {
    http: Client,
    listing_url: String,
    link_pattern: Regex,
    cache: &'a TtlCache<Vec<u8>>,
}

impl<'a> FreightSource<'a> {
    pub fn new(config: &Config, cache: &'a TtlCache<Vec<u8>>) -> Result<Self, DashError> {
        let link_pattern = Regex::new(&config.freight_link_pattern).map_err(|e| {
            DashError::InvalidArg(format!(
                "bad freight link pattern '{}': {e}",
                config.freight_link_pattern
            ))
        })?;
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| DashError::fetch("freight", format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            listing_url: config.freight_listing_url.clone(),
            link_pattern,
            cache,
        })
    }

    /// Resolve the URL of the newest index PDF from the listing page.
    pub fn discover_latest_pdf(&self) -> Result<String, DashError> {
        let resp = self
            .http
            .get(&self.listing_url)
            .send()
            .map_err(|e| DashError::fetch("freight-listing", format!("request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(DashError::fetch(
                "freight-listing",
                format!("listing returned status {}", resp.status()),
            ));
        }
        let html = resp
            .text()
            .map_err(|e| DashError::fetch("freight-listing", format!("reading body failed: {e}")))?;

        select_latest_link(&html, &self.listing_url, &self.link_pattern)
    }

    /// Fetch raw PDF bytes, cached by URL.
    pub fn fetch_pdf(&self, url: &str) -> Result<Vec<u8>, DashError> {
        let key = format!("freight:{url}");
        if let Some(hit) = self.cache.get_at(&key, Instant::now()) {
            tracing::debug!(url, "freight PDF cache hit");
            return Ok(hit);
        }

        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| DashError::fetch("freight", format!("request for {url} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(DashError::fetch(
                "freight",
                format!("request for {url} returned status {}", resp.status()),
            ));
        }
        let bytes = resp
            .bytes()
            .map_err(|e| DashError::fetch("freight", format!("reading {url} failed: {e}")))?
            .to_vec();

        self.cache.insert_at(key, bytes.clone(), Instant::now());
        Ok(bytes)
    }

    /// Discovery → fetch → extraction in one step. An unreadable PDF or one
    /// with no fiscal rows yields an empty series; only discovery and the
    /// byte fetch can fail.
    pub fn fetch_latest_series(&self) -> Result<TimeSeries, DashError> {
        let url = self.discover_latest_pdf()?;
        tracing::debug!(url, "freight PDF discovered");
        let bytes = self.fetch_pdf(&url)?;
        Ok(extract_fiscal_series_from_pdf(&bytes))
    }
}

/// Pick the matching href with the greatest `YYYYMM` capture and resolve it
/// against the listing URL.
fn select_latest_link(html: &str, listing_url: &str, pattern: &Regex) -> Result<String, DashError> {
    let document = Html::parse_document(html);
    let anchors = Selector::parse("a[href]")
        .map_err(|e| DashError::payload("freight-listing", format!("anchor selector: {e}")))?;

    let mut best: Option<(String, String)> = None;
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(token) = pattern
            .captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };
        if best.as_ref().is_none_or(|(t, _)| token > *t) {
            best = Some((token, href.to_string()));
        }
    }

    let Some((_, href)) = best else {
        return Err(DashError::Discovery {
            listing_url: listing_url.to_string(),
        });
    };

    let base = Url::parse(listing_url).map_err(|e| {
        DashError::InvalidArg(format!("bad listing URL '{listing_url}': {e}"))
    })?;
    let resolved = base
        .join(&href)
        .map_err(|e| DashError::payload("freight-listing", format!("unresolvable href '{href}': {e}")))?;
    Ok(resolved.to_string())
}
