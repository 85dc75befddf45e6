//! Labor-statistics API client (e-Stat).
//!
//! Two endpoints: a table search (`getStatsList`) used to locate the current
//! monthly labor survey table, and a data retrieval (`getStatsData`) whose
//! nested payload goes to [`crate::extract::extract_labeled_series`]. The
//! raw payload is cached rather than the extracted series so different
//! filters can reuse one download.

use std::time::Instant;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::DashError;

/// One table-search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub id: String,
    pub title: String,
    pub updated: Option<String>,
}

#[derive(Debug)]
pub struct EstatClient<'a> {
    http: Client,
    app_id: String,
    base_url: String,
    cache: &'a TtlCache<Value>,
}

impl<'a> EstatClient<'a> {
    pub fn new(config: &Config, cache: &'a TtlCache<Value>) -> Result<Self, DashError> {
        let app_id = config
            .estat_app_id
            .clone()
            .ok_or(DashError::MissingCredential { name: "ESTAT_APP_ID" })?;
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| DashError::fetch("estat", format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            app_id,
            base_url: config.estat_base_url.clone(),
            cache,
        })
    }

    /// Search statistical tables by keyword, optionally restricted to one
    /// statistics code (survey family).
    pub fn search_tables(
        &self,
        keyword: &str,
        stats_code: Option<&str>,
        limit: u32,
    ) -> Result<Vec<TableInfo>, DashError> {
        let limit = limit.to_string();
        let mut query = vec![
            ("appId", self.app_id.as_str()),
            ("searchWord", keyword),
            ("limit", limit.as_str()),
        ];
        if let Some(code) = stats_code {
            query.push(("statsCode", code));
        }

        let resp = self
            .http
            .get(format!("{}/getStatsList", self.base_url))
            .query(&query)
            .send()
            .map_err(|e| DashError::fetch("estat", format!("table search failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(DashError::fetch(
                "estat",
                format!("table search returned status {}", resp.status()),
            ));
        }
        let payload: Value = resp
            .json()
            .map_err(|e| DashError::payload("estat", format!("table search response is not JSON: {e}")))?;

        parse_table_list(&payload)
    }

    /// Fetch one table's full data payload, cached by table id.
    pub fn fetch_table(&self, table_id: &str, limit: u32) -> Result<Value, DashError> {
        let key = format!("estat:{table_id}:{limit}");
        if let Some(hit) = self.cache.get_at(&key, Instant::now()) {
            tracing::debug!(table_id, "e-Stat cache hit");
            return Ok(hit);
        }

        let limit = limit.to_string();
        let resp = self
            .http
            .get(format!("{}/getStatsData", self.base_url))
            .query(&[
                ("appId", self.app_id.as_str()),
                ("statsDataId", table_id),
                ("metaGetFlg", "Y"),
                ("cntGetFlg", "N"),
                ("limit", limit.as_str()),
            ])
            .send()
            .map_err(|e| DashError::fetch("estat", format!("data request for {table_id} failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(DashError::fetch(
                "estat",
                format!("data request for {table_id} returned status {}", resp.status()),
            ));
        }
        let payload: Value = resp.json().map_err(|e| {
            DashError::payload("estat", format!("data response for {table_id} is not JSON: {e}"))
        })?;

        check_result_status(&payload, "/GET_STATS_DATA/RESULT")?;
        tracing::debug!(table_id, "e-Stat table fetched");
        self.cache.insert_at(key, payload.clone(), Instant::now());
        Ok(payload)
    }
}

/// Pull `{id, title, updated}` rows out of a `getStatsList` payload.
fn parse_table_list(payload: &Value) -> Result<Vec<TableInfo>, DashError> {
    check_result_status(payload, "/GET_STATS_LIST/RESULT")?;

    let tables = payload.pointer("/GET_STATS_LIST/DATALIST_INF/TABLE_INF");
    let list = match tables {
        Some(Value::Array(items)) => items.iter().collect::<Vec<_>>(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    };

    Ok(list
        .into_iter()
        .filter_map(|table| {
            let id = table.get("@id").and_then(Value::as_str)?;
            // TITLE is either a plain string or `{"@no": .., "$": ..}`.
            let title = match table.get("TITLE") {
                Some(Value::String(s)) => s.clone(),
                Some(obj) => obj.get("$").and_then(Value::as_str).unwrap_or("").to_string(),
                None => String::new(),
            };
            let updated = table
                .get("UPDATED_DATE")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(TableInfo {
                id: id.to_string(),
                title,
                updated,
            })
        })
        .collect())
}

/// The API reports its own failures inside a 200 response; a non-zero
/// `RESULT.STATUS` means the payload carries an error document instead of
/// data. Raw error fields go into the message so they reach the user.
fn check_result_status(payload: &Value, result_pointer: &str) -> Result<(), DashError> {
    let Some(result) = payload.pointer(result_pointer) else {
        return Err(DashError::payload("estat", "response has no RESULT block"));
    };
    let status = match result.get("STATUS") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    };
    match status {
        Some(0) => Ok(()),
        _ => {
            let message = result
                .get("ERROR_MSG")
                .and_then(Value::as_str)
                .unwrap_or("unknown API error");
            Err(DashError::payload(
                "estat",
                format!("STATUS={status:?}: {message}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config_for(server: &MockServer) -> Config {
        let mut config =
            Config::offline(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        config.estat_app_id = Some("app-id".to_string());
        config.estat_base_url = server.base_url();
        config
    }

    #[test]
    fn table_list_parses_both_title_shapes() {
        let payload = json!({
            "GET_STATS_LIST": {
                "RESULT": {"STATUS": 0},
                "DATALIST_INF": {
                    "TABLE_INF": [
                        {"@id": "0001", "TITLE": "毎月勤労統計調査", "UPDATED_DATE": "2025-07-01"},
                        {"@id": "0002", "TITLE": {"@no": "1", "$": "実質賃金指数"}}
                    ]
                }
            }
        });
        let tables = parse_table_list(&payload).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].title, "毎月勤労統計調査");
        assert_eq!(tables[0].updated.as_deref(), Some("2025-07-01"));
        assert_eq!(tables[1].title, "実質賃金指数");
        assert_eq!(tables[1].updated, None);
    }

    #[test]
    fn single_table_object_is_accepted() {
        let payload = json!({
            "GET_STATS_LIST": {
                "RESULT": {"STATUS": "0"},
                "DATALIST_INF": {
                    "TABLE_INF": {"@id": "0003", "TITLE": "t"}
                }
            }
        });
        let tables = parse_table_list(&payload).unwrap();
        assert_eq!(tables, vec![TableInfo {
            id: "0003".to_string(),
            title: "t".to_string(),
            updated: None,
        }]);
    }

    #[test]
    fn api_error_document_is_malformed_payload() {
        let payload = json!({
            "GET_STATS_LIST": {
                "RESULT": {"STATUS": 100, "ERROR_MSG": "appId invalid"}
            }
        });
        let err = parse_table_list(&payload).unwrap_err();
        let DashError::MalformedPayload { message, .. } = err else {
            panic!("expected MalformedPayload");
        };
        assert!(message.contains("appId invalid"));
    }

    #[test]
    fn fetch_table_caches_the_payload() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/getStatsData")
                .query_param("statsDataId", "0001");
            then.status(200).json_body(json!({
                "GET_STATS_DATA": {
                    "RESULT": {"STATUS": 0},
                    "STATISTICAL_DATA": {"DATA_INF": {"VALUE": []}}
                }
            }));
        });

        let config = config_for(&server);
        let cache = TtlCache::new(config.cache_ttl);
        let client = EstatClient::new(&config, &cache).unwrap();
        client.fetch_table("0001", 100).unwrap();
        client.fetch_table("0001", 100).unwrap();
        assert_eq!(mock.hits(), 1);
    }

    #[test]
    fn missing_app_id_fails_at_construction() {
        let config = Config::offline(chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let cache = TtlCache::new(config.cache_ttl);
        let err = EstatClient::new(&config, &cache).unwrap_err();
        assert!(matches!(
            err,
            DashError::MissingCredential { name: "ESTAT_APP_ID" }
        ));
    }
}
