//! Labeled-dimension extractor for statistics-API payloads.
//!
//! The payload carries classification axes (code → human label per axis) and
//! observation records tagged with category codes. The classification schema
//! differs per statistical table and is not known in advance, so filtering is
//! a *fuzzy* label match, not an exact schema lookup.
//!
//! Known limitation, kept on purpose: a filter collects matching codes from
//! **every** axis, and a record is accepted if *any* of its codes is in the
//! collected set. When a label substring matches codes on several distinct
//! axes this can over-match. Tightening it to per-axis scoping could silently
//! hide data that matched before, so the behavior stays as-is.

use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;

use crate::domain::TimeSeries;

/// Predicate over human-readable classification labels.
#[derive(Debug, Clone)]
pub enum LabelFilter {
    /// Label contains the given fragment. The default.
    Substring(String),
    /// Label equals the given string exactly.
    Exact(String),
    /// Label matches the given regex.
    Pattern(Regex),
}

impl LabelFilter {
    pub fn substring(fragment: impl Into<String>) -> Self {
        LabelFilter::Substring(fragment.into())
    }

    pub fn matches(&self, label: &str) -> bool {
        match self {
            LabelFilter::Substring(fragment) => label.contains(fragment.as_str()),
            LabelFilter::Exact(expected) => label == expected,
            LabelFilter::Pattern(regex) => regex.is_match(label),
        }
    }
}

/// Extract a monthly series from a statistics-API data payload.
///
/// Either filter may be `None`, meaning no restriction on that dimension.
/// A payload without the statistical-data root yields an **empty** series —
/// the caller decides whether empty is fatal.
pub fn extract_labeled_series(
    payload: &Value,
    industry: Option<&LabelFilter>,
    item: Option<&LabelFilter>,
) -> TimeSeries {
    let Some(root) = payload.pointer("/GET_STATS_DATA/STATISTICAL_DATA") else {
        return TimeSeries::empty();
    };

    let industry_codes = collect_matching_codes(root, industry);
    let item_codes = collect_matching_codes(root, item);

    let mut observations = Vec::new();
    for record in as_list(root.pointer("/DATA_INF/VALUE")) {
        let Some(fields) = record.as_object() else {
            continue;
        };

        let codes: Vec<&str> = fields
            .iter()
            .filter(|(key, _)| key.starts_with("@cat"))
            .filter_map(|(_, v)| v.as_str())
            .collect();

        let industry_ok = match &industry_codes {
            None => true,
            Some(set) => codes.iter().any(|c| set.contains(*c)),
        };
        let item_ok = match &item_codes {
            None => true,
            Some(set) => codes.iter().any(|c| set.contains(*c)),
        };
        if !(industry_ok && item_ok) {
            continue;
        }

        let Some(value) = fields.get("$").and_then(parse_numeric) else {
            continue;
        };
        let Some(date) = fields
            .get("@time")
            .and_then(Value::as_str)
            .and_then(parse_time_label)
        else {
            continue;
        };
        observations.push((date, value));
    }

    TimeSeries::from_observations(observations)
}

/// Codes whose label matches `filter`, from every classification axis.
/// `None` filter means "no restriction" and is passed through.
fn collect_matching_codes(root: &Value, filter: Option<&LabelFilter>) -> Option<HashSet<String>> {
    let filter = filter?;
    let mut codes = HashSet::new();
    for axis in as_list(root.pointer("/CLASS_INF/CLASS_OBJ")) {
        for class in as_list(axis.get("CLASS")) {
            let (Some(code), Some(label)) = (
                class.get("@code").and_then(Value::as_str),
                class.get("@name").and_then(Value::as_str),
            ) else {
                continue;
            };
            if filter.matches(label) {
                codes.insert(code.to_string());
            }
        }
    }
    Some(codes)
}

/// The API collapses single-element lists into bare objects; treat both the
/// same.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(single) => vec![single],
    }
}

/// Observation values arrive as strings (missing encoded as `-` or similar);
/// the occasional numeric literal is accepted too.
fn parse_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Parse a time label with a prioritized format list, then generic
/// fallbacks. Returns the first day of the labeled month.
pub fn parse_time_label(label: &str) -> Option<NaiveDate> {
    let s = label.trim();

    // YYYYMM
    if s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = s[..4].parse().ok()?;
        let month: u32 = s[4..].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    // YYYY-MM
    if s.len() == 7 && s.is_ascii() && s.as_bytes()[4] == b'-' {
        let parsed = (s[..4].parse::<i32>(), s[5..].parse::<u32>());
        if let (Ok(year), Ok(month)) = parsed {
            return NaiveDate::from_ymd_opt(year, month, 1);
        }
    }
    // YYYY-MM-DD, then generic fallbacks seen in the wild.
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y年%m月%d日"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    // Month-only Japanese labels need a day appended for chrono.
    NaiveDate::parse_from_str(&format!("{s}1日"), "%Y年%m月%d日").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "GET_STATS_DATA": {
                "STATISTICAL_DATA": {
                    "CLASS_INF": {
                        "CLASS_OBJ": [
                            {
                                "@id": "cat01",
                                "@name": "industry",
                                "CLASS": [
                                    {"@code": "TM", "@name": "製造業"},
                                    {"@code": "TC", "@name": "建設業"}
                                ]
                            },
                            {
                                "@id": "cat02",
                                "@name": "item",
                                // Single-element axis collapsed to an object.
                                "CLASS": {"@code": "W1", "@name": "現金給与総額"}
                            }
                        ]
                    },
                    "DATA_INF": {
                        "VALUE": [
                            {"@time": "202401", "@cat01": "TM", "@cat02": "W1", "$": "311.5"},
                            {"@time": "202402", "@cat01": "TM", "@cat02": "W1", "$": "295.0"},
                            {"@time": "202402", "@cat01": "TC", "@cat02": "W1", "$": "999.0"},
                            {"@time": "202403", "@cat01": "TM", "@cat02": "W1", "$": "-"},
                            {"@time": "bogus", "@cat01": "TM", "@cat02": "W1", "$": "1.0"}
                        ]
                    }
                }
            }
        })
    }

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn missing_root_returns_empty_not_error() {
        let series = extract_labeled_series(&json!({"ERROR": "bad appId"}), None, None);
        assert!(series.is_empty());
    }

    #[test]
    fn substring_filters_select_records() {
        let industry = LabelFilter::substring("製造");
        let item = LabelFilter::substring("給与");
        let series = extract_labeled_series(&payload(), Some(&industry), Some(&item));

        // Non-numeric and unparsable-time records are dropped; the 建設業
        // record is filtered out.
        assert_eq!(
            series.points(),
            &[(d(2024, 1), 311.5), (d(2024, 2), 295.0)]
        );
    }

    #[test]
    fn absent_filters_mean_no_restriction() {
        let series = extract_labeled_series(&payload(), None, None);
        // 202402 appears twice; the later record (建設業) wins.
        assert_eq!(
            series.points(),
            &[(d(2024, 1), 311.5), (d(2024, 2), 999.0)]
        );
    }

    #[test]
    fn codes_match_across_axes() {
        // "W1" lives on the item axis, but a record carrying it satisfies an
        // *industry* filter whose substring matches that label. Documented
        // over-match, preserved.
        let industry = LabelFilter::substring("現金給与");
        let series = extract_labeled_series(&payload(), Some(&industry), None);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn exact_and_pattern_filters() {
        assert!(LabelFilter::Exact("製造業".into()).matches("製造業"));
        assert!(!LabelFilter::Exact("製造".into()).matches("製造業"));
        let pattern = LabelFilter::Pattern(Regex::new("^製造").unwrap());
        assert!(pattern.matches("製造業"));
        assert!(!pattern.matches("非製造業"));
    }

    #[test]
    fn time_label_formats() {
        assert_eq!(parse_time_label("202407"), Some(d(2024, 7)));
        assert_eq!(parse_time_label("2024-07"), Some(d(2024, 7)));
        assert_eq!(
            parse_time_label("2024-07-15"),
            NaiveDate::from_ymd_opt(2024, 7, 15)
        );
        assert_eq!(
            parse_time_label("2024/07/15"),
            NaiveDate::from_ymd_opt(2024, 7, 15)
        );
        assert_eq!(parse_time_label("2024年7月"), Some(d(2024, 7)));
        assert_eq!(parse_time_label("202413"), None);
        assert_eq!(parse_time_label("quarterly"), None);
    }
}
