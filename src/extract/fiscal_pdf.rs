//! Fiscal-table extractor for the freight-index PDF.
//!
//! The report tabulates one Japanese fiscal year per line: an era label plus
//! year number (`令和6年度`), followed by up to twelve monthly index values
//! running April → March. The PDF is a print layout, so this works on the
//! extracted text with regular expressions rather than a cell model.
//!
//! Failure policy: an unreadable PDF or a text dump with no recognizable
//! fiscal rows yields an **empty** series. Absent source data is an expected,
//! recoverable condition here — only fetching the bytes can fail hard.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::TimeSeries;

/// The two era labels that appear in the report's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Era {
    Reiwa,
    Heisei,
}

impl Era {
    fn from_label(label: &str) -> Option<Self> {
        match label {
            "令和" => Some(Era::Reiwa),
            "平成" => Some(Era::Heisei),
            _ => None,
        }
    }

    /// Gregorian year in which fiscal year `number` of this era starts
    /// (April). The offsets encode the fixed historical correspondence
    /// era-year-1 → accession year; they are constants, not computed.
    pub fn fiscal_start_year(self, number: i32) -> i32 {
        match self {
            Era::Reiwa => 2018 + number,
            Era::Heisei => 1988 + number,
        }
    }
}

static FISCAL_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(令和|平成)([0-9]{1,2})年度").expect("fiscal row pattern")
});
static NUMERIC_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]+(?:,[0-9]{3})*(?:\.[0-9]+)?").expect("numeric token pattern")
});

/// Extract the index series from raw PDF bytes.
pub fn extract_fiscal_series_from_pdf(bytes: &[u8]) -> TimeSeries {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => extract_fiscal_series(&text),
        Err(err) => {
            tracing::warn!("could not extract text from freight PDF: {err}");
            TimeSeries::empty()
        }
    }
}

/// Scan extracted page text for fiscal-year rows and assemble the series.
pub fn extract_fiscal_series(text: &str) -> TimeSeries {
    let mut observations = Vec::new();
    for raw_line in text.lines() {
        let line = normalize_width(raw_line.trim());
        let Some(caps) = FISCAL_ROW.captures(&line) else {
            continue;
        };
        let Some(era) = Era::from_label(&caps[1]) else {
            continue;
        };
        let Ok(number) = caps[2].parse::<i32>() else {
            continue;
        };
        let start_year = era.fiscal_start_year(number);

        // Index values are reported rightmost; a trailing slice excludes any
        // leading tokens (e.g. a repeated Gregorian year in parentheses).
        let rest = &line[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
        let mut values: Vec<f64> = NUMERIC_TOKEN
            .find_iter(rest)
            .filter_map(|m| m.as_str().replace(',', "").parse().ok())
            .collect();
        if values.len() > 12 {
            values.drain(..values.len() - 12);
        }

        // April-aligned: value i belongs to month April + i of the fiscal
        // year. Short rows contribute only what they have.
        for (offset, value) in values.into_iter().enumerate() {
            let month = 4 + offset as u32;
            let (year, month) = if month <= 12 {
                (start_year, month)
            } else {
                (start_year + 1, month - 12)
            };
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                observations.push((date, value));
            }
        }
    }
    TimeSeries::from_observations(observations)
}

/// Scanned tables frequently come out with full-width digits and
/// punctuation; fold them to ASCII before matching.
fn normalize_width(line: &str) -> String {
    line.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '．' => '.',
            '，' => ',',
            '　' => ' ',
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn era_conversion_is_exact() {
        assert_eq!(Era::Reiwa.fiscal_start_year(7), 2025);
        assert_eq!(Era::Heisei.fiscal_start_year(1), 1989);
        assert_eq!(Era::Reiwa.fiscal_start_year(1), 2019);
        assert_eq!(Era::Heisei.fiscal_start_year(31), 2019);
    }

    #[test]
    fn full_row_wraps_into_the_next_calendar_year() {
        let text = "令和5年度 100.1 101.2 102.3 103.4 104.5 105.6 106.7 107.8 108.9 110.0 111.1 112.2";
        let series = extract_fiscal_series(text);
        assert_eq!(series.len(), 12);

        let points = series.points();
        assert_eq!(points[0], (d(2023, 4), 100.1));
        assert_eq!(points[8], (d(2023, 12), 108.9));
        assert_eq!(points[9], (d(2024, 1), 110.0));
        assert_eq!(points[11], (d(2024, 3), 112.2));
    }

    #[test]
    fn short_row_emits_only_available_months() {
        // A year in progress: nine values, April through December.
        let text = "令和7年度 98.0 98.5 99.0 99.5 100.0 100.5 101.0 101.5 102.0";
        let series = extract_fiscal_series(text);
        assert_eq!(series.len(), 9);
        assert_eq!(series.points()[0], (d(2025, 4), 98.0));
        assert_eq!(series.latest(), Some((d(2025, 12), 102.0)));
    }

    #[test]
    fn leading_tokens_are_excluded_by_the_trailing_slice() {
        // The repeated Gregorian year must not shift the monthly values.
        let text = "令和5年度（2023年度） 100 101 102 103 104 105 106 107 108 109 110 111";
        let series = extract_fiscal_series(text);
        assert_eq!(series.len(), 12);
        assert_eq!(series.points()[0], (d(2023, 4), 100.0));
        assert_eq!(series.latest(), Some((d(2024, 3), 111.0)));
    }

    #[test]
    fn full_width_digits_and_thousands_separators() {
        let text = "令和６年度　１００.５ 1,023.4 99.0";
        let series = extract_fiscal_series(text);
        assert_eq!(
            series.points(),
            &[(d(2024, 4), 100.5), (d(2024, 5), 1023.4), (d(2024, 6), 99.0)]
        );
    }

    #[test]
    fn rows_merge_and_later_rows_win_on_overlap() {
        let text = "\
平成31年度 90 91 92 93 94 95 96 97 98 99 100 101
令和1年度 80 81
";
        // Both rows describe fiscal 2019; the later one overrides Apr/May.
        let series = extract_fiscal_series(text);
        assert_eq!(series.len(), 12);
        assert_eq!(series.points()[0], (d(2019, 4), 80.0));
        assert_eq!(series.points()[1], (d(2019, 5), 81.0));
        assert_eq!(series.points()[2], (d(2019, 6), 92.0));
    }

    #[test]
    fn unrelated_text_yields_empty() {
        let series = extract_fiscal_series("内航船舶輸送統計調査\n月次推移表\n2024年4月");
        assert!(series.is_empty());
    }
}
