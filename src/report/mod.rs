//! Reporting: per-section outcomes and formatted terminal output.
//!
//! Fetch/extract layers return data or typed errors; everything about *how*
//! a result is shown — including how emptiness and per-section failures are
//! worded — lives here, so one source's failure renders as a scoped message
//! instead of blanking the whole dashboard.

use chrono::{DateTime, Local};

use crate::domain::{MasterTable, SummaryRow};
use crate::error::DashError;

pub mod chart;
pub mod csv;
pub mod workbook;

/// What happened to one source section during a run.
#[derive(Debug)]
pub enum SectionOutcome {
    /// Data fetched and extracted; `months` observations contributed.
    Ready { months: usize },
    /// The source was reachable but legitimately produced nothing. Valid
    /// input for downstream joins, not a failure.
    Empty { note: String },
    /// The section was not attempted (disabled, or missing optional
    /// credential/configuration).
    Skipped { reason: String },
    /// The section failed; the error stayed local to the section.
    Failed { error: DashError },
}

#[derive(Debug)]
pub struct SectionReport {
    pub name: &'static str,
    pub outcome: SectionOutcome,
}

/// Everything a render pass produces.
#[derive(Debug)]
pub struct DashboardData {
    pub master: MasterTable,
    pub summary: Vec<SummaryRow>,
    pub sections: Vec<SectionReport>,
    pub generated_at: DateTime<Local>,
}

/// Format the full terminal dashboard: KPI block, section statuses, the
/// recent-months table, and the fixed source links.
pub fn format_dashboard(data: &DashboardData, recent_rows: usize, source_links: &[String]) -> String {
    let mut out = String::new();

    out.push_str("=== costdash — input-cost dashboard ===\n");
    out.push_str(&format!(
        "Generated: {}\n",
        data.generated_at.format("%Y-%m-%d %H:%M")
    ));
    if let Some(month) = data.master.latest_month() {
        out.push_str(&format!("Latest month: {}\n", month.format("%Y-%m")));
    }
    out.push('\n');

    if data.summary.is_empty() {
        out.push_str("No data in any series.\n");
    } else {
        for row in &data.summary {
            let delta = match row.delta {
                Some(d) => format!("{}{}", if d < 0.0 { "-" } else { "+" }, fmt_value(d.abs())),
                None => "n/a".to_string(),
            };
            out.push_str(&format!(
                "{:<18} {:>12} ({})  Δ {}\n",
                row.name,
                fmt_value(row.latest),
                row.latest_month.format("%Y-%m"),
                delta,
            ));
        }
    }

    out.push_str("\nSections:\n");
    for section in &data.sections {
        let line = match &section.outcome {
            SectionOutcome::Ready { months } => format!("ok, {months} months"),
            SectionOutcome::Empty { note } => format!("no data — {note}"),
            SectionOutcome::Skipped { reason } => format!("skipped — {reason}"),
            SectionOutcome::Failed { error } => format!("FAILED — {error}"),
        };
        out.push_str(&format!("* {}: {line}\n", section.name));
    }

    out.push_str(&format_recent_table(&data.master, recent_rows));

    if !source_links.is_empty() {
        out.push_str("\nSources:\n");
        for link in source_links {
            out.push_str(&format!("- {link}\n"));
        }
    }

    out
}

fn format_recent_table(master: &MasterTable, recent_rows: usize) -> String {
    if master.is_empty() || recent_rows == 0 {
        return String::new();
    }
    let mut out = String::new();

    out.push_str("\nRecent months:\n");
    out.push_str(&format!("{:<8}", "month"));
    for column in master.columns() {
        out.push_str(&format!(" {:>16}", column.name));
    }
    out.push('\n');

    let first = master.months().len().saturating_sub(recent_rows);
    for row in first..master.months().len() {
        out.push_str(&format!("{:<8}", master.months()[row].format("%Y-%m")));
        for column in master.columns() {
            match column.values[row] {
                Some(v) => out.push_str(&format!(" {:>16}", fmt_value(v))),
                None => out.push_str(&format!(" {:>16}", "")),
            }
        }
        out.push('\n');
    }

    out
}

/// One decimal, thousands-separated: `1445.23` → `"1,445.2"`.
fn fmt_value(v: f64) -> String {
    let formatted = format!("{:.1}", v.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "0"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
