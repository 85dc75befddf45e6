//! Command-line parsing for the cost dashboard.
//!
//! Argument parsing and command dispatch stay separate from the fetching and
//! extraction code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "costdash",
    version,
    about = "Input-cost dashboard: copper / aluminum / freight / wages"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch all sources and print the dashboard to the terminal.
    Report(FetchArgs),
    /// Fetch all sources and write the Excel report (and optionally a CSV
    /// of the converted metal series).
    Export(ExportArgs),
}

/// Options shared by every fetching command.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// First month fetched from every source.
    #[arg(long, default_value = "2018-01-01")]
    pub start: NaiveDate,

    /// Listing page scanned for the freight-index PDF. Falls back to
    /// FREIGHT_LISTING_URL in the environment; without either, the freight
    /// section is skipped.
    #[arg(long)]
    pub freight_listing: Option<String>,

    /// Search keyword used to locate the labor-statistics table.
    #[arg(long, default_value = "毎月勤労統計調査")]
    pub labor_keyword: String,

    /// Statistics code restricting the labor table search.
    #[arg(long)]
    pub labor_stats_code: Option<String>,

    /// Industry label filter (substring match) for the labor series.
    #[arg(long, default_value = "製造業")]
    pub labor_industry: String,

    /// Item label filter (substring match) for the labor series.
    #[arg(long, default_value = "現金給与総額")]
    pub labor_item: String,

    /// Skip the labor-statistics section.
    #[arg(long)]
    pub no_labor: bool,

    /// Skip the freight-index section.
    #[arg(long)]
    pub no_freight: bool,

    /// Number of recent months shown in the terminal table.
    #[arg(long, default_value_t = 12)]
    pub rows: usize,
}

/// Options for the export command.
#[derive(Debug, Parser)]
pub struct ExportArgs {
    #[command(flatten)]
    pub fetch: FetchArgs,

    /// Output workbook path.
    #[arg(long, default_value = "cost_report.xlsx")]
    pub out: PathBuf,

    /// Also write the converted metal series to this CSV path.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}
