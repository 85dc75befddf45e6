//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - assembles the runtime configuration from the environment
//! - runs the fetch/extract/join pipeline
//! - prints the dashboard or writes the export artifacts

use clap::Parser;

use crate::cli::{Command, ExportArgs, FetchArgs};
use crate::config::Config;
use crate::error::DashError;
use crate::extract::LabelFilter;

pub mod pipeline;

use pipeline::RunOptions;

/// Entry point for the `costdash` binary.
pub fn run() -> Result<(), DashError> {
    init_tracing();

    // `costdash` and `costdash --rows 6` should behave like
    // `costdash report ...`. Clap requires a subcommand name, so we do a
    // small, explicit rewrite of the argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Export(args) => handle_export(args),
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_report(args: FetchArgs) -> Result<(), DashError> {
    let (config, options) = resolve(&args);
    let data = pipeline::run_dashboard(&config, &options)?;
    println!(
        "{}",
        crate::report::format_dashboard(&data, args.rows, &pipeline::source_links(&config))
    );
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), DashError> {
    let (config, options) = resolve(&args.fetch);
    let data = pipeline::run_dashboard(&config, &options)?;

    let charts = crate::report::chart::render_chart_set(&data.master)?;
    crate::report::workbook::write_workbook(&args.out, &data.master, &charts)?;
    println!("wrote {}", args.out.display());

    if let Some(csv_path) = &args.csv {
        crate::report::csv::write_master_csv(
            csv_path,
            &data.master,
            &[pipeline::COL_COPPER, pipeline::COL_ALUMINUM],
        )?;
        println!("wrote {}", csv_path.display());
    }

    for (_, chart_path) in &charts {
        std::fs::remove_file(chart_path).ok();
    }
    Ok(())
}

/// Turn CLI flags + environment into the pipeline inputs.
fn resolve(args: &FetchArgs) -> (Config, RunOptions) {
    let mut config = Config::from_env(args.start);
    if let Some(listing) = &args.freight_listing {
        config.freight_listing_url = listing.clone();
    }

    let options = RunOptions {
        labor_keyword: args.labor_keyword.clone(),
        labor_stats_code: args.labor_stats_code.clone(),
        labor_industry: LabelFilter::substring(&args.labor_industry),
        labor_item: LabelFilter::substring(&args.labor_item),
        include_labor: !args.no_labor,
        include_freight: !args.no_freight,
    };
    (config, options)
}

/// Rewrite argv so `costdash` defaults to `costdash report`.
///
/// Rules:
/// - `costdash`                     -> `costdash report`
/// - `costdash --rows 6 ...`        -> `costdash report --rows 6 ...`
/// - `costdash --help/--version`    -> unchanged (top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "export");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    argv
}
