//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - runs the build pipeline and writes the CSV
//! - prints the operator summary
//! - runs the optional EIA and Vast.ai fetches

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BuildArgs, Command, FetchEiaArgs, FetchVastArgs};
use crate::data::eia::{EiaClient, write_prices_csv};
use crate::data::vast::{VastClient, current_fetch_month, offer_rows, write_offers_csv};
use crate::data::grid::{month_range, parse_month};
use crate::domain::BuildConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `llm-econ` binary.
pub fn run() -> Result<(), AppError> {
    init_tracing();

    // `llm-econ --start ... --end ... --out ...` behaves like `llm-econ build ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Build(args) => handle_build(args),
        Command::FetchEia(args) => handle_fetch_eia(args),
        Command::FetchVast(args) => handle_fetch_vast(args),
    }
}

fn init_tracing() {
    // Logs go to stderr; stdout carries only the summary.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_build(args: BuildArgs) -> Result<(), AppError> {
    let config = build_config_from_args(&args);
    let run = pipeline::run_build(&config)?;

    crate::io::export::write_series_csv(&config.out, &run.rows)?;

    println!(
        "{}",
        crate::report::format_build_summary(&run.rows, &run.coercion, &config.out)
    );
    Ok(())
}

fn handle_fetch_eia(args: FetchEiaArgs) -> Result<(), AppError> {
    // Validate the range locally before spending a request on it.
    month_range(parse_month(&args.start)?, parse_month(&args.end)?)?;

    let client = EiaClient::from_env()?;
    let rows = client.fetch_commercial_prices(args.start.trim(), args.end.trim())?;
    write_prices_csv(&args.out, &rows)?;

    println!("Wrote {} rows to {}", rows.len(), args.out.display());
    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        println!("First: {} {}", first.date, first.price_usd_per_kwh);
        println!("Last : {} {}", last.date, last.price_usd_per_kwh);
    }
    Ok(())
}

fn handle_fetch_vast(args: FetchVastArgs) -> Result<(), AppError> {
    let client = VastClient::from_env()?;
    let snapshot = client.fetch_offers()?;
    let rows = offer_rows(&snapshot, &current_fetch_month());
    write_offers_csv(&args.out, &rows)?;

    println!("Endpoint OK: {}", snapshot.source_url);
    println!("Wrote {} rows to {}", rows.len(), args.out.display());
    Ok(())
}

pub fn build_config_from_args(args: &BuildArgs) -> BuildConfig {
    BuildConfig {
        start: args.start.clone(),
        end: args.end.clone(),
        out: args.out.clone(),
        eia_prices: Some(args.eia_prices.clone()),
        gpu_overrides: Some(args.gpu_overrides.clone()),
        scenario: args.scenario.clone(),
    }
}

/// Rewrite argv so flags without a subcommand mean `build`.
///
/// Rules:
/// - `llm-econ --start ...`         -> `llm-econ build --start ...`
/// - `llm-econ --help/--version/-h` -> unchanged (show top-level help/version)
/// - `llm-econ`                     -> unchanged (clap prints usage)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "build".to_string());
    }
    argv
}
