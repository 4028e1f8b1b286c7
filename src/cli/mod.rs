//! Command-line parsing.
//!
//! Argument parsing and command dispatch stay separate from the pipeline code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "llm-econ",
    version,
    about = "Monthly LLM unit economics: cost per 1M tokens and break-even prices"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build the monthly series CSV from the grid and any external tables.
    Build(BuildArgs),
    /// Fetch US commercial electricity prices from EIA into the CSV `build` reads.
    ///
    /// Requires `EIA_API_KEY` in the environment (or `.env`).
    FetchEia(FetchEiaArgs),
    /// Snapshot Vast.ai GPU rental offers (H100, H200, A100, L4) into a CSV.
    FetchVast(FetchVastArgs),
}

#[derive(Debug, Args, Clone)]
pub struct BuildArgs {
    /// First month, inclusive (YYYY-MM).
    #[arg(long, value_name = "YYYY-MM")]
    pub start: String,

    /// Last month, inclusive (YYYY-MM).
    #[arg(long, value_name = "YYYY-MM")]
    pub end: String,

    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,

    /// Electricity price table (`date`, `price_usd_per_kwh`).
    #[arg(
        long = "eia_prices",
        visible_alias = "eia-prices",
        value_name = "CSV",
        default_value = "data/eia_electricity_us_commercial.csv"
    )]
    pub eia_prices: PathBuf,

    /// GPU hourly price overrides (`date`, `H100`, `L4`).
    #[arg(
        long = "gpu_overrides",
        visible_alias = "gpu-overrides",
        value_name = "CSV",
        default_value = "data/gpu_hour_overrides.csv"
    )]
    pub gpu_overrides: PathBuf,

    /// Scenario JSON overriding baseline assumptions and adding manual steps.
    #[arg(long, value_name = "JSON")]
    pub scenario: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct FetchEiaArgs {
    /// First month, inclusive (YYYY-MM).
    #[arg(long, value_name = "YYYY-MM")]
    pub start: String,

    /// Last month, inclusive (YYYY-MM).
    #[arg(long, value_name = "YYYY-MM")]
    pub end: String,

    /// Output CSV path.
    #[arg(long, value_name = "CSV", default_value = "data/eia_electricity_us_commercial.csv")]
    pub out: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct FetchVastArgs {
    /// Output CSV path.
    #[arg(long, value_name = "CSV")]
    pub out: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_accepts_underscore_and_kebab_flags() {
        let cli = Cli::try_parse_from([
            "llm-econ", "build", "--start", "2024-01", "--end", "2024-02", "--out", "out.csv",
            "--eia-prices", "e.csv", "--gpu_overrides", "g.csv",
        ])
        .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.eia_prices, PathBuf::from("e.csv"));
        assert_eq!(args.gpu_overrides, PathBuf::from("g.csv"));
        assert_eq!(args.scenario, None);
    }

    #[test]
    fn build_defaults_input_paths() {
        let cli = Cli::try_parse_from(["llm-econ", "build", "--start", "2024-01", "--end", "2024-02", "--out", "o.csv"])
            .unwrap();
        let Command::Build(args) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(args.eia_prices, PathBuf::from("data/eia_electricity_us_commercial.csv"));
        assert_eq!(args.gpu_overrides, PathBuf::from("data/gpu_hour_overrides.csv"));
    }

    #[test]
    fn fetch_vast_requires_out() {
        assert!(Cli::try_parse_from(["llm-econ", "fetch-vast"]).is_err());
        let cli = Cli::try_parse_from(["llm-econ", "fetch-vast", "--out", "data/vast.csv"]).unwrap();
        let Command::FetchVast(args) = cli.command else {
            panic!("expected fetch-vast");
        };
        assert_eq!(args.out, PathBuf::from("data/vast.csv"));
    }

    #[test]
    fn missing_required_flag_fails() {
        assert!(Cli::try_parse_from(["llm-econ", "build", "--start", "2024-01", "--out", "o.csv"]).is_err());
    }
}
