//! End-to-end: files on disk in, monthly series CSV out.

use std::fs;
use std::path::Path;

use llm_unit_economics::app::pipeline::run_build;
use llm_unit_economics::domain::BuildConfig;
use llm_unit_economics::error::AppError;
use llm_unit_economics::io::export::write_series_csv;
use tempfile::TempDir;

const HEADER: &str = "date,company,run_rate_revenue_usd,tokens_volume_est_m,mix_mini_pct,mix_flagship_pct,\
gpu_type_mini,gpu_type_flagship,gpu_price_hour_mini,gpu_price_hour_flagship,gpu_power_w_mini,\
gpu_power_w_flagship,throughput_tok_s_mini,throughput_tok_s_flagship,pue,electricity_price_usd_kwh,\
price_per_million_tokens_usd,cost_per_million_tokens_usd,gross_margin_pct,break_even_lite_usd,\
break_even_standard_usd,break_even_pro_usd";

fn config(dir: &Path, start: &str, end: &str) -> BuildConfig {
    BuildConfig {
        start: start.to_string(),
        end: end.to_string(),
        out: dir.join("out").join("series.csv"),
        eia_prices: Some(dir.join("eia.csv")),
        gpu_overrides: Some(dir.join("gpu.csv")),
        scenario: None,
    }
}

fn build_and_write(config: &BuildConfig) -> Result<(), AppError> {
    let run = run_build(config)?;
    write_series_csv(&config.out, &run.rows)
}

fn read_output(path: &Path) -> Vec<csv::StringRecord> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    assert_eq!(reader.headers().unwrap().iter().collect::<Vec<_>>().join(","), HEADER);
    reader.records().map(|r| r.unwrap()).collect()
}

fn column(records: &[csv::StringRecord], idx: usize) -> Vec<String> {
    records.iter().map(|r| r[idx].to_string()).collect()
}

#[test]
fn no_external_files_gives_four_default_rows() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), "2024-01", "2024-02");

    build_and_write(&config).unwrap();
    let records = read_output(&config.out);

    assert_eq!(records.len(), 4);
    assert_eq!(column(&records, 0), vec!["2024-01-01", "2024-01-01", "2024-02-01", "2024-02-01"]);
    assert_eq!(column(&records, 1), vec!["OpenAI", "Anthropic", "OpenAI", "Anthropic"]);

    for r in &records {
        assert_eq!(&r[2], "");
        assert_eq!(&r[6], "L4");
        assert_eq!(&r[7], "H100");
        assert_eq!(r[15].parse::<f64>().unwrap(), 0.132);
        assert_eq!(&r[16], "");
        assert_eq!(&r[18], "");
    }
    // Inputs are company-independent, so is the cost.
    assert_eq!(records[0][17], records[1][17]);
    assert_eq!(records[2][17], records[3][17]);

    let lite: f64 = records[0][19].parse().unwrap();
    let standard: f64 = records[0][20].parse().unwrap();
    let pro: f64 = records[0][21].parse().unwrap();
    assert!(lite < standard && standard < pro);
}

#[test]
fn external_tables_are_reconciled() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(
        dir.join("eia.csv"),
        "date,price_usd_per_kwh,sector\n2024-06,0.14,commercial\n202401,0.12,commercial\n2024-01-01,0.125,commercial\nQ3-2024,0.99,commercial\n",
    )
    .unwrap();
    fs::write(dir.join("gpu.csv"), "date,H100,L4\n2024-03,\"2,49\",€0.55\n").unwrap();

    let config = config(dir, "2023-12", "2024-07");
    build_and_write(&config).unwrap();
    let records = read_output(&config.out);
    assert_eq!(records.len(), 16);

    let by_month = |month: &str| -> Vec<&csv::StringRecord> {
        records.iter().filter(|r| r[0].starts_with(month)).collect()
    };
    let elec = |month: &str| by_month(month)[0][15].parse::<f64>().unwrap();

    // Duplicate January: the later row wins. December is back-filled.
    assert_eq!(elec("2023-12"), 0.125);
    assert_eq!(elec("2024-01"), 0.125);
    assert_eq!(elec("2024-05"), 0.125);
    assert_eq!(elec("2024-06"), 0.14);
    assert_eq!(elec("2024-07"), 0.14);

    let gpu = |month: &str| {
        let r = by_month(month)[1];
        (r[8].parse::<f64>().unwrap(), r[9].parse::<f64>().unwrap())
    };
    assert_eq!(gpu("2024-02"), (0.80, 3.00));
    assert_eq!(gpu("2024-03"), (0.55, 2.49));
    assert_eq!(gpu("2024-07"), (0.55, 2.49));
}

#[test]
fn malformed_electricity_table_uses_constant() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("eia.csv"), "month,price\n2024-01,0.2\n").unwrap();
    fs::write(dir.join("gpu.csv"), "date,H100\n2024-01,1.0\n").unwrap();

    let config = config(dir, "2024-01", "2024-03");
    build_and_write(&config).unwrap();
    let records = read_output(&config.out);

    assert!(records.iter().all(|r| r[15].parse::<f64>().unwrap() == 0.132));
    // GPU table lacks `L4`, so overrides are skipped entirely.
    assert!(records.iter().all(|r| r[9].parse::<f64>().unwrap() == 3.00));
}

#[test]
fn null_marker_months_keep_last_known_prices() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("eia.csv"), "date,price_usd_per_kwh\n2024-01,0.10\n2024-02,N/A\n").unwrap();
    fs::write(dir.join("gpu.csv"), "date,H100,L4\n2024-01,2.50,0.60\n2024-02,NA,NA\n").unwrap();

    let config = config(dir, "2024-01", "2024-03");
    build_and_write(&config).unwrap();
    let records = read_output(&config.out);

    for r in &records {
        assert_eq!(r[15].parse::<f64>().unwrap(), 0.10, "electricity on {}", &r[0]);
        assert_eq!(r[9].parse::<f64>().unwrap(), 2.50, "H100 on {}", &r[0]);
        assert_eq!(r[8].parse::<f64>().unwrap(), 0.60, "L4 on {}", &r[0]);
    }
}

#[test]
fn lowercase_gpu_headers_are_not_recognized() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("gpu.csv"), "date,h100,l4\n2024-01,2.50,0.60\n").unwrap();

    let config = config(dir, "2024-01", "2024-01");
    build_and_write(&config).unwrap();
    let records = read_output(&config.out);

    assert!(records.iter().all(|r| r[9].parse::<f64>().unwrap() == 3.00));
    assert!(records.iter().all(|r| r[8].parse::<f64>().unwrap() == 0.80));
}

#[test]
fn zero_throughput_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path();
    fs::write(dir.join("scenario.json"), r#"{ "assumptions": { "throughput_tok_s_flagship": 0 } }"#).unwrap();

    let mut config = config(dir, "2024-01", "2024-02");
    config.scenario = Some(dir.join("scenario.json"));

    let err = build_and_write(&config).unwrap_err();
    assert!(matches!(err, AppError::Domain { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(!config.out.exists());
}

#[test]
fn inverted_range_is_configuration_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = config(temp_dir.path(), "2024-05", "2024-01");

    let err = build_and_write(&config).unwrap_err();
    assert!(matches!(err, AppError::Configuration(_)));
    assert_eq!(err.exit_code(), 2);
    assert!(!config.out.exists());
}
