//! Write the monthly series CSV.
//!
//! The column set and order are fixed; see `OutputRecord`. Rows are written to
//! a sibling temporary file and renamed into place once complete, so a failed
//! run never leaves a partial output behind.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{Company, CostedRow};
use crate::error::AppError;

/// One output line. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord<'a> {
    pub date: NaiveDate,
    pub company: Company,
    pub run_rate_revenue_usd: Option<f64>,
    pub tokens_volume_est_m: Option<f64>,
    pub mix_mini_pct: f64,
    pub mix_flagship_pct: f64,
    pub gpu_type_mini: &'a str,
    pub gpu_type_flagship: &'a str,
    pub gpu_price_hour_mini: f64,
    pub gpu_price_hour_flagship: f64,
    pub gpu_power_w_mini: f64,
    pub gpu_power_w_flagship: f64,
    pub throughput_tok_s_mini: f64,
    pub throughput_tok_s_flagship: f64,
    pub pue: f64,
    pub electricity_price_usd_kwh: f64,
    /// Reserved for manual annotation; always empty.
    pub price_per_million_tokens_usd: Option<f64>,
    pub cost_per_million_tokens_usd: f64,
    /// Reserved for manual annotation; always empty.
    pub gross_margin_pct: Option<f64>,
    pub break_even_lite_usd: f64,
    pub break_even_standard_usd: f64,
    pub break_even_pro_usd: f64,
}

impl<'a> From<&'a CostedRow> for OutputRecord<'a> {
    fn from(costed: &'a CostedRow) -> Self {
        let row = &costed.row;
        let inputs = &row.inputs;
        let costs = &costed.costs;
        Self {
            date: row.date,
            company: row.company,
            run_rate_revenue_usd: row.run_rate_revenue_usd,
            tokens_volume_est_m: row.tokens_volume_est_m,
            mix_mini_pct: inputs.mix_mini_pct,
            mix_flagship_pct: inputs.mix_flagship_pct,
            gpu_type_mini: &inputs.mini.gpu_type,
            gpu_type_flagship: &inputs.flagship.gpu_type,
            gpu_price_hour_mini: inputs.mini.gpu_price_hour,
            gpu_price_hour_flagship: inputs.flagship.gpu_price_hour,
            gpu_power_w_mini: inputs.mini.gpu_power_w,
            gpu_power_w_flagship: inputs.flagship.gpu_power_w,
            throughput_tok_s_mini: inputs.mini.throughput_tok_s,
            throughput_tok_s_flagship: inputs.flagship.throughput_tok_s,
            pue: inputs.pue,
            electricity_price_usd_kwh: inputs.electricity_price_usd_kwh,
            price_per_million_tokens_usd: None,
            cost_per_million_tokens_usd: costs.cost_per_million_tokens_usd,
            gross_margin_pct: None,
            break_even_lite_usd: costs.break_even_lite_usd,
            break_even_standard_usd: costs.break_even_standard_usd,
            break_even_pro_usd: costs.break_even_pro_usd,
        }
    }
}

/// Write all rows to `path`, creating the parent directory if needed.
pub fn write_series_csv(path: &Path, rows: &[CostedRow]) -> Result<(), AppError> {
    let written = write_records_csv(path, rows.iter().map(OutputRecord::from))?;
    tracing::info!(path = %path.display(), rows = written, "wrote monthly series");
    Ok(())
}

/// Serialize `records` to a CSV at `path` with a header from the first record.
///
/// The parent directory is created if needed. Rows go to a sibling temporary
/// file that replaces `path` only once every row is written. Returns the
/// number of rows written.
pub fn write_records_csv<T, I>(path: &Path, records: I) -> Result<usize, AppError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::io(format!("Failed to create output directory '{}'", dir.display()), e))?;
    }

    let tmp = temp_path(path);
    let written = match write_rows(&tmp, records) {
        Ok(n) => n,
        Err(err) => {
            let _ = fs::remove_file(&tmp);
            return Err(err);
        }
    };
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::io(format!("Failed to move output into '{}'", path.display()), e)
    })?;
    Ok(written)
}

fn write_rows<T: Serialize>(path: &Path, records: impl IntoIterator<Item = T>) -> Result<usize, AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create output CSV '{}'", path.display()), e))?;
    let mut writer = csv::Writer::from_writer(file);
    let mut written = 0usize;
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| AppError::io(format!("Failed to write row {} of '{}'", written + 1, path.display()), e.into()))?;
        written += 1;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush '{}'", path.display()), e))?;
    Ok(written)
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
