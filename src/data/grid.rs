//! Canonical monthly grid.
//!
//! One row per first-of-month date in `[start, end]` per configured company,
//! seeded with baseline defaults. Rows are ordered by date, then by the
//! company order in the assumptions.

use chrono::{Datelike, Months, NaiveDate};

use crate::domain::{EconomicAssumptions, RawRow};
use crate::error::AppError;

/// Parse a strict `YYYY-MM` month into its first day.
pub fn parse_month(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    let well_formed = raw.len() == 7
        && raw.as_bytes()[4] == b'-'
        && raw.bytes().enumerate().all(|(i, b)| i == 4 || b.is_ascii_digit());
    if !well_formed {
        return Err(AppError::config(format!("Invalid month '{raw}'. Expected YYYY-MM.")));
    }
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::config(format!("Invalid month '{raw}'. Expected YYYY-MM.")))
}

/// Every first-of-month date from `start` to `end`, inclusive.
pub fn month_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
    let start = start.with_day(1).unwrap_or(start);
    if end < start {
        return Err(AppError::config(format!(
            "End month {} precedes start month {}.",
            end.format("%Y-%m"),
            start.format("%Y-%m")
        )));
    }

    let mut months = Vec::new();
    let mut current = start;
    while current <= end {
        months.push(current);
        current = current
            .checked_add_months(Months::new(1))
            .ok_or_else(|| AppError::config("Month range exceeds the supported calendar."))?;
    }
    Ok(months)
}

/// Build the default-populated grid for `YYYY-MM` bounds.
pub fn build_grid(start: &str, end: &str, assumptions: &EconomicAssumptions) -> Result<Vec<RawRow>, AppError> {
    let months = month_range(parse_month(start)?, parse_month(end)?)?;
    let inputs = assumptions.grid_inputs();

    let mut rows = Vec::with_capacity(months.len() * assumptions.companies.len());
    for &date in &months {
        for &company in &assumptions.companies {
            rows.push(RawRow {
                date,
                company,
                run_rate_revenue_usd: None,
                tokens_volume_est_m: None,
                inputs: inputs.clone(),
            });
        }
    }

    tracing::debug!(months = months.len(), rows = rows.len(), "built monthly grid");
    Ok(rows)
}

/// Distinct grid dates, ascending.
pub fn grid_dates(rows: &[RawRow]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    dates.sort();
    dates.dedup();
    dates
}
