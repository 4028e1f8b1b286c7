//! Electricity price reconciliation.

use crate::data::grid::grid_dates;
use crate::domain::{Cell, RawRow};
use crate::io::series::SeriesSource;
use crate::reconcile::{FillPolicy, align_column, dedup_last_wins};

pub const ELECTRICITY_COLUMNS: [&str; 1] = ["price_usd_per_kwh"];

/// Merge the electricity series into every row.
///
/// With a usable table, each month takes its own value, forward- then
/// backward-filled from the nearest known month. Otherwise every row gets
/// `fallback_usd_kwh`.
pub fn reconcile_electricity(rows: &[RawRow], source: &SeriesSource, fallback_usd_kwh: f64) -> Vec<RawRow> {
    let table = match source {
        SeriesSource::Loaded(table) => table,
        SeriesSource::Skipped(reason) => {
            tracing::warn!(%reason, fallback_usd_kwh, "electricity table unusable, using constant price");
            return with_constant_price(rows, fallback_usd_kwh);
        }
        SeriesSource::Absent => {
            tracing::info!(fallback_usd_kwh, "no electricity table, using constant price");
            return with_constant_price(rows, fallback_usd_kwh);
        }
    };

    let Some(column) = table.column_index(ELECTRICITY_COLUMNS[0]) else {
        tracing::warn!(fallback_usd_kwh, "electricity price column not loaded, using constant price");
        return with_constant_price(rows, fallback_usd_kwh);
    };

    let grid = grid_dates(rows);
    let aligned = align_column(&dedup_last_wins(table), column, &grid, FillPolicy::ForwardThenBackward);

    rows.iter()
        .map(|row| {
            let mut out = row.clone();
            out.inputs.electricity_price_usd_kwh = aligned.get(&row.date).cloned().unwrap_or(Cell::Missing);
            out
        })
        .collect()
}

fn with_constant_price(rows: &[RawRow], price: f64) -> Vec<RawRow> {
    rows.iter()
        .map(|row| {
            let mut out = row.clone();
            out.inputs.electricity_price_usd_kwh = Cell::Number(price);
            out
        })
        .collect()
}
