//! GPU hourly price overrides.
//!
//! The override table carries one column per GPU model: `H100` feeds the
//! flagship tier and `L4` the mini tier. Overrides are forward-filled only, so
//! months before the first recorded override keep the row's own price.

use crate::data::grid::grid_dates;
use crate::domain::{Cell, RawRow, Tier};
use crate::io::series::SeriesSource;
use crate::reconcile::{FillPolicy, align_column, dedup_last_wins};

/// Override columns and the tier each one prices.
pub const GPU_OVERRIDE_COLUMNS: [(&str, Tier); 2] = [("H100", Tier::Flagship), ("L4", Tier::Mini)];

pub fn override_column_names() -> [&'static str; 2] {
    GPU_OVERRIDE_COLUMNS.map(|(name, _)| name)
}

/// Overwrite hourly prices where the aligned override is present.
pub fn reconcile_gpu_overrides(rows: &[RawRow], source: &SeriesSource) -> Vec<RawRow> {
    let table = match source {
        SeriesSource::Loaded(table) => table,
        SeriesSource::Skipped(reason) => {
            tracing::warn!(%reason, "GPU override table unusable, keeping default hourly prices");
            return rows.to_vec();
        }
        SeriesSource::Absent => {
            tracing::info!("no GPU override table, keeping default hourly prices");
            return rows.to_vec();
        }
    };

    let grid = grid_dates(rows);
    let series = dedup_last_wins(table);
    let mut aligned = Vec::with_capacity(GPU_OVERRIDE_COLUMNS.len());
    for (name, tier) in GPU_OVERRIDE_COLUMNS {
        match table.column_index(name) {
            Some(column) => aligned.push((tier, align_column(&series, column, &grid, FillPolicy::ForwardOnly))),
            None => tracing::warn!(column = name, "GPU override column not loaded, keeping default hourly prices"),
        }
    }

    let mut overridden = 0usize;
    let out: Vec<RawRow> = rows
        .iter()
        .map(|row| {
            let mut out = row.clone();
            for (tier, column) in &aligned {
                if let Some(cell) = column.get(&row.date).filter(|c| !c.is_missing()) {
                    out.inputs.tier_mut(*tier).gpu_price_hour = cell.clone();
                    overridden += 1;
                }
            }
            out
        })
        .collect();

    tracing::debug!(overridden, "applied GPU hourly price overrides");
    out
}
