//! Series reconciliation: align external monthly series onto the grid.
//!
//! Shared workflow for every source:
//! normalize date tokens -> drop rejected -> last-wins dedup -> reindex onto
//! grid months -> fill gaps -> merge into rows.
//!
//! Each stage takes the current rows by reference and returns a new table.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::Cell;
use crate::io::series::ExternalTable;

pub mod dates;
pub mod electricity;
pub mod gpu;

pub use dates::{NormalizedDate, normalize_month_token};
pub use electricity::reconcile_electricity;
pub use gpu::reconcile_gpu_overrides;

/// How gaps are filled after reindexing onto the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// Forward fill, then backward fill to cover leading gaps.
    ForwardThenBackward,
    /// Forward fill only; leading gaps stay missing.
    ForwardOnly,
}

/// A value column aligned 1:1 with the grid months.
pub type AlignedColumn = BTreeMap<NaiveDate, Cell>;

/// Normalize dates and keep one record per date.
///
/// Later records in the file win over earlier ones for the same month.
/// Returns one `Vec<Cell>` per date, in the table's value-column order.
pub fn dedup_last_wins(table: &ExternalTable) -> BTreeMap<NaiveDate, Vec<Cell>> {
    let mut out = BTreeMap::new();
    let mut rejected = 0usize;
    for record in &table.records {
        match normalize_month_token(&record.date_raw).date() {
            Some(date) => {
                out.insert(date, record.values.clone());
            }
            None => {
                rejected += 1;
                tracing::debug!(line = record.line, date = %record.date_raw, "dropping record with unrecognized date");
            }
        }
    }
    if rejected > 0 {
        tracing::info!(rejected, kept = out.len(), "dropped records with unrecognized dates");
    }
    out
}

/// Reindex one value column onto `grid` and fill gaps per `policy`.
///
/// Dates outside the grid are discarded before filling, so they never leak
/// into grid months.
pub fn align_column(
    series: &BTreeMap<NaiveDate, Vec<Cell>>,
    column: usize,
    grid: &[NaiveDate],
    policy: FillPolicy,
) -> AlignedColumn {
    let mut cells: Vec<Cell> = grid
        .iter()
        .map(|date| {
            series
                .get(date)
                .and_then(|values| values.get(column))
                .cloned()
                .unwrap_or(Cell::Missing)
        })
        .collect();

    forward_fill(&mut cells);
    if policy == FillPolicy::ForwardThenBackward {
        backward_fill(&mut cells);
    }

    grid.iter().copied().zip(cells).collect()
}

fn forward_fill(cells: &mut [Cell]) {
    let mut last: Option<Cell> = None;
    for cell in cells.iter_mut() {
        if cell.is_missing() {
            if let Some(prev) = &last {
                *cell = prev.clone();
            }
        } else {
            last = Some(cell.clone());
        }
    }
}

fn backward_fill(cells: &mut [Cell]) {
    let mut next: Option<Cell> = None;
    for cell in cells.iter_mut().rev() {
        if cell.is_missing() {
            if let Some(following) = &next {
                *cell = following.clone();
            }
        } else {
            next = Some(cell.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::series::SeriesRecord;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn table(rows: &[(&str, &str)]) -> ExternalTable {
        ExternalTable {
            value_columns: vec!["v".to_string()],
            records: rows
                .iter()
                .enumerate()
                .map(|(i, (date, v))| SeriesRecord {
                    line: i + 2,
                    date_raw: (*date).to_string(),
                    values: vec![Cell::from_raw(v)],
                })
                .collect(),
        }
    }

    #[test]
    fn later_rows_win_across_date_encodings() {
        let t = table(&[("2024-02", "1"), ("202401", "a"), ("2024-02-01", "2"), ("bogus", "9"), ("2024-01", "b")]);
        let series = dedup_last_wins(&t);
        assert_eq!(series.len(), 2);
        assert_eq!(series[&d(2024, 1)], vec![Cell::Text("b".to_string())]);
        assert_eq!(series[&d(2024, 2)], vec![Cell::Text("2".to_string())]);
    }

    #[test]
    fn forward_then_backward_covers_both_ends() {
        let t = table(&[("2024-02", "x"), ("2024-04", "y")]);
        let grid: Vec<_> = (1..=5).map(|m| d(2024, m)).collect();
        let aligned = align_column(&dedup_last_wins(&t), 0, &grid, FillPolicy::ForwardThenBackward);
        let values: Vec<_> = aligned.values().cloned().collect();
        let x = Cell::Text("x".to_string());
        let y = Cell::Text("y".to_string());
        assert_eq!(values, vec![x.clone(), x.clone(), x, y.clone(), y]);
    }

    #[test]
    fn forward_only_leaves_leading_gap() {
        let t = table(&[("2024-02", "x")]);
        let grid: Vec<_> = (1..=3).map(|m| d(2024, m)).collect();
        let aligned = align_column(&dedup_last_wins(&t), 0, &grid, FillPolicy::ForwardOnly);
        assert!(aligned[&d(2024, 1)].is_missing());
        assert_eq!(aligned[&d(2024, 3)], Cell::Text("x".to_string()));
    }

    #[test]
    fn out_of_grid_values_do_not_fill_grid() {
        let t = table(&[("2023-06", "old")]);
        let grid = vec![d(2024, 1), d(2024, 2)];
        let aligned = align_column(&dedup_last_wins(&t), 0, &grid, FillPolicy::ForwardThenBackward);
        assert!(aligned.values().all(Cell::is_missing));
    }

    #[test]
    fn null_marker_between_known_months_carries_last_value() {
        let t = table(&[("2024-01", "0.10"), ("2024-02", "N/A"), ("2024-03", "NA")]);
        let grid: Vec<_> = (1..=4).map(|m| d(2024, m)).collect();
        let aligned = align_column(&dedup_last_wins(&t), 0, &grid, FillPolicy::ForwardOnly);
        let known = Cell::Text("0.10".to_string());
        assert!(aligned.values().all(|c| *c == known));
    }

    #[test]
    fn blank_cells_are_filled_from_neighbours() {
        let t = table(&[("2024-01", "x"), ("2024-02", "")]);
        let grid = vec![d(2024, 1), d(2024, 2)];
        let aligned = align_column(&dedup_last_wins(&t), 0, &grid, FillPolicy::ForwardOnly);
        assert_eq!(aligned[&d(2024, 2)], Cell::Text("x".to_string()));
    }
}
