//! Numeric coercion guard.
//!
//! Runs after reconciliation and before the cost calculator. Every designated
//! numeric column is forced to a number: text is cleaned (currency symbols,
//! spaces, comma decimal separator) and parsed. Cells that still fail, and
//! cells reconciliation left missing, take the row defaults.
//!
//! Order matters: coercion first, defaults second, so a failed parse ends up
//! defaulted instead of reaching the arithmetic as a gap.

use crate::domain::{Cell, EconomicAssumptions, NumericColumn, RawRow, ResolvedRow};
use crate::error::CoercionError;

const CURRENCY_SYMBOLS: [char; 2] = ['€', '$'];

/// Parse one locale-formatted text value.
///
/// `"0,80"`, `"€0.80"` and `"$ 0.80"` all read as `0.80`. Non-finite results
/// are treated as unparseable.
pub fn parse_locale_number(raw: &str) -> Result<f64, CoercionError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(CoercionError { raw: raw.to_string() }),
    }
}

/// Coerce a cell to a number, or `None` when it cannot be read.
pub fn coerce_cell(cell: Cell) -> Option<f64> {
    match cell {
        Cell::Number(v) if v.is_finite() => Some(v),
        Cell::Number(_) | Cell::Missing => None,
        Cell::Text(raw) => parse_locale_number(&raw).ok(),
    }
}

/// Counts of what the guard had to repair, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionStats {
    pub parsed_text: usize,
    pub unparseable: usize,
    pub defaulted: usize,
}

/// Resolve every row to numbers, re-applying defaults where needed.
pub fn resolve_rows(rows: &[RawRow], assumptions: &EconomicAssumptions) -> (Vec<ResolvedRow>, CoercionStats) {
    let defaults = assumptions.baseline_inputs();
    let mut stats = CoercionStats::default();

    let resolved: Vec<ResolvedRow> = rows
        .iter()
        .map(|row| {
            let inputs = row.inputs.clone().zip_with(&defaults, |column: NumericColumn, cell, default| {
                let was_text = matches!(cell, Cell::Text(_));
                let raw = match &cell {
                    Cell::Text(raw) => Some(raw.clone()),
                    _ => None,
                };
                match coerce_cell(cell) {
                    Some(v) => {
                        if was_text {
                            stats.parsed_text += 1;
                        }
                        v
                    }
                    None => {
                        if let Some(raw) = raw {
                            stats.unparseable += 1;
                            tracing::debug!(
                                date = %row.date,
                                company = %row.company,
                                column = column.name(),
                                raw = %raw,
                                "unparseable numeric cell, using default"
                            );
                        }
                        stats.defaulted += 1;
                        *default
                    }
                }
            });

            ResolvedRow {
                date: row.date,
                company: row.company,
                run_rate_revenue_usd: row.run_rate_revenue_usd,
                tokens_volume_est_m: row.tokens_volume_est_m,
                inputs,
            }
        })
        .collect();

    if stats.unparseable > 0 {
        tracing::warn!(unparseable = stats.unparseable, "some numeric cells could not be parsed and were defaulted");
    }
    (resolved, stats)
}
