//! Operator-facing summary for a build run.
//!
//! Diagnostic only: the CSV is the contract, this text is for eyeballing that
//! the external series actually landed.

use std::path::Path;

use crate::coerce::CoercionStats;
use crate::domain::CostedRow;

const SAMPLE_ROWS: usize = 4;

/// Electricity price spread across the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricityStats {
    pub distinct: usize,
    pub min: f64,
    pub max: f64,
}

pub fn electricity_stats(rows: &[CostedRow]) -> Option<ElectricityStats> {
    let mut prices: Vec<f64> = rows.iter().map(|r| r.row.inputs.electricity_price_usd_kwh).collect();
    if prices.is_empty() {
        return None;
    }
    prices.sort_by(|a, b| a.total_cmp(b));
    let min = prices[0];
    let max = prices[prices.len() - 1];
    prices.dedup();
    Some(ElectricityStats {
        distinct: prices.len(),
        min,
        max,
    })
}

pub fn format_build_summary(rows: &[CostedRow], coercion: &CoercionStats, out: &Path) -> String {
    let mut s = String::new();

    s.push_str(&format!("Rows: {}\n", rows.len()));
    match electricity_stats(rows) {
        Some(e) => s.push_str(&format!(
            "Electricity USD/kWh: {} distinct | min {} | max {}\n",
            e.distinct, e.min, e.max
        )),
        None => s.push_str("Electricity USD/kWh: n/a\n"),
    }
    if coercion.unparseable > 0 {
        s.push_str(&format!("Unparseable numeric cells defaulted: {}\n", coercion.unparseable));
    }

    s.push_str("GPU USD/h sample:\n");
    s.push_str(&format!("{:<10} {:<10} {:>10} {:>10}\n", "date", "company", "mini", "flagship"));
    for costed in rows.iter().take(SAMPLE_ROWS) {
        let row = &costed.row;
        s.push_str(&format!(
            "{:<10} {:<10} {:>10} {:>10}\n",
            row.date.to_string(),
            row.company.display_name(),
            row.inputs.mini.gpu_price_hour,
            row.inputs.flagship.gpu_price_hour,
        ));
    }

    s.push_str(&format!("Wrote monthly series to {} with {} rows", out.display(), rows.len()));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::resolve_rows;
    use crate::cost::cost_rows;
    use crate::data::grid::build_grid;
    use crate::domain::EconomicAssumptions;

    fn costed(start: &str, end: &str) -> Vec<CostedRow> {
        let assumptions = EconomicAssumptions::default();
        let (rows, _) = resolve_rows(&build_grid(start, end, &assumptions).unwrap(), &assumptions);
        cost_rows(&rows, &assumptions).unwrap()
    }

    #[test]
    fn stats_over_constant_fallback() {
        let e = electricity_stats(&costed("2024-01", "2024-03")).unwrap();
        assert_eq!(e.distinct, 1);
        assert_eq!(e.min, 0.132);
        assert_eq!(e.max, 0.132);
        assert_eq!(electricity_stats(&[]), None);
    }

    #[test]
    fn summary_lists_sample_rows() {
        let rows = costed("2024-01", "2024-05");
        let text = format_build_summary(&rows, &CoercionStats::default(), Path::new("out/series.csv"));
        assert!(text.starts_with("Rows: 10\n"));
        assert!(text.contains("2024-02-01 Anthropic"));
        assert!(!text.contains("2024-03-01"));
        assert!(text.ends_with("Wrote monthly series to out/series.csv with 10 rows"));
    }
}
