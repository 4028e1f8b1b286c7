//! Manual scenario steps.
//!
//! Future months are never forecast. Instead a scenario may step selected
//! assumptions from a given month onward (e.g. a mix shift in 2025-01, a
//! throughput bump in 2025-04). Steps apply in order to resolved rows, after
//! the coercion guard and before costing.

use chrono::NaiveDate;

use crate::domain::ResolvedRow;

/// Validated step: every row dated on or after `from` takes the set values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioStep {
    pub from: NaiveDate,
    pub mix_mini_pct: Option<f64>,
    pub mix_flagship_pct: Option<f64>,
    pub throughput_tok_s_mini: Option<f64>,
    pub throughput_tok_s_flagship: Option<f64>,
    pub pue: Option<f64>,
}

pub fn apply_steps(rows: &[ResolvedRow], steps: &[ScenarioStep]) -> Vec<ResolvedRow> {
    let mut out = rows.to_vec();
    for step in steps {
        let mut touched = 0usize;
        for row in out.iter_mut().filter(|r| r.date >= step.from) {
            let inputs = &mut row.inputs;
            set(&mut inputs.mix_mini_pct, step.mix_mini_pct);
            set(&mut inputs.mix_flagship_pct, step.mix_flagship_pct);
            set(&mut inputs.mini.throughput_tok_s, step.throughput_tok_s_mini);
            set(&mut inputs.flagship.throughput_tok_s, step.throughput_tok_s_flagship);
            set(&mut inputs.pue, step.pue);
            touched += 1;
        }
        tracing::debug!(from = %step.from, rows = touched, "applied scenario step");
    }
    out
}

fn set(slot: &mut f64, value: Option<f64>) {
    if let Some(v) = value {
        *slot = v;
    }
}
