//! Baseline economic assumptions.
//!
//! Every constant the pipeline relies on lives here, so alternate scenarios
//! can be run from a JSON file without code edits. Fields are flat and named
//! after the output columns they seed; a scenario only lists what it changes.

use serde::{Deserialize, Serialize};

use crate::domain::{Cell, Company, CostInputs, TierProfile};
use crate::error::AppError;

/// Monthly token usage per subscriber for each break-even tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UsageTiers {
    pub lite: u64,
    pub standard: u64,
    pub pro: u64,
}

impl Default for UsageTiers {
    fn default() -> Self {
        Self {
            lite: 200_000,
            standard: 1_000_000,
            pro: 5_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicAssumptions {
    /// Grid companies, in the order rows are emitted within a month.
    pub companies: Vec<Company>,

    pub mix_mini_pct: f64,
    pub mix_flagship_pct: f64,

    pub gpu_type_mini: String,
    pub gpu_type_flagship: String,
    pub gpu_price_hour_mini: f64,
    pub gpu_price_hour_flagship: f64,
    pub gpu_power_w_mini: f64,
    pub gpu_power_w_flagship: f64,
    pub throughput_tok_s_mini: f64,
    pub throughput_tok_s_flagship: f64,

    pub pue: f64,
    /// Used for every month when no electricity series is available.
    pub electricity_price_usd_kwh: f64,

    /// Target gross margin for break-even prices, as a fraction (0.70 = 70%).
    pub target_margin: f64,
    pub usage_tiers: UsageTiers,
}

impl Default for EconomicAssumptions {
    fn default() -> Self {
        Self {
            companies: Company::ALL.to_vec(),
            mix_mini_pct: 85.0,
            mix_flagship_pct: 15.0,
            gpu_type_mini: "L4".to_string(),
            gpu_type_flagship: "H100".to_string(),
            gpu_price_hour_mini: 0.80,
            gpu_price_hour_flagship: 3.00,
            gpu_power_w_mini: 72.0,
            gpu_power_w_flagship: 700.0,
            throughput_tok_s_mini: 120.0,
            throughput_tok_s_flagship: 280.0,
            pue: 1.09,
            electricity_price_usd_kwh: 0.132,
            target_margin: 0.70,
            usage_tiers: UsageTiers::default(),
        }
    }
}

impl EconomicAssumptions {
    /// Row-level defaults, as used by the grid and the coercion guard.
    pub fn baseline_inputs(&self) -> CostInputs<f64> {
        CostInputs {
            mix_mini_pct: self.mix_mini_pct,
            mix_flagship_pct: self.mix_flagship_pct,
            mini: TierProfile {
                gpu_type: self.gpu_type_mini.clone(),
                gpu_price_hour: self.gpu_price_hour_mini,
                gpu_power_w: self.gpu_power_w_mini,
                throughput_tok_s: self.throughput_tok_s_mini,
            },
            flagship: TierProfile {
                gpu_type: self.gpu_type_flagship.clone(),
                gpu_price_hour: self.gpu_price_hour_flagship,
                gpu_power_w: self.gpu_power_w_flagship,
                throughput_tok_s: self.throughput_tok_s_flagship,
            },
            pue: self.pue,
            electricity_price_usd_kwh: self.electricity_price_usd_kwh,
        }
    }

    /// Defaults as grid cells. Electricity starts missing; reconciliation owns it.
    pub fn grid_inputs(&self) -> CostInputs<Cell> {
        let mut inputs = self.baseline_inputs().zip_with(&self.baseline_inputs(), |_, v, _| Cell::Number(v));
        inputs.electricity_price_usd_kwh = Cell::Missing;
        inputs
    }

    /// Structural checks only. Degenerate arithmetic is the cost calculator's call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.companies.is_empty() {
            return Err(AppError::config("Scenario must list at least one company."));
        }
        for (i, company) in self.companies.iter().enumerate() {
            if self.companies[..i].contains(company) {
                return Err(AppError::config(format!("Company {company} is listed twice.")));
            }
        }
        Ok(())
    }
}
