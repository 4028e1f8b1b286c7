//! Scenario JSON files.
//!
//! A scenario overrides baseline assumptions and/or adds manual steps:
//!
//! ```json
//! {
//!   "assumptions": { "gpu_price_hour_flagship": 2.49, "target_margin": 0.6 },
//!   "steps": [
//!     { "from": "2025-01", "mix_mini_pct": 80, "mix_flagship_pct": 20 },
//!     { "from": "2025-06", "pue": 1.06 }
//!   ]
//! }
//! ```

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use crate::data::grid::parse_month;
use crate::data::steps::ScenarioStep;
use crate::domain::EconomicAssumptions;
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scenario {
    pub assumptions: EconomicAssumptions,
    pub steps: Vec<ScenarioStep>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ScenarioFile {
    assumptions: EconomicAssumptions,
    steps: Vec<StepEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StepEntry {
    from: String,
    #[serde(default)]
    mix_mini_pct: Option<f64>,
    #[serde(default)]
    mix_flagship_pct: Option<f64>,
    #[serde(default)]
    throughput_tok_s_mini: Option<f64>,
    #[serde(default)]
    throughput_tok_s_flagship: Option<f64>,
    #[serde(default)]
    pue: Option<f64>,
}

/// Read a scenario file, or the built-in baseline when `path` is `None`.
pub fn load_scenario(path: Option<&Path>) -> Result<Scenario, AppError> {
    let Some(path) = path else {
        return Ok(Scenario::default());
    };
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("Failed to open scenario '{}': {e}", path.display())))?;
    let parsed: ScenarioFile = serde_json::from_reader(file)
        .map_err(|e| AppError::config(format!("Invalid scenario '{}': {e}", path.display())))?;
    into_scenario(parsed)
}

pub fn parse_scenario(json: &str) -> Result<Scenario, AppError> {
    let parsed: ScenarioFile =
        serde_json::from_str(json).map_err(|e| AppError::config(format!("Invalid scenario: {e}")))?;
    into_scenario(parsed)
}

fn into_scenario(file: ScenarioFile) -> Result<Scenario, AppError> {
    file.assumptions.validate()?;

    let mut steps = Vec::with_capacity(file.steps.len());
    for entry in file.steps {
        let from = parse_month(&entry.from)
            .map_err(|_| AppError::config(format!("Scenario step has invalid `from` month '{}'.", entry.from)))?;
        steps.push(ScenarioStep {
            from,
            mix_mini_pct: entry.mix_mini_pct,
            mix_flagship_pct: entry.mix_flagship_pct,
            throughput_tok_s_mini: entry.throughput_tok_s_mini,
            throughput_tok_s_flagship: entry.throughput_tok_s_flagship,
            pue: entry.pue,
        });
    }

    Ok(Scenario {
        assumptions: file.assumptions,
        steps,
    })
}
