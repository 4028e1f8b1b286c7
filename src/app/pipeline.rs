//! The build pipeline.
//!
//! Grid -> electricity -> GPU overrides -> coercion guard -> scenario steps ->
//! costing. Each stage takes the previous table by reference and returns a
//! new one, so the order defaults are applied in stays auditable. Nothing
//! here writes to disk; the caller exports only after every row costed.

use crate::coerce::{CoercionStats, resolve_rows};
use crate::cost::cost_rows;
use crate::data::grid::build_grid;
use crate::data::steps::apply_steps;
use crate::domain::{BuildConfig, CostedRow};
use crate::error::AppError;
use crate::io::scenario::{Scenario, load_scenario};
use crate::io::series::{SeriesSource, load_series};
use crate::reconcile::electricity::ELECTRICITY_COLUMNS;
use crate::reconcile::gpu::override_column_names;
use crate::reconcile::{reconcile_electricity, reconcile_gpu_overrides};

/// External inputs for one run, already loaded.
#[derive(Debug, Clone)]
pub struct BuildSources {
    pub electricity: SeriesSource,
    pub gpu_overrides: SeriesSource,
    pub scenario: Scenario,
}

impl Default for BuildSources {
    fn default() -> Self {
        Self {
            electricity: SeriesSource::Absent,
            gpu_overrides: SeriesSource::Absent,
            scenario: Scenario::default(),
        }
    }
}

/// All computed outputs of a single build run.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub rows: Vec<CostedRow>,
    pub coercion: CoercionStats,
}

/// Load the configured files and run the pipeline.
pub fn run_build(config: &BuildConfig) -> Result<BuildOutput, AppError> {
    // Scenario problems are configuration errors; fail before touching data.
    let scenario = load_scenario(config.scenario.as_deref())?;
    let sources = BuildSources {
        electricity: load_series(config.eia_prices.as_deref(), &ELECTRICITY_COLUMNS),
        gpu_overrides: load_series(config.gpu_overrides.as_deref(), &override_column_names()),
        scenario,
    };
    run_build_with_sources(&config.start, &config.end, &sources)
}

/// Run the pipeline over pre-loaded sources.
pub fn run_build_with_sources(start: &str, end: &str, sources: &BuildSources) -> Result<BuildOutput, AppError> {
    let assumptions = &sources.scenario.assumptions;

    let grid = build_grid(start, end, assumptions)?;
    let grid = reconcile_electricity(&grid, &sources.electricity, assumptions.electricity_price_usd_kwh);
    let grid = reconcile_gpu_overrides(&grid, &sources.gpu_overrides);

    let (resolved, coercion) = resolve_rows(&grid, assumptions);
    let resolved = apply_steps(&resolved, &sources.scenario.steps);

    let rows = cost_rows(&resolved, assumptions)?;
    Ok(BuildOutput { rows, coercion })
}
