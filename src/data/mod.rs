//! Data producers.
//!
//! - canonical monthly grid (`grid`)
//! - manual scenario steps (`steps`)
//! - EIA electricity price fetch (`eia`)
//! - Vast.ai GPU offer snapshot (`vast`)

pub mod eia;
pub mod grid;
pub mod steps;
pub mod vast;

pub use eia::{EiaClient, ElectricityPriceRow};
pub use grid::{build_grid, month_range, parse_month};
pub use steps::{ScenarioStep, apply_steps};
pub use vast::{GpuOfferRow, VastClient};
