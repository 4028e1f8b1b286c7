//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the monthly row in its raw/resolved/costed shapes (`types`)
//! - the injected baseline constants (`EconomicAssumptions`)

pub mod assumptions;
pub mod types;

pub use assumptions::*;
pub use types::*;
