//! Input/output helpers.
//!
//! - external series CSV loading (`series`)
//! - scenario JSON loading (`scenario`)
//! - monthly series CSV export (`export`)

pub mod export;
pub mod scenario;
pub mod series;

pub use export::*;
pub use scenario::*;
pub use series::*;
