//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - series identity (`SeriesId`, validated against the catalog)
//! - normalized observations and tables (`Observation`, `SeriesTable`)
//! - chart scaling (`AxisBounds`, `SharedBounds`, `AxisMode`)

pub mod types;

pub use types::*;
