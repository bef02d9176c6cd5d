//! Input/output helpers.
//!
//! - chart SVG and table CSV exports (`export`)

pub mod export;

pub use export::*;
