//! `hk-retail` library crate.
//!
//! The binary (`hkr`) is a thin wrapper around this library so that:
//!
//! - the fetch/cache/render pipeline is testable without spawning processes
//! - the CLI views and the TUI share one implementation
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod tui;

#[cfg(test)]
mod testing;
