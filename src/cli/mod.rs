//! Command-line parsing for the retail sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/render code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{AxisMode, SeriesId};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hkr", version, about = "Hong Kong Monthly Retail Sales (C&SD volume indices)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one series, print its latest rows, and optionally write charts/CSV.
    Show(ShowArgs),
    /// Fetch every series and render the whole grid of charts.
    All(AllArgs),
    /// Print the series catalog and the data attribution.
    Catalog,
    /// Launch the interactive TUI.
    Tui(TuiArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ShowArgs {
    /// Outlet-type series code (see `hkr catalog`).
    pub series: SeriesId,

    /// Number of latest rows to print (defaults to HKR_TAIL_ROWS or 5).
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,

    /// Directory to write `<id>_volume.svg` and `<id>_yoy.svg` into.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Export the full table to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct AllArgs {
    /// Y-axis scaling across charts.
    #[arg(long, value_enum, default_value_t = AxisMode::Individual)]
    pub axis: AxisMode,

    /// Number of latest rows to print per series (defaults to HKR_TAIL_ROWS or 5).
    #[arg(short = 'n', long)]
    pub rows: Option<usize>,

    /// Directory to write every series' SVG charts into.
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    /// Initial y-axis scaling (toggle with `a` inside the TUI).
    #[arg(long, value_enum, default_value_t = AxisMode::Individual)]
    pub axis: AxisMode,
}
