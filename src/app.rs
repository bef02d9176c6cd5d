//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads configuration and sets up logging
//! - builds the API client and the series cache
//! - dispatches to the CLI views or the TUI

use clap::Parser;
use log::info;

use crate::chart::{NoticeKind, SeriesNotice};
use crate::cli::{AllArgs, Command, ShowArgs};
use crate::config::Config;
use crate::data::{CenstatdClient, SeriesCache};
use crate::error::AppError;

pub mod pipeline;

/// Series cache backed by the live API.
pub type LiveCache = SeriesCache<CenstatdClient>;

/// Entry point for the `hkr` binary.
pub fn run() -> Result<(), AppError> {
    // We want `hkr` (and `hkr --some-flag`) to behave like `hkr tui`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let is_tui = matches!(cli.command, Command::Tui(_));
    init_logging(is_tui);

    let config = Config::from_env()?;

    match cli.command {
        Command::Show(args) => handle_show(args, &config),
        Command::All(args) => handle_all(args, &config),
        Command::Catalog => {
            println!("{}", crate::report::format_catalog());
            println!("{}", crate::report::ATTRIBUTION);
            Ok(())
        }
        Command::Tui(args) => crate::tui::run(config, args.axis),
    }
}

/// `RUST_LOG` wins; otherwise warnings for CLI commands and nothing for the TUI,
/// whose alternate screen would be corrupted by stderr output.
fn init_logging(quiet: bool) {
    let default = if quiet { "off" } else { "warn" };
    // A second init (e.g. from tests) is harmless.
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).try_init();
}

pub fn build_cache(config: &Config) -> Result<LiveCache, AppError> {
    let client = CenstatdClient::new(config)?;
    Ok(SeriesCache::new(client, config.cache_ttl))
}

fn handle_show(args: ShowArgs, config: &Config) -> Result<(), AppError> {
    let mut cache = build_cache(config)?;
    let rows = args.rows.unwrap_or(config.tail_rows);

    let out = pipeline::run_single(&mut cache, args.series)?;
    println!("{}", crate::report::format_tail(&out.table, rows));

    if let Some(dir) = &args.out {
        match &out.charts {
            Ok(charts) => {
                for path in crate::io::write_series_charts(dir, charts)? {
                    info!("wrote {}", path.display());
                    println!("wrote {}", path.display());
                }
                for (kind, err) in charts.failures() {
                    let notice = SeriesNotice {
                        series: args.series,
                        kind: NoticeKind::Chart(kind, err.clone()),
                    };
                    println!("! {notice}");
                }
            }
            Err(err) => println!("! Error loading {}: {err}", args.series.description()),
        }
    }
    if let Some(path) = &args.export {
        crate::io::write_table_csv(path, &out.table)?;
        println!("wrote {}", path.display());
    }

    println!("{}", crate::report::ATTRIBUTION);
    Ok(())
}

fn handle_all(args: AllArgs, config: &Config) -> Result<(), AppError> {
    let mut cache = build_cache(config)?;
    let rows = args.rows.unwrap_or(config.tail_rows);

    let out = pipeline::run_all(&mut cache, args.axis);
    println!("{}", crate::report::format_batch_summary(&out.render));

    if let Some(dir) = &args.out {
        let mut written = 0usize;
        for charts in &out.render.charts {
            written += crate::io::write_series_charts(dir, charts)?.len();
        }
        println!("wrote {written} chart(s) to {}\n", dir.display());
    }

    println!("Latest Data");
    for outcome in out.outcomes.values() {
        // Failed series were already reported in the summary.
        if let Ok(table) = outcome {
            println!("{}", crate::report::format_tail(table, rows));
        }
    }

    println!("{}", crate::report::ATTRIBUTION);
    Ok(())
}

/// Rewrite argv so `hkr` defaults to `hkr tui`.
///
/// Rules:
/// - `hkr`                      -> `hkr tui`
/// - `hkr --help/--version/-h`  -> unchanged (show top-level help/version)
/// - `hkr <subcommand> ...`     -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "show" | "all" | "catalog" | "tui");
    if is_subcommand {
        return argv;
    }

    // A bare flag means "tui with flags" (e.g. `hkr --axis common`).
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["hkr"])), argv(&["hkr", "tui"]));
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        assert_eq!(rewrite_args(argv(&["hkr", "show", "32"])), argv(&["hkr", "show", "32"]));
        assert_eq!(rewrite_args(argv(&["hkr", "--help"])), argv(&["hkr", "--help"]));
        assert_eq!(rewrite_args(argv(&["hkr", "catalog"])), argv(&["hkr", "catalog"]));
    }

    #[test]
    fn leading_flag_is_routed_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["hkr", "--axis", "common"])),
            argv(&["hkr", "tui", "--axis", "common"])
        );
    }
}
