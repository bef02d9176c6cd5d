//! Write rendered charts and tables to disk.
//!
//! Charts are standalone SVG documents (open them in any browser); tables are
//! plain CSV for spreadsheets or downstream scripts.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::chart::SeriesCharts;
use crate::domain::SeriesTable;
use crate::error::AppError;

/// Write `<id>_volume.svg` and `<id>_yoy.svg` into `dir` (created if missing).
///
/// Chart kinds that failed to render are skipped; the returned paths are the
/// files actually written.
pub fn write_series_charts(dir: &Path, charts: &SeriesCharts) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))?;

    let mut written = Vec::new();
    for (suffix, svg) in [("volume", &charts.volume_svg), ("yoy", &charts.yoy_svg)] {
        let Ok(svg) = svg else {
            continue;
        };
        let path = dir.join(format!("{}_{suffix}.svg", charts.series));
        write_text(&path, svg)?;
        written.push(path);
    }
    Ok(written)
}

fn write_text(path: &Path, contents: &str) -> Result<(), AppError> {
    std::fs::write(path, contents)
        .map_err(|e| AppError::new(2, format!("Failed to write '{}': {e}", path.display())))
}

/// Write a table as `period,volume_index,yoy_pct` CSV (empty YoY cells where absent).
pub fn write_table_csv(path: &Path, table: &SeriesTable) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "series,period,volume_index,yoy_pct")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for o in table.rows() {
        writeln!(
            file,
            "{},{},{:.1},{}",
            o.series,
            o.period.format("%Y-%m-%d"),
            o.value,
            o.yoy.map(|v| format!("{v:.4}")).unwrap_or_default(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
