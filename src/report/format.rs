//! Formatted terminal output: latest-row previews, the catalog, notices.
//!
//! We keep formatting code in one place so:
//! - the fetch/render code stays clean and testable
//! - output changes are localized

use crate::chart::BatchRender;
use crate::data::catalog::CATALOG;
use crate::domain::SeriesTable;

/// Attribution and caution shown under every view.
pub const ATTRIBUTION: &str = "\
Attribution and caution:
1. All data for series is sourced from the Hong Kong government Census and Statistics Department
   (https://www.censtatd.gov.hk/en/web_table.html?id=620-67003).
2. The year on year changes and charts are generated by code and may be subject to error and
   miscalculation. No liability is assumed for computed data and generated charts.";

/// Last `rows` observations of a table as an aligned text table.
pub fn format_tail(table: &SeriesTable, rows: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} - {}\n", table.series, table.series.description()));

    if table.is_empty() {
        out.push_str("  (no observations)\n");
        return out;
    }

    out.push_str(&format!("  {:<8} {:>12} {:>10}\n", "period", "volume_idx", "yoy_%"));
    for o in table.tail(rows) {
        out.push_str(&format!(
            "  {:<8} {:>12.1} {:>10}\n",
            o.period.format("%Y-%m"),
            o.value,
            fmt_opt_pct(o.yoy),
        ));
    }
    out
}

fn fmt_opt_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.1}")).unwrap_or_else(|| "-".to_string())
}

/// `id : description` for every series, in display order.
pub fn format_catalog() -> String {
    let mut out = String::from("Series Descriptions:\n");
    for (code, desc) in CATALOG {
        out.push_str(&format!("{code:>4} : {desc}\n"));
    }
    out
}

/// Summary of an all-series render: mode, common ranges, written charts, notices.
pub fn format_batch_summary(batch: &BatchRender) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Hong Kong Monthly Retail Sales ({}) ===\n", batch.mode.display_name()));
    for note in batch.range_notes() {
        out.push_str(&note);
        out.push('\n');
    }
    out.push_str(&format!("Rendered {} series.\n", batch.charts.len()));
    for notice in &batch.notices {
        out.push_str(&format!("! {notice}\n"));
    }
    out
}
