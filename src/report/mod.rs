//! Reporting utilities: latest-row previews, catalog listing, batch summaries.

pub mod format;

pub use format::{ATTRIBUTION, format_batch_summary, format_catalog, format_tail};
