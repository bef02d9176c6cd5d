//! Shared "fetch → render" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! cache lookup (network on miss) -> per-series outcome -> bounds -> charts
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::collections::BTreeMap;
use std::sync::Arc;

use log::warn;

use crate::chart::{BatchRender, SeriesCharts, View, render_batch, render_series};
use crate::data::{Clock, FetchOutcomes, SeriesCache, SeriesSource};
use crate::domain::{AxisMode, SeriesId, SeriesTable};
use crate::error::{AppError, RenderError};

/// Outputs of the single-series view.
///
/// An empty table is still a successful fetch; its charts carry the render
/// error instead.
#[derive(Debug, Clone)]
pub struct SingleOutput {
    pub table: Arc<SeriesTable>,
    pub charts: Result<SeriesCharts, RenderError>,
}

/// Outputs of the all-series view.
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub outcomes: FetchOutcomes,
    pub render: BatchRender,
}

/// Fetch `ids` one after another through the cache.
///
/// A failure is logged and recorded for its own id; the remaining ids are
/// still fetched.
pub fn fetch_batch<S, C>(cache: &mut SeriesCache<S, C>, ids: impl IntoIterator<Item = SeriesId>) -> FetchOutcomes
where
    S: SeriesSource,
    C: Clock,
{
    let mut out = BTreeMap::new();
    for id in ids {
        let outcome = cache.get_or_fetch(id);
        if let Err(err) = &outcome {
            warn!("Failed to fetch data for series {id}: {err}");
        }
        out.insert(id, outcome);
    }
    out
}

/// Fetch one series and render its two charts. Fetch errors surface directly.
pub fn run_single<S, C>(cache: &mut SeriesCache<S, C>, series: SeriesId) -> Result<SingleOutput, AppError>
where
    S: SeriesSource,
    C: Clock,
{
    let table = cache.get_or_fetch(series)?;
    let charts = render_series(&table, View::Single, None);
    Ok(SingleOutput { table, charts })
}

/// Fetch every catalog series and render the grid.
pub fn run_all<S, C>(cache: &mut SeriesCache<S, C>, mode: AxisMode) -> BatchOutput
where
    S: SeriesSource,
    C: Clock,
{
    let outcomes = fetch_batch(cache, SeriesId::all());
    let render = render_batch(&outcomes, mode);
    BatchOutput { outcomes, render }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::NaiveDate;

    use super::*;
    use crate::chart::NoticeKind;
    use crate::error::FetchError;
    use crate::testing::{FakeSource, ManualClock};

    fn id(code: &str) -> SeriesId {
        SeriesId::parse(code).unwrap()
    }

    fn cache(source: &FakeSource) -> SeriesCache<FakeSource, ManualClock> {
        SeriesCache::with_clock(source.clone(), ManualClock::new(), Duration::from_secs(3600))
    }

    #[test]
    fn all_view_survives_one_network_failure() {
        let source = FakeSource::default();
        source.fail(id("32"), FetchError::network("connection reset by peer"));
        let mut cache = cache(&source);

        let out = run_all(&mut cache, AxisMode::Common);

        assert_eq!(out.outcomes.len(), 24);
        assert_eq!(out.render.charts.len(), 23);
        assert!(out.render.charts.iter().all(|c| c.series != id("32")));
        assert_eq!(out.render.notices.len(), 1);
        let notice = &out.render.notices[0];
        assert_eq!(notice.series, id("32"));
        assert!(matches!(notice.kind, NoticeKind::Fetch(FetchError::Network { .. })));
    }

    #[test]
    fn batch_output_follows_catalog_order() {
        let source = FakeSource::default();
        let mut cache = cache(&source);
        let out = run_all(&mut cache, AxisMode::Individual);
        let order: Vec<SeriesId> = out.render.charts.iter().map(|c| c.series).collect();
        let expected: Vec<SeriesId> = SeriesId::all().collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn repeated_views_reuse_the_cache() {
        let source = FakeSource::default();
        let mut cache = cache(&source);
        run_all(&mut cache, AxisMode::Individual);
        run_all(&mut cache, AxisMode::Common);
        run_single(&mut cache, id("8")).unwrap();
        assert!(SeriesId::all().all(|s| source.calls(s) == 1));
    }

    #[test]
    fn single_view_surfaces_fetch_errors() {
        let source = FakeSource::default();
        source.fail(id("19"), FetchError::Status(502));
        let mut cache = cache(&source);
        let err = run_single(&mut cache, id("19")).unwrap_err();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn single_view_of_empty_series_is_not_a_fetch_error() {
        let source = FakeSource::default();
        source.set_table(SeriesTable::empty(id("38")));
        let mut cache = cache(&source);
        let out = run_single(&mut cache, id("38")).unwrap();
        assert!(out.table.is_empty());
        assert!(matches!(out.charts, Err(RenderError::Empty)));
    }

    #[test]
    fn jewellery_doubling_scenario() {
        let source = FakeSource::default();
        let points = (0..24).map(|i| {
            let year = 2022 + i / 12;
            let month = (i % 12) as u32 + 1;
            let base = 60.0 + month as f64;
            let value = if year == 2022 { base } else { base * 2.0 };
            (NaiveDate::from_ymd_opt(year, month, 1).unwrap(), value)
        });
        source.set_table(SeriesTable::from_points(id("32"), points));
        let mut cache = cache(&source);

        let out = run_single(&mut cache, id("32")).unwrap();
        let year2: Vec<f64> = out.table.rows()[12..].iter().map(|o| o.yoy.unwrap()).collect();
        assert_eq!(year2.len(), 12);
        assert!(year2.iter().all(|y| (y - 100.0).abs() < 1e-9));
        assert!(out.charts.unwrap().yoy_svg.unwrap().contains("<svg"));
    }
}
