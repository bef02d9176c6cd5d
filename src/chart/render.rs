//! Plotters-powered line charts for volume index and YoY series.
//!
//! Chart data is prepared up front as a `LineChart` (points, bounds, labels);
//! `draw_line_chart` then draws it on any Plotters backend. The SVG renderer
//! below and the TUI widget both go through the same drawing routine.

use std::fmt;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::chart::bounds::autoscale;
use crate::data::FetchOutcomes;
use crate::domain::{AxisBounds, AxisMode, SeriesId, SeriesTable, SharedBounds};
use crate::error::{FetchError, RenderError};

pub const VOLUME_UNITS: &str = "Index";
pub const YOY_UNITS: &str = "Percentage Change (%)";

/// Default SVG canvas (matches a 10x5 inch figure at 80 dpi).
pub const SVG_SIZE: (u32, u32) = (800, 400);

/// Which layout a chart is titled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The single-series page: long titles.
    Single,
    /// One cell of the all-series grid: short titles.
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Volume,
    Yoy,
}

impl ChartKind {
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Volume => "volume",
            ChartKind::Yoy => "YoY",
        }
    }
}

/// Render-ready description of one line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub legend: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    /// `(decimal year, y)` points.
    pub points: Vec<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: AxisBounds,
    /// Draw a horizontal reference line at y = 0.
    pub zero_line: bool,
}

impl LineChart {
    /// Volume index chart. `shared` pins the y-range; otherwise it autoscales.
    pub fn volume(table: &SeriesTable, view: View, shared: Option<AxisBounds>) -> Result<Self, RenderError> {
        let desc = table.series.description();
        let points = table.volume_points();
        let y_bounds = match shared {
            Some(b) => b,
            None => autoscale(points.iter().map(|p| p.1)).ok_or(RenderError::Empty)?,
        };
        let (title, legend) = match view {
            View::Single => (format!("{desc} volume Index"), format!("{desc} volume Index")),
            View::Grid => (desc.to_string(), desc.to_string()),
        };
        Self::build(table, title, legend, VOLUME_UNITS, points, y_bounds, false)
    }

    /// YoY chart. Autoscaling always includes zero so the reference line is visible.
    pub fn yoy(table: &SeriesTable, view: View, shared: Option<AxisBounds>) -> Result<Self, RenderError> {
        let desc = table.series.description();
        let points = table.yoy_points();
        let y_bounds = match shared {
            Some(b) => b,
            None => autoscale(points.iter().map(|p| p.1).chain(std::iter::once(0.0)))
                .ok_or(RenderError::Empty)?,
        };
        let (title, legend) = match view {
            View::Single => (
                format!("Year on Year Change in {desc} volume index"),
                "Volume Index YoY Change".to_string(),
            ),
            View::Grid => (format!("{desc} YoY"), "YoY Change".to_string()),
        };
        Self::build(table, title, legend, YOY_UNITS, points, y_bounds, true)
    }

    fn build(
        table: &SeriesTable,
        title: String,
        legend: String,
        y_label: &'static str,
        points: Vec<(f64, f64)>,
        y_bounds: AxisBounds,
        zero_line: bool,
    ) -> Result<Self, RenderError> {
        if table.is_empty() {
            return Err(RenderError::Empty);
        }
        if !y_bounds.is_valid() {
            return Err(RenderError::InvalidBounds {
                min: y_bounds.min,
                max: y_bounds.max,
            });
        }
        let x_bounds = x_bounds(table).ok_or(RenderError::Empty)?;
        Ok(Self {
            title,
            legend,
            x_label: "Year",
            y_label,
            points,
            x_bounds,
            y_bounds,
            zero_line,
        })
    }

    /// Number of whole years on the x-axis; one tick per year.
    pub fn yearly_ticks(&self) -> usize {
        let first = self.x_bounds[0].ceil();
        let last = self.x_bounds[1].floor();
        if last < first { 1 } else { (last - first) as usize + 1 }
    }
}

fn x_bounds(table: &SeriesTable) -> Option<[f64; 2]> {
    let first = crate::domain::decimal_year(table.first_period()?);
    let last = crate::domain::decimal_year(table.last_period()?);
    if last > first {
        Some([first, last])
    } else {
        Some([first - 0.5, last + 0.5])
    }
}

/// Colors and sizes; SVG output and the terminal need very different palettes.
#[derive(Debug, Clone, Copy)]
pub struct ChartStyle {
    pub background: RGBColor,
    pub foreground: RGBColor,
    pub line: RGBColor,
    pub reference: RGBColor,
    /// Grid line color; `None` disables the mesh.
    pub grid: Option<RGBColor>,
    pub line_width: u32,
    pub caption_size: u32,
    pub label_size: u32,
    pub margin: u32,
    pub left_area: u32,
    pub bottom_area: u32,
    /// `None` = one label per year.
    pub x_labels: Option<usize>,
    pub y_labels: usize,
    pub show_caption: bool,
    pub show_legend: bool,
}

const VOLUME_BLUE: RGBColor = RGBColor(31, 119, 180);
const YOY_ORANGE: RGBColor = RGBColor(255, 127, 14);

impl ChartStyle {
    pub fn svg(kind: ChartKind) -> Self {
        Self {
            background: WHITE,
            foreground: BLACK,
            line: match kind {
                ChartKind::Volume => VOLUME_BLUE,
                ChartKind::Yoy => YOY_ORANGE,
            },
            reference: RGBColor(160, 160, 160),
            grid: Some(RGBColor(220, 220, 220)),
            line_width: 2,
            caption_size: 18,
            label_size: 12,
            margin: 12,
            left_area: 60,
            bottom_area: 50,
            x_labels: None,
            y_labels: 8,
            show_caption: true,
            show_legend: true,
        }
    }

    /// High-contrast palette for low-resolution terminal rendering.
    pub fn terminal(kind: ChartKind) -> Self {
        Self {
            background: BLACK,
            foreground: WHITE,
            line: match kind {
                ChartKind::Volume => RGBColor(0, 255, 255),
                ChartKind::Yoy => RGBColor(255, 165, 0),
            },
            reference: RGBColor(128, 128, 128),
            grid: None,
            line_width: 1,
            caption_size: 10,
            label_size: 10,
            margin: 1,
            left_area: 6,
            bottom_area: 3,
            x_labels: Some(6),
            y_labels: 5,
            show_caption: false,
            show_legend: false,
        }
    }
}

/// Draw `chart` onto `root` using `style`.
pub fn draw_line_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &LineChart,
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let [x0, x1] = chart.x_bounds;
    let (y0, y1) = (chart.y_bounds.min, chart.y_bounds.max);

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(style.margin)
        .set_label_area_size(LabelAreaPosition::Left, style.left_area)
        .set_label_area_size(LabelAreaPosition::Bottom, style.bottom_area);
    if style.show_caption {
        builder.caption(
            &chart.title,
            ("sans-serif", style.caption_size).into_font().color(&style.foreground),
        );
    }
    let mut ctx = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    let fmt_year = |v: &f64| format!("{v:.0}");
    let fmt_y = |v: &f64| format!("{v:.1}");
    let x_labels = style.x_labels.unwrap_or_else(|| chart.yearly_ticks());

    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(chart.x_label)
        .y_desc(chart.y_label)
        .x_labels(x_labels)
        .y_labels(style.y_labels)
        .x_label_formatter(&fmt_year)
        .y_label_formatter(&fmt_y)
        .label_style(("sans-serif", style.label_size).into_font().color(&style.foreground))
        .axis_style(&style.foreground);
    match &style.grid {
        Some(grid) => {
            mesh.bold_line_style(grid).light_line_style(&style.background);
        }
        None => {
            mesh.disable_x_mesh().disable_y_mesh();
        }
    }
    mesh.draw()?;

    if chart.zero_line {
        ctx.draw_series(LineSeries::new(
            [(x0, 0.0), (x1, 0.0)],
            style.reference.stroke_width(1),
        ))?;
    }

    let line = style.line;
    let series = ctx.draw_series(LineSeries::new(
        chart.points.iter().copied(),
        line.stroke_width(style.line_width),
    ))?;
    if style.show_legend {
        series
            .label(chart.legend.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line.stroke_width(2)));

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&style.background)
            .border_style(&style.foreground)
            .label_font(("sans-serif", style.label_size).into_font().color(&style.foreground))
            .draw()?;
    }

    Ok(())
}

/// Render one chart to a standalone SVG document.
pub fn render_svg(chart: &LineChart, style: &ChartStyle, size: (u32, u32)) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&style.background).map_err(draw_error)?;
        draw_line_chart(&root, chart, style).map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    }
    Ok(svg)
}

fn draw_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(err.to_string())
}

/// The two SVG charts of one series. Each chart kind succeeds or fails on
/// its own.
#[derive(Debug, Clone)]
pub struct SeriesCharts {
    pub series: SeriesId,
    pub volume_svg: Result<String, RenderError>,
    pub yoy_svg: Result<String, RenderError>,
}

impl SeriesCharts {
    /// Chart kinds that failed to render, with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (ChartKind, &RenderError)> {
        [(ChartKind::Volume, &self.volume_svg), (ChartKind::Yoy, &self.yoy_svg)]
            .into_iter()
            .filter_map(|(kind, svg)| svg.as_ref().err().map(|err| (kind, err)))
    }
}

/// Render volume and YoY charts for one table.
///
/// With `shared` set, both charts use the common ranges; an axis with no
/// shared range (e.g. no series has YoY yet) falls back to autoscaling.
/// Fails only when neither chart renders (the volume error is reported).
pub fn render_series(table: &SeriesTable, view: View, shared: Option<&SharedBounds>) -> Result<SeriesCharts, RenderError> {
    let volume_svg = LineChart::volume(table, view, shared.and_then(|b| b.volume))
        .and_then(|chart| render_svg(&chart, &ChartStyle::svg(ChartKind::Volume), SVG_SIZE));
    let yoy_svg = LineChart::yoy(table, view, shared.and_then(|b| b.yoy))
        .and_then(|chart| render_svg(&chart, &ChartStyle::svg(ChartKind::Yoy), SVG_SIZE));

    if let (Err(err), Err(_)) = (&volume_svg, &yoy_svg) {
        return Err(err.clone());
    }
    Ok(SeriesCharts {
        series: table.series,
        volume_svg,
        yoy_svg,
    })
}

/// Why a series (or one of its charts) is missing from a batch render.
#[derive(Debug, Clone, PartialEq)]
pub enum NoticeKind {
    Fetch(FetchError),
    /// Neither chart of the series rendered.
    Render(RenderError),
    /// One chart kind failed; the other one rendered.
    Chart(ChartKind, RenderError),
}

/// Per-series problem surfaced next to the charts that did render.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesNotice {
    pub series: SeriesId,
    pub kind: NoticeKind,
}

impl fmt::Display for SeriesNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NoticeKind::Fetch(err) => write!(f, "Failed to fetch data for series {}: {err}", self.series),
            NoticeKind::Render(err) => write!(f, "Error loading {}: {err}", self.series.description()),
            NoticeKind::Chart(kind, err) => write!(
                f,
                "Error loading {} {} chart: {err}",
                self.series.description(),
                kind.label()
            ),
        }
    }
}

/// Output of an all-series render.
#[derive(Debug, Clone)]
pub struct BatchRender {
    pub mode: AxisMode,
    /// Ranges applied in common mode (`None` in individual mode).
    pub shared: Option<SharedBounds>,
    /// Charts in catalog order.
    pub charts: Vec<SeriesCharts>,
    pub notices: Vec<SeriesNotice>,
}

impl BatchRender {
    /// Human-readable description of the common ranges, one line per axis.
    pub fn range_notes(&self) -> Vec<String> {
        let Some(shared) = &self.shared else {
            return Vec::new();
        };
        let mut out = Vec::new();
        if let Some(v) = shared.volume {
            out.push(format!("All charts use common Y-axis range: {:.0} to {:.0}", v.min, v.max));
        }
        if let Some(y) = shared.yoy {
            out.push(format!("All charts use common Y-axis range: {:.1}% to {:.1}%", y.min, y.max));
        }
        out
    }
}

/// Render every fetched series; failures of one series never stop the others.
pub fn render_batch(outcomes: &FetchOutcomes, mode: AxisMode) -> BatchRender {
    let shared = match mode {
        AxisMode::Individual => None,
        AxisMode::Common => Some(crate::chart::bounds::compute_bounds_shared(
            outcomes.values().filter_map(|r| r.as_ref().ok()),
        )),
    };

    let mut charts = Vec::new();
    let mut notices = Vec::new();
    for (&series, outcome) in outcomes {
        let table = match outcome {
            Ok(table) => table,
            Err(err) => {
                notices.push(SeriesNotice {
                    series,
                    kind: NoticeKind::Fetch(err.clone()),
                });
                continue;
            }
        };
        match render_series(table, View::Grid, shared.as_ref()) {
            Ok(c) => {
                for (kind, err) in c.failures() {
                    log::warn!("series {series}: {} chart failed: {err}", kind.label());
                    notices.push(SeriesNotice {
                        series,
                        kind: NoticeKind::Chart(kind, err.clone()),
                    });
                }
                charts.push(c);
            }
            Err(err) => {
                log::warn!("series {series}: render failed: {err}");
                notices.push(SeriesNotice {
                    series,
                    kind: NoticeKind::Render(err),
                });
            }
        }
    }

    BatchRender {
        mode,
        shared,
        charts,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::testing::synthetic_table;

    fn id(code: &str) -> SeriesId {
        SeriesId::parse(code).unwrap()
    }

    #[test]
    fn volume_chart_autoscales_and_titles() {
        let table = synthetic_table(id("8"), 2020, 36, 100.0);
        let chart = LineChart::volume(&table, View::Single, None).unwrap();
        assert_eq!(chart.title, "Supermarkets volume Index");
        assert_eq!(chart.y_label, VOLUME_UNITS);
        assert_eq!(chart.points.len(), 36);
        assert!(!chart.zero_line);
        assert!(chart.y_bounds.min < 100.0);
        assert_eq!(chart.x_bounds[0], 2020.0);
        assert_eq!(chart.yearly_ticks(), 3);
    }

    #[test]
    fn yoy_chart_has_zero_line_and_includes_zero() {
        let table = synthetic_table(id("8"), 2020, 36, 100.0);
        let chart = LineChart::yoy(&table, View::Grid, None).unwrap();
        assert!(chart.zero_line);
        assert_eq!(chart.title, "Supermarkets YoY");
        assert_eq!(chart.points.len(), 24);
        assert!(chart.y_bounds.min < 0.0 && chart.y_bounds.max > 0.0);
    }

    #[test]
    fn shared_bounds_pin_the_axis() {
        let table = synthetic_table(id("8"), 2020, 36, 100.0);
        let pinned = AxisBounds::new(45.0, 220.0);
        let chart = LineChart::volume(&table, View::Grid, Some(pinned)).unwrap();
        assert_eq!(chart.y_bounds, pinned);
    }

    #[test]
    fn empty_table_is_a_render_error() {
        let table = SeriesTable::empty(id("9"));
        assert_eq!(LineChart::volume(&table, View::Grid, None), Err(RenderError::Empty));
        assert!(matches!(
            render_series(&table, View::Grid, None),
            Err(RenderError::Empty)
        ));
    }

    #[test]
    fn invalid_shared_bounds_are_rejected() {
        let table = synthetic_table(id("9"), 2020, 24, 100.0);
        let err = LineChart::yoy(&table, View::Grid, Some(AxisBounds::new(0.0, 0.0))).unwrap_err();
        assert!(matches!(err, RenderError::InvalidBounds { .. }));
    }

    #[test]
    fn short_history_still_renders_yoy_axis() {
        let table = synthetic_table(id("9"), 2024, 6, 100.0);
        let chart = LineChart::yoy(&table, View::Single, None).unwrap();
        assert!(chart.points.is_empty());
        assert!(chart.y_bounds.is_valid());
    }

    #[test]
    fn svg_output_carries_title_and_units() {
        let table = synthetic_table(id("8"), 2020, 36, 100.0);
        let charts = render_series(&table, View::Single, None).unwrap();
        let volume = charts.volume_svg.unwrap();
        let yoy = charts.yoy_svg.unwrap();
        assert!(volume.contains("<svg"));
        assert!(volume.contains("Supermarkets volume Index"));
        assert!(yoy.contains("Year on Year Change in Supermarkets volume index"));
        assert!(yoy.contains("Percentage Change (%)"));
    }

    #[test]
    fn batch_isolates_failed_series() {
        let mut outcomes: FetchOutcomes = BTreeMap::new();
        outcomes.insert(id("2"), Ok(Arc::new(synthetic_table(id("2"), 2020, 24, 100.0))));
        outcomes.insert(id("8"), Err(FetchError::network("connection refused")));
        outcomes.insert(id("9"), Ok(Arc::new(SeriesTable::empty(id("9")))));
        outcomes.insert(id("32"), Ok(Arc::new(synthetic_table(id("32"), 2020, 24, 50.0))));

        let batch = render_batch(&outcomes, AxisMode::Individual);
        let rendered: Vec<SeriesId> = batch.charts.iter().map(|c| c.series).collect();
        assert_eq!(rendered, vec![id("2"), id("32")]);

        assert_eq!(batch.notices.len(), 2);
        assert_eq!(batch.notices[0].series, id("8"));
        assert!(matches!(batch.notices[0].kind, NoticeKind::Fetch(FetchError::Network { .. })));
        assert!(batch.notices[0].to_string().contains("series 8"));
        assert_eq!(batch.notices[1].series, id("9"));
        assert_eq!(batch.notices[1].kind, NoticeKind::Render(RenderError::Empty));
        assert!(batch.shared.is_none());
        assert!(batch.range_notes().is_empty());
    }

    #[test]
    fn common_mode_uses_global_bounds() {
        let mut outcomes: FetchOutcomes = BTreeMap::new();
        outcomes.insert(id("2"), Ok(Arc::new(synthetic_table(id("2"), 2020, 24, 100.0))));
        outcomes.insert(id("32"), Ok(Arc::new(synthetic_table(id("32"), 2020, 24, 50.0))));
        outcomes.insert(id("8"), Err(FetchError::Status(500)));

        let batch = render_batch(&outcomes, AxisMode::Common);
        let shared = batch.shared.unwrap();
        let volume = shared.volume.unwrap();
        assert!((volume.min - 50.0 * 0.9).abs() < 1e-9);
        assert!((volume.max - 100.0 * 1.01_f64.powi(23) * 1.1).abs() < 1e-9);
        assert_eq!(batch.charts.len(), 2);
        assert_eq!(batch.notices.len(), 1);
        let notes = batch.range_notes();
        assert_eq!(notes.len(), 2);
        assert!(notes[0].starts_with("All charts use common Y-axis range: 45 to "));
        assert!(notes[1].starts_with("All charts use common Y-axis range: "));
        assert!(notes[1].ends_with('%'));
    }

    #[test]
    fn flat_series_render_in_common_mode() {
        let flat = |code: &str| {
            let series = id(code);
            let points = (0..24).map(|i| {
                let period = chrono::NaiveDate::from_ymd_opt(2022 + i / 12, (i % 12) as u32 + 1, 1).unwrap();
                (period, 100.0)
            });
            Ok(Arc::new(SeriesTable::from_points(series, points)))
        };
        let mut outcomes: FetchOutcomes = BTreeMap::new();
        outcomes.insert(id("2"), flat("2"));
        outcomes.insert(id("8"), flat("8"));

        let batch = render_batch(&outcomes, AxisMode::Common);
        assert!(batch.notices.is_empty(), "{:?}", batch.notices);
        assert_eq!(batch.charts.len(), 2);
        for charts in &batch.charts {
            assert!(charts.volume_svg.is_ok());
            assert!(charts.yoy_svg.is_ok());
        }
        let shared = batch.shared.unwrap();
        let volume = shared.volume.unwrap();
        assert!((volume.min - 90.0).abs() < 1e-9 && (volume.max - 110.0).abs() < 1e-9);
        assert_eq!(shared.yoy, Some(AxisBounds::new(-1.0, 1.0)));
    }

    #[test]
    fn one_failed_chart_kind_keeps_the_other() {
        let table = synthetic_table(id("30"), 2020, 24, 100.0);
        let shared = SharedBounds {
            volume: None,
            yoy: Some(AxisBounds::new(0.0, 0.0)),
        };
        let charts = render_series(&table, View::Grid, Some(&shared)).unwrap();
        assert!(charts.volume_svg.as_ref().unwrap().contains("<svg"));
        let failures: Vec<_> = charts.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, ChartKind::Yoy);
        assert!(matches!(failures[0].1, RenderError::InvalidBounds { .. }));

        let notice = SeriesNotice {
            series: id("30"),
            kind: NoticeKind::Chart(ChartKind::Yoy, failures[0].1.clone()),
        };
        assert!(notice.to_string().starts_with("Error loading Department stores YoY chart:"));
    }
}
