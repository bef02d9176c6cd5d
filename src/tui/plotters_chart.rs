//! Plotters-powered line chart widget for Ratatui.
//!
//! The widget reuses `chart::draw_line_chart`, so the terminal view and the
//! SVG export draw from the same `LineChart` description. Only the style
//! differs: the terminal palette is high-contrast and the mesh is disabled.
//!
//! Rendering into the Ratatui buffer goes through `plotters-ratatui-backend`.

use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::chart::{ChartKind, ChartStyle, LineChart, draw_line_chart};

/// Render-only view of one prepared chart.
///
/// Points and bounds are computed before the draw call; `render()` only draws.
pub struct SeriesChartWidget<'a> {
    pub chart: &'a LineChart,
    pub kind: ChartKind,
}

impl<'a> SeriesChartWidget<'a> {
    pub fn new(chart: &'a LineChart, kind: ChartKind) -> Self {
        Self { chart, kind }
    }
}

impl Widget for SeriesChartWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a chart in a handful of cells.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let chart = self.chart;
        let style = ChartStyle::terminal(self.kind);
        let widget = widget_fn(move |root| {
            draw_line_chart(&root, chart, &style)?;
            Ok(())
        });

        widget.render(area, buf);
    }
}
