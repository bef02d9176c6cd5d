//! Chart preparation and rendering.
//!
//! - shared axis ranges across series (`bounds`)
//! - line charts drawn with Plotters, exported as SVG (`render`)

pub mod bounds;
pub mod render;

pub use bounds::{compute_bounds, compute_bounds_shared};
pub use render::{
    BatchRender, ChartKind, ChartStyle, LineChart, NoticeKind, SeriesCharts, SeriesNotice, View, draw_line_chart,
    render_batch, render_series, render_svg,
};
