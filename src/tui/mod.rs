//! Ratatui-based terminal UI.
//!
//! The TUI lists the catalog on the left and shows the selected series on the
//! right: volume chart, YoY chart, and the latest rows. Fetches go through the
//! same cache as the CLI, so moving back to a series never hits the network
//! twice within the TTL.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::fetch_batch;
use crate::chart::{ChartKind, LineChart, View, compute_bounds_shared};
use crate::config::Config;
use crate::data::{Clock, SeriesCache, SeriesSource};
use crate::domain::{AxisMode, SeriesId, SeriesTable, SharedBounds};
use crate::error::{AppError, RenderError};

mod plotters_chart;

use plotters_chart::SeriesChartWidget;

/// Start the TUI.
pub fn run(config: Config, axis: AxisMode) -> Result<(), AppError> {
    // Build the client before touching the terminal so config errors print normally.
    let cache = crate::app::build_cache(&config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(cache, axis, config.tail_rows);
    // First frame before the (blocking) initial fetch.
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
    app.start();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App<S: SeriesSource, C: Clock> {
    cache: SeriesCache<S, C>,
    series: Vec<SeriesId>,
    selected: usize,
    axis: AxisMode,
    /// Common ranges; only populated in common mode.
    shared: Option<SharedBounds>,
    table: Option<Arc<SeriesTable>>,
    /// Last fetch error per series, shown in the list and the chart panes.
    failures: HashMap<SeriesId, String>,
    status: String,
    tail_rows: usize,
}

impl<S: SeriesSource, C: Clock> App<S, C> {
    fn new(cache: SeriesCache<S, C>, axis: AxisMode, tail_rows: usize) -> Self {
        Self {
            cache,
            series: SeriesId::all().collect(),
            selected: 0,
            axis,
            shared: None,
            table: None,
            failures: HashMap::new(),
            status: "Fetching data...".to_string(),
            tail_rows,
        }
    }

    /// Initial load: the shared ranges (common mode) and the first series.
    fn start(&mut self) {
        if self.axis == AxisMode::Common {
            self.load_shared();
        }
        self.load_selected();
    }

    fn selected_series(&self) -> SeriesId {
        self.series[self.selected]
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                    self.load_selected();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.series.len() {
                    self.selected += 1;
                    self.load_selected();
                }
            }
            KeyCode::Home => {
                self.selected = 0;
                self.load_selected();
            }
            KeyCode::End => {
                self.selected = self.series.len() - 1;
                self.load_selected();
            }
            KeyCode::Char('a') => {
                self.axis = self.axis.toggle();
                match self.axis {
                    AxisMode::Common => self.load_shared(),
                    AxisMode::Individual => {
                        self.shared = None;
                        self.status = format!("axis: {}", self.axis.display_name());
                    }
                }
            }
            KeyCode::Char('r') => {
                // Force a refetch: drop what the cache holds, then reload.
                match self.axis {
                    AxisMode::Common => {
                        self.cache.clear();
                        self.load_shared();
                    }
                    AxisMode::Individual => self.cache.invalidate(self.selected_series()),
                }
                self.load_selected();
            }
            _ => {}
        }
        false
    }

    fn load_selected(&mut self) {
        let id = self.selected_series();
        match self.cache.get_or_fetch(id) {
            Ok(table) => {
                self.failures.remove(&id);
                self.status = match table.last_period() {
                    Some(last) => format!("{id}: {} rows, latest {}", table.len(), last.format("%Y-%m")),
                    None => format!("{id}: no observations"),
                };
                self.table = Some(table);
            }
            Err(err) => {
                log::warn!("Failed to fetch data for series {id}: {err}");
                self.status = format!("Failed to fetch data for series {id}: {err}");
                self.failures.insert(id, err.to_string());
                self.table = None;
            }
        }
    }

    /// Fetch every series (cache hits are free) and derive the common ranges.
    fn load_shared(&mut self) {
        let outcomes = fetch_batch(&mut self.cache, self.series.iter().copied());
        let mut failed = 0usize;
        for (id, outcome) in &outcomes {
            match outcome {
                Ok(_) => {
                    self.failures.remove(id);
                }
                Err(err) => {
                    failed += 1;
                    self.failures.insert(*id, err.to_string());
                }
            }
        }
        self.shared = Some(compute_bounds_shared(outcomes.values().filter_map(|r| r.as_ref().ok())));
        self.status = if failed == 0 {
            format!("axis: {}", self.axis.display_name())
        } else {
            format!("axis: {} ({failed} series failed to load)", self.axis.display_name())
        };
    }

    /// Prepare both charts of the selected table under the current axis mode.
    fn charts(&self) -> Option<(Result<LineChart, RenderError>, Result<LineChart, RenderError>)> {
        let table = self.table.as_ref()?;
        let shared = self.shared.as_ref();
        Some((
            LineChart::volume(table, View::Single, shared.and_then(|b| b.volume)),
            LineChart::yoy(table, View::Single, shared.and_then(|b| b.yoy)),
        ))
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let id = self.selected_series();
        let lines = vec![
            Line::from(vec![
                Span::styled("hkr", Style::default().fg(Color::Cyan)),
                Span::raw(" | Hong Kong Monthly Retail Sales (volume indices)"),
            ]),
            Line::from(Span::styled(
                format!(
                    "series: {id} - {} | {} | cache ttl: {}s",
                    id.description(),
                    self.axis.display_name(),
                    self.cache.ttl().as_secs(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(44), Constraint::Min(0)])
            .split(area);

        self.draw_catalog(frame, chunks[0]);

        let preview_height = preview_height(self.tail_rows, chunks[1].height);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Fill(1), Constraint::Fill(1), Constraint::Length(preview_height)])
            .split(chunks[1]);

        let (volume, yoy) = match self.charts() {
            Some((v, y)) => (Some(v), Some(y)),
            None => (None, None),
        };
        self.draw_chart(frame, right[0], "Volume Index", volume, ChartKind::Volume);
        self.draw_chart(frame, right[1], "YoY Change (%)", yoy, ChartKind::Yoy);
        self.draw_preview(frame, right[2]);
    }

    fn draw_catalog(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .series
            .iter()
            .map(|id| {
                let text = format!("{:>3}  {}", id.code(), id.description());
                if self.failures.contains_key(id) {
                    ListItem::new(format!("{text} !")).style(Style::default().fg(Color::Red))
                } else {
                    ListItem::new(text)
                }
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Series").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_chart(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        title: &str,
        chart: Option<Result<LineChart, RenderError>>,
        kind: ChartKind,
    ) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let id = self.selected_series();
        let message = match chart {
            Some(Ok(chart)) => {
                frame.render_widget(SeriesChartWidget::new(&chart, kind), inner);
                return;
            }
            Some(Err(err)) => format!("Error loading {}: {err}", id.description()),
            None => match self.failures.get(&id) {
                Some(err) => format!("Failed to fetch data for series {id}: {err}"),
                None => "Waiting for data...".to_string(),
            },
        };
        let msg = Paragraph::new(message).style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
    }

    fn draw_preview(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let body = match &self.table {
            Some(table) => crate::report::format_tail(table, self.tail_rows),
            None => "-".to_string(),
        };
        let p = Paragraph::new(body).block(Block::default().title("Latest Data").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  a axis  r refetch  q quit";
        let status_style = if self.failures.contains_key(&self.selected_series()) {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, status_style),
            Span::raw(" | "),
            Span::styled("Source: C&SD, HKSAR", Style::default().fg(Color::DarkGray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Rows for the latest-data pane: header, tail rows, borders. Never more than
/// half of `available`, so the charts keep some room.
fn preview_height(tail_rows: usize, available: u16) -> u16 {
    let wanted = u16::try_from(tail_rows).unwrap_or(u16::MAX).saturating_add(4);
    wanted.min(available / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::testing::{FakeSource, ManualClock};

    fn id(code: &str) -> SeriesId {
        SeriesId::parse(code).unwrap()
    }

    fn app(source: &FakeSource, axis: AxisMode) -> App<FakeSource, ManualClock> {
        let cache = SeriesCache::with_clock(source.clone(), ManualClock::new(), Duration::from_secs(3600));
        let mut app = App::new(cache, axis, 5);
        app.start();
        app
    }

    #[test]
    fn start_loads_first_catalog_series() {
        let source = FakeSource::default();
        let app = app(&source, AxisMode::Individual);
        assert_eq!(app.selected_series(), id("2"));
        assert!(app.table.is_some());
        assert!(app.shared.is_none());
        assert_eq!(source.calls(id("2")), 1);
        assert_eq!(source.calls(id("8")), 0);
    }

    #[test]
    fn navigation_fetches_through_the_cache() {
        let source = FakeSource::default();
        let mut app = app(&source, AxisMode::Individual);
        assert!(!app.handle_key(KeyCode::Down));
        assert_eq!(app.selected_series(), id("8"));
        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Down);
        assert_eq!(source.calls(id("2")), 1);
        assert_eq!(source.calls(id("8")), 1);

        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Up);
        assert_eq!(app.selected, 0);
        app.handle_key(KeyCode::End);
        assert_eq!(app.selected_series(), id("40"));
    }

    #[test]
    fn fetch_failure_is_reported_not_fatal() {
        let source = FakeSource::default();
        source.fail(id("8"), FetchError::Status(503));
        let mut app = app(&source, AxisMode::Individual);

        assert!(!app.handle_key(KeyCode::Down));
        assert!(app.table.is_none());
        assert!(app.status.contains("series 8"));
        assert!(app.failures.contains_key(&id("8")));
        assert!(app.charts().is_none());

        source.recover(id("8"));
        app.handle_key(KeyCode::Char('r'));
        assert!(app.table.is_some());
        assert!(!app.failures.contains_key(&id("8")));
    }

    #[test]
    fn axis_toggle_loads_shared_bounds() {
        let source = FakeSource::default();
        source.fail(id("32"), FetchError::network("timed out"));
        let mut app = app(&source, AxisMode::Individual);

        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.axis, AxisMode::Common);
        let shared = app.shared.unwrap();
        assert!(shared.volume.is_some());
        assert!(app.failures.contains_key(&id("32")));
        assert!(app.status.contains("1 series failed"));

        let (volume, _) = app.charts().unwrap();
        assert_eq!(volume.unwrap().y_bounds, shared.volume.unwrap());

        app.handle_key(KeyCode::Char('a'));
        assert_eq!(app.axis, AxisMode::Individual);
        assert!(app.shared.is_none());
        // Toggling back and forth never refetches healthy series.
        assert_eq!(source.calls(id("2")), 1);
    }

    #[test]
    fn empty_series_renders_as_chart_error() {
        let source = FakeSource::default();
        source.set_table(SeriesTable::empty(id("2")));
        let app = app(&source, AxisMode::Individual);
        let (volume, yoy) = app.charts().unwrap();
        assert_eq!(volume, Err(RenderError::Empty));
        assert_eq!(yoy, Err(RenderError::Empty));
        assert!(app.status.contains("no observations"));
    }

    #[test]
    fn preview_height_is_clamped() {
        assert_eq!(preview_height(5, 40), 9);
        assert_eq!(preview_height(30, 40), 20);
        assert_eq!(preview_height(usize::MAX, 40), 20);
        assert_eq!(preview_height(65535, u16::MAX), u16::MAX / 2);
    }

    #[test]
    fn quit_keys_end_the_loop() {
        let source = FakeSource::default();
        let mut app = app(&source, AxisMode::Individual);
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
    }
}
