//! Ratatui-based terminal UI.
//!
//! Charts every loaded series, shows a tooltip for the selected point and lists
//! the matching Trove articles once a point is fetched (Enter or mouse click).

use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Terminal,
};

use crate::data::{ArticleClient, SourceRegistry};
use crate::domain::{ArticleRequest, Interval, Metric, Point, Series, ViewConfig};
use crate::error::AppError;
use crate::plot::{segments, time_bounds, value_bounds};
use crate::report::{
    article_lines, fetch_failed_line, format_tooltip, format_x_tick, format_y_tick, x_axis_label,
    y_axis_label, CHART_TITLE,
};

mod fetch;
mod plotters_chart;

use fetch::{ArticleFetcher, FetchArticles};
use plotters_chart::{legend_color, TrendsChart};

/// Start the TUI.
pub fn run(registry: SourceRegistry, client: ArticleClient, config: &ViewConfig) -> Result<(), AppError> {
    tracing::info!(sources = registry.len(), endpoint = client.endpoint(), "starting TUI");
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(registry, ArticleFetcher::new(client), config.metric);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

/// Where the chart was last drawn, for mapping mouse clicks back to points.
#[derive(Debug, Clone, Copy)]
struct ChartGeometry {
    chart: Rect,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

struct App<F> {
    registry: SourceRegistry,
    interval: Interval,
    metric: Metric,
    series: Vec<Series>,
    segments: Vec<Vec<Vec<(f64, f64)>>>,
    selected_series: usize,
    selected_point: usize,
    fetcher: ArticleFetcher<F>,
    pending: Option<ArticleRequest>,
    panel: Vec<String>,
    status: String,
    geometry: Option<ChartGeometry>,
}

impl<F: FetchArticles> App<F> {
    fn new(registry: SourceRegistry, fetcher: ArticleFetcher<F>, metric: Metric) -> Self {
        let interval = registry.interval().unwrap_or(Interval::Year);
        let mut app = Self {
            registry,
            interval,
            metric,
            series: Vec::new(),
            segments: Vec::new(),
            selected_series: 0,
            selected_point: 0,
            fetcher,
            pending: None,
            panel: Vec::new(),
            status: "Select a point and press Enter to list its articles.".to_string(),
            geometry: None,
        };
        app.rebuild_series();
        app
    }

    fn rebuild_series(&mut self) {
        self.series = self.registry.list_series(self.metric);
        self.segments = self.series.iter().map(|s| segments(&s.points)).collect();
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_fetch() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                        self.handle_click(mouse.column, mouse.row);
                        needs_redraw = true;
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the UI should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.move_point(-1),
            KeyCode::Right => self.move_point(1),
            KeyCode::Up => self.move_series(-1),
            KeyCode::Down | KeyCode::Tab => self.move_series(1),
            KeyCode::Home => self.selected_point = 0,
            KeyCode::End => {
                self.selected_point = self.current_points().len().saturating_sub(1);
            }
            KeyCode::Char('m') => {
                self.metric = self.metric.toggle();
                self.rebuild_series();
                tracing::info!(metric = %self.metric, "metric changed");
                self.status = format!("metric: {} ({})", self.metric, y_axis_label(self.metric));
            }
            KeyCode::Enter => self.fetch_selected(),
            _ => {}
        }
        false
    }

    fn handle_click(&mut self, column: u16, row: u16) {
        let Some(geometry) = self.geometry else {
            return;
        };
        let Some((series, point)) = nearest_point(&self.series, geometry, column, row) else {
            return;
        };
        self.selected_series = series;
        self.selected_point = point;
        self.fetch_selected();
    }

    fn current_points(&self) -> &[Point] {
        self.series
            .get(self.selected_series)
            .map(|s| s.points.as_slice())
            .unwrap_or(&[])
    }

    fn current_point(&self) -> Option<&Point> {
        self.current_points().get(self.selected_point)
    }

    fn move_point(&mut self, delta: isize) {
        let len = self.current_points().len();
        if len == 0 {
            return;
        }
        let next = self.selected_point as isize + delta;
        self.selected_point = next.clamp(0, len as isize - 1) as usize;
    }

    /// Switch series, keeping the cursor at the closest date.
    fn move_series(&mut self, delta: isize) {
        let count = self.series.len();
        if count == 0 {
            return;
        }
        let at = self.current_point().map(|p| p.timestamp_ms);
        self.selected_series = (self.selected_series as isize + delta).rem_euclid(count as isize) as usize;
        self.selected_point = at
            .map(|ts| nearest_in_time(self.current_points(), ts))
            .unwrap_or(0);
    }

    fn fetch_selected(&mut self) {
        let Some(point) = self.current_point() else {
            self.status = "No point selected.".to_string();
            return;
        };
        let Some(request) = self.registry.resolve(self.selected_series, point.timestamp_ms) else {
            self.status = "Could not resolve the selected point.".to_string();
            return;
        };

        self.status = format!("Fetching articles for {} ({})...", request.label, request.query_date);
        self.panel = vec![self.status.clone()];
        self.fetcher.request(request.clone());
        self.pending = Some(request);
    }

    /// Apply the latest article response, if any. Returns `true` on change.
    fn poll_fetch(&mut self) -> bool {
        let Some(resp) = self.fetcher.poll() else {
            return false;
        };
        self.pending = None;
        match resp.result {
            Ok(outcome) => {
                self.panel = article_lines(&resp.request, &outcome);
                self.status = format!("Articles for {} ({}).", resp.request.label, resp.request.query_date);
            }
            Err(err) => {
                tracing::warn!(error = %err, query_date = %resp.request.query_date, "article fetch failed");
                self.panel = vec![fetch_failed_line(&resp.request, &err)];
                self.status = "Article fetch failed.".to_string();
            }
        }
        true
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(12),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_panel(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("trends", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" | {CHART_TITLE} | ")),
            Span::styled(y_axis_label(self.metric), Style::default().fg(Color::Gray)),
        ]));

        let mut legend = Vec::new();
        for (idx, s) in self.series.iter().enumerate() {
            let mut style = Style::default().fg(legend_color(idx));
            if idx == self.selected_series {
                style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
            }
            legend.push(Span::styled(format!("\u{25a0} {}", s.name), style));
            legend.push(Span::raw("  "));
        }
        lines.push(Line::from(legend));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("{} over time", self.metric))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.series.iter().all(|s| s.points.is_empty()) {
            let msg = Paragraph::new("No data points.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            self.geometry = None;
            return;
        }

        let x_bounds = time_bounds(&self.series);
        let y_bounds = value_bounds(&self.series);
        let cursor = self
            .current_point()
            .and_then(|p| p.value.map(|v| (p.timestamp_ms as f64, v)));

        let (chart_rect, insets) = chart_layout(inner);
        let widget = TrendsChart {
            series: &self.segments,
            cursor,
            x_bounds,
            y_bounds,
            interval: self.interval,
            metric: self.metric,
        };

        frame.render_widget(widget, chart_rect);
        if let Some(insets) = insets {
            draw_axis_ticks(frame, inner, chart_rect, insets, self.interval, self.metric, x_bounds, y_bounds);
        }
        self.geometry = Some(ChartGeometry {
            chart: chart_rect,
            x_bounds,
            y_bounds,
        });
    }

    fn draw_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();

        if let (Some(source), Some(point)) = (self.registry.get(self.selected_series), self.current_point()) {
            let tooltip = format_tooltip(source, point, self.metric);
            let mut tooltip_lines = tooltip.lines();
            if let Some(name) = tooltip_lines.next() {
                lines.push(Line::from(Span::styled(
                    name.to_string(),
                    Style::default()
                        .fg(legend_color(self.selected_series))
                        .add_modifier(Modifier::BOLD),
                )));
            }
            for line in tooltip_lines {
                lines.push(Line::from(line.to_string()));
            }
        }

        if !self.panel.is_empty() {
            lines.push(Line::from(""));
            let style = if self.pending.is_some() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            for line in &self.panel {
                lines.push(Line::from(Span::styled(line.clone(), style)));
            }
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Point").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ point  ↑/↓ series  m metric  Enter/click articles  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Index of the point closest in time to `timestamp_ms`.
fn nearest_in_time(points: &[Point], timestamp_ms: i64) -> usize {
    points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| (p.timestamp_ms - timestamp_ms).unsigned_abs())
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

/// The charted point drawn closest to a terminal cell, as `(series, point)`.
///
/// Rows are weighted double since terminal cells are about twice as tall as
/// they are wide. Points without a value are not drawn and cannot be hit.
fn nearest_point(series: &[Series], geometry: ChartGeometry, column: u16, row: u16) -> Option<(usize, usize)> {
    let ChartGeometry {
        chart,
        x_bounds: [x0, x1],
        y_bounds: [y0, y1],
    } = geometry;

    let inside = column >= chart.x
        && column < chart.x + chart.width
        && row >= chart.y
        && row < chart.y + chart.height;
    if !inside || x1 <= x0 || y1 <= y0 {
        return None;
    }

    let w = chart.width.saturating_sub(1).max(1) as f64;
    let h = chart.height.saturating_sub(1).max(1) as f64;
    let (cx, cy) = (column as f64, row as f64);

    let mut best: Option<((usize, usize), f64)> = None;
    for (si, s) in series.iter().enumerate() {
        for (pi, p) in s.points.iter().enumerate() {
            let Some(v) = p.value else { continue };
            let px = chart.x as f64 + (p.timestamp_ms as f64 - x0) / (x1 - x0) * w;
            let py = chart.y as f64 + h - (v - y0) / (y1 - y0) * h;
            let d = (px - cx).powi(2) + (2.0 * (py - cy)).powi(2);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some(((si, pi), d));
            }
        }
    }
    best.map(|(hit, _)| hit)
}

#[derive(Debug, Clone, Copy)]
struct AxisInsets {
    left: u16,
    right: u16,
    top: u16,
    bottom: u16,
}

fn chart_layout(inner: Rect) -> (Rect, Option<AxisInsets>) {
    let insets = AxisInsets {
        left: 9,
        right: 2,
        top: 1,
        bottom: 2,
    };

    if inner.width <= insets.left + insets.right + 10
        || inner.height <= insets.top + insets.bottom + 5
    {
        return (inner, None);
    }

    let rect = Rect {
        x: inner.x + insets.left,
        y: inner.y + insets.top,
        width: inner.width - insets.left - insets.right,
        height: inner.height - insets.top - insets.bottom,
    };

    (rect, Some(insets))
}

#[allow(clippy::too_many_arguments)]
fn draw_axis_ticks(
    frame: &mut ratatui::Frame<'_>,
    inner: Rect,
    chart: Rect,
    insets: AxisInsets,
    interval: Interval,
    metric: Metric,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
) {
    let ticks = 5usize;
    let style = Style::default().fg(Color::Gray);

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let x_val = x_bounds[0] + u * (x_bounds[1] - x_bounds[0]);
        let x = chart.x + ((chart.width - 1) as f64 * u).round() as u16;
        let label = format_x_tick(interval, x_val);
        let label_len = label.chars().count() as u16;
        let start = x.saturating_sub(label_len / 2).max(inner.x);
        let y = chart.y + chart.height;
        if y >= inner.y + inner.height - 1 {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len.min(inner.x + inner.width - start),
                height: 1,
            },
        );
    }

    for i in 0..ticks {
        let u = i as f64 / (ticks as f64 - 1.0);
        let y_val = y_bounds[0] + u * (y_bounds[1] - y_bounds[0]);
        let y = chart.y + (chart.height - 1) - ((chart.height - 1) as f64 * u).round() as u16;
        let label = format_y_tick(metric, y_val);
        let label_len = label.len() as u16;
        let x = inner.x + insets.left.saturating_sub(1);
        let start = x.saturating_sub(label_len);
        if start < inner.x {
            continue;
        }
        frame.render_widget(
            Paragraph::new(label).style(style),
            Rect {
                x: start,
                y,
                width: label_len,
                height: 1,
            },
        );
    }

    let x_label = Paragraph::new(x_axis_label(interval))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
    let x_rect = Rect {
        x: chart.x,
        y: chart.y + chart.height + 1,
        width: chart.width,
        height: 1,
    };
    if x_rect.y < inner.y + inner.height {
        frame.render_widget(x_label, x_rect);
    }

    let y_label = Paragraph::new(metric.as_str())
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let y_rect = Rect {
        x: inner.x,
        y: inner.y,
        width: insets.left.saturating_sub(1),
        height: 1,
    };
    frame.render_widget(y_label, y_rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SeriesSource;
    use crate::domain::{ArticleOutcome, CountEntry, QueryDate, SeriesData, utc_month_start_ms};
    use indexmap::IndexMap;
    use std::thread;
    use std::time::Instant;

    #[derive(Clone)]
    struct EmptyClient;

    impl FetchArticles for EmptyClient {
        fn fetch_articles(&self, _request: &ArticleRequest) -> Result<ArticleOutcome, AppError> {
            Ok(ArticleOutcome::NoResults {
                more_url: Some("http://trove.nla.gov.au/".to_string()),
                upstream_error: None,
            })
        }
    }

    fn yearly(label: &str, values: &[(i32, f64)]) -> SeriesSource {
        let data: IndexMap<i32, CountEntry> = values
            .iter()
            .map(|&(y, t)| (y, CountEntry::new(t, t / 100.0)))
            .collect();
        SeriesSource::new(label, "", format!("q={label}"), SeriesData::Yearly(data))
    }

    fn app() -> App<EmptyClient> {
        let registry: SourceRegistry = [
            yearly("floods", &[(1900, 10.0), (1901, 5.0), (1902, 8.0)]),
            yearly("drought", &[(1901, 2.0), (1903, 4.0)]),
        ]
        .into_iter()
        .collect();
        App::new(registry, ArticleFetcher::new(EmptyClient), Metric::Total)
    }

    #[test]
    fn cursor_moves_within_series_and_keeps_date_across_series() {
        let mut app = app();
        app.handle_key(KeyCode::Left);
        assert_eq!(app.selected_point, 0);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.selected_point, 2);

        // 1902 on "floods" -> closest on "drought" is 1901 (tie resolved to the first).
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected_series, 1);
        assert_eq!(app.selected_point, 0);

        // Wraps around.
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.selected_series, 0);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn metric_toggle_rebuilds_series() {
        let mut app = app();
        assert_eq!(app.current_point().unwrap().value, Some(10.0));
        app.handle_key(KeyCode::Char('m'));
        assert_eq!(app.metric, Metric::Ratio);
        assert_eq!(app.current_point().unwrap().value, Some(0.1));
        assert_eq!(app.segments.len(), 2);
    }

    #[test]
    fn enter_fetches_selected_point_and_shows_result() {
        let mut app = app();
        app.handle_key(KeyCode::Right);
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.pending.as_ref().unwrap().query_date, QueryDate::Year(1901));

        let deadline = Instant::now() + Duration::from_secs(5);
        while !app.poll_fetch() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(app.pending.is_none());
        assert_eq!(app.panel[0], "Articles from Trove: floods (1901)");
        assert!(app.panel.iter().any(|l| l == "No articles found."));
    }

    #[test]
    fn click_selects_nearest_drawn_point() {
        let series = vec![Series {
            name: "s".to_string(),
            points: vec![
                Point {
                    timestamp_ms: utc_month_start_ms(1900, 1).unwrap(),
                    value: Some(0.0),
                },
                Point {
                    timestamp_ms: utc_month_start_ms(1901, 1).unwrap(),
                    value: None,
                },
                Point {
                    timestamp_ms: utc_month_start_ms(1902, 1).unwrap(),
                    value: Some(10.0),
                },
            ],
        }];
        let geometry = ChartGeometry {
            chart: Rect::new(10, 5, 41, 11),
            x_bounds: time_bounds(&series),
            y_bounds: [0.0, 10.0],
        };

        // Top-right corner is the 1902 point.
        assert_eq!(nearest_point(&series, geometry, 50, 5), Some((0, 2)));
        // Middle of the chart: the unset 1901 point is skipped.
        let hit = nearest_point(&series, geometry, 30, 10).unwrap();
        assert_ne!(hit, (0, 1));
        // Outside the chart.
        assert_eq!(nearest_point(&series, geometry, 2, 2), None);
    }

    #[test]
    fn chart_layout_falls_back_on_small_areas() {
        let (rect, insets) = chart_layout(Rect::new(0, 0, 15, 6));
        assert!(insets.is_none());
        assert_eq!(rect, Rect::new(0, 0, 15, 6));

        let (rect, insets) = chart_layout(Rect::new(0, 0, 80, 20));
        assert!(insets.is_some());
        assert_eq!(rect, Rect::new(9, 1, 69, 17));
    }
}
