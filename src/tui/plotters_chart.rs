//! Plotters-powered article-count chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{Interval, Metric};
use crate::report::{format_x_tick, format_y_tick};

/// Series colours, high-contrast for terminal readability.
const PALETTE: [(u8, u8, u8); 6] = [
    (0, 255, 255),
    (255, 170, 0),
    (0, 255, 0),
    (255, 85, 255),
    (85, 170, 255),
    (255, 85, 85),
];

const CURSOR: (u8, u8, u8) = (255, 255, 0);

fn palette(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}

/// Plotters colour of the series at `index`.
pub fn series_color(index: usize) -> RGBColor {
    let (r, g, b) = palette(index);
    RGBColor(r, g, b)
}

/// Ratatui colour of the series at `index` (legend, tooltip).
pub fn legend_color(index: usize) -> Color {
    let (r, g, b) = palette(index);
    Color::Rgb(r, g, b)
}

/// A lightweight, render-only chart description.
///
/// All segments and bounds are computed outside the render call.
pub struct TrendsChart<'a> {
    /// Per series, the runs of `(timestamp_ms, value)` between unset values.
    pub series: &'a [Vec<Vec<(f64, f64)>>],
    /// Selected point, drawn on top of everything else.
    pub cursor: Option<(f64, f64)>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub interval: Interval,
    pub metric: Metric,
}

impl<'a> Widget for TrendsChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let interval = self.interval;
        let metric = self.metric;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Tick labels are drawn by the TUI around the chart; the mesh only
            // contributes the axes.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format_x_tick(interval, *v))
                .y_label_formatter(&|v| format_y_tick(metric, *v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            for (idx, segments) in self.series.iter().enumerate() {
                let color = series_color(idx);
                for segment in segments {
                    chart.draw_series(LineSeries::new(segment.iter().copied(), &color))?;
                }
                // A run of one point has no line; the marker keeps it visible.
                chart.draw_series(
                    segments
                        .iter()
                        .flatten()
                        .map(|&(x, y)| Pixel::new((x, y), color)),
                )?;
            }

            // `Circle` radii are mis-scaled by the ratatui backend, so the
            // cursor is a plain pixel.
            if let Some((x, y)) = self.cursor {
                let (r, g, b) = CURSOR;
                chart.draw_series(std::iter::once(Pixel::new((x, y), RGBColor(r, g, b))))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_and_matches_legend() {
        assert_eq!(series_color(0), series_color(PALETTE.len()));
        let RGBColor(r, g, b) = series_color(1);
        assert_eq!(legend_color(1), Color::Rgb(r, g, b));
    }

    fn cells_in_series_color(series: &[Vec<Vec<(f64, f64)>>]) -> usize {
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        let chart = TrendsChart {
            series,
            cursor: None,
            x_bounds: [0.0, 10.0],
            y_bounds: [0.0, 10.0],
            interval: Interval::Year,
            metric: Metric::Total,
        };
        chart.render(area, &mut buf);
        buf.content().iter().filter(|cell| cell.fg == legend_color(0)).count()
    }

    #[test]
    fn lone_points_are_drawn() {
        assert!(cells_in_series_color(&[vec![vec![(5.0, 5.0)]]]) > 0);
        assert!(cells_in_series_color(&[vec![vec![(2.0, 3.0)], vec![(8.0, 7.0)]]]) > 0);
        assert!(cells_in_series_color(&[vec![vec![(2.0, 3.0), (8.0, 7.0)]]]) > 0);
    }

    #[test]
    fn tiny_area_renders_hint() {
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(area);
        let chart = TrendsChart {
            series: &[],
            cursor: None,
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            interval: Interval::Year,
            metric: Metric::Total,
        };
        chart.render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "C");
    }
}
