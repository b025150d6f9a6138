//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - data points: one glyph per series (`*`, `o`, `+`, ...)
//! - connecting lines: `.`
//! - unset values break the line

use crate::domain::{Interval, Metric, Series};
use crate::report::{format_x_tick, format_y_tick, y_axis_label};

use super::{segments, time_bounds, value_bounds};

const GLYPHS: [char; 8] = ['*', 'o', '+', 'x', '#', '@', '%', '&'];

/// Glyph used for the series at `index`.
pub fn series_glyph(index: usize) -> char {
    GLYPHS[index % GLYPHS.len()]
}

/// Render every series on one shared grid, followed by a legend.
pub fn render_ascii_plot(
    series: &[Series],
    interval: Interval,
    metric: Metric,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let [t_min, t_max] = time_bounds(series);
    let [y_min, y_max] = value_bounds(series);

    let mut grid = vec![vec![' '; width]; height];

    // Lines first so points can overlay.
    for s in series {
        for segment in segments(&s.points) {
            let mut prev = None;
            for &(t, y) in &segment {
                let x = map_x(t, t_min, t_max, width);
                let yy = map_y(y, y_min, y_max, height);
                if let Some((x0, y0)) = prev {
                    draw_line(&mut grid, x0, y0, x, yy, '.');
                }
                prev = Some((x, yy));
            }
        }
    }

    for (idx, s) in series.iter().enumerate() {
        let glyph = series_glyph(idx);
        for p in &s.points {
            let Some(y) = p.value else { continue };
            let x = map_x(p.timestamp_ms as f64, t_min, t_max, width);
            let yy = map_y(y, y_min, y_max, height);
            grid[yy][x] = glyph;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {} .. {} | y=[{}, {}] {}\n",
        format_x_tick(interval, t_min),
        format_x_tick(interval, t_max),
        format_y_tick(metric, y_min),
        format_y_tick(metric, y_max),
        y_axis_label(metric),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    for (idx, s) in series.iter().enumerate() {
        out.push_str(&format!("{} {}\n", series_glyph(idx), s.name));
    }

    out
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Point, utc_month_start_ms};

    fn point(year: i32, value: Option<f64>) -> Point {
        Point {
            timestamp_ms: utc_month_start_ms(year, 1).unwrap(),
            value,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let series = vec![Series {
            name: "floods".to_string(),
            points: vec![point(1900, Some(10.0)), point(1901, Some(5.0))],
        }];

        let txt = render_ascii_plot(&series, Interval::Year, Metric::Total, 10, 5);
        let expected = concat!(
            "Plot: 1900 .. 1901 | y=[0, 10.5] Number of articles matching query\n",
            "*..       \n",
            "   ....   \n",
            "       ..*\n",
            "          \n",
            "          \n",
            "* floods\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn gaps_break_the_line_and_series_get_distinct_glyphs() {
        let series = vec![
            Series {
                name: "a".to_string(),
                points: vec![point(1900, Some(4.0)), point(1901, None), point(1902, Some(4.0))],
            },
            Series {
                name: "b".to_string(),
                points: vec![point(1901, Some(0.0))],
            },
        ];

        let txt = render_ascii_plot(&series, Interval::Year, Metric::Total, 11, 5);
        let rows: Vec<&str> = txt.lines().collect();
        // No connecting dots on the row of series "a": the unset 1901 value splits it.
        assert_eq!(rows[1], "*         *");
        assert_eq!(rows[5], "     o     ");
        assert_eq!(rows[6], "* a");
        assert_eq!(rows[7], "o b");
    }
}
