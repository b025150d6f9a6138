//! Chart data preparation shared by the ASCII plot and the TUI chart.

pub mod ascii;

pub use ascii::{render_ascii_plot, series_glyph};

use crate::domain::{Point, Series};

const HALF_YEAR_MS: f64 = 182.5 * 24.0 * 3600.0 * 1000.0;

/// Split a series at unset values into runs of `(timestamp_ms, value)`.
pub fn segments(points: &[Point]) -> Vec<Vec<(f64, f64)>> {
    let mut out = Vec::new();
    let mut current = Vec::new();
    for p in points {
        match p.value {
            Some(v) if v.is_finite() => current.push((p.timestamp_ms as f64, v)),
            _ => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// X bounds covering every point; a single instant is widened by half a year
/// each side.
pub fn time_bounds(series: &[Series]) -> [f64; 2] {
    let (mut t0, mut t1) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in series.iter().flat_map(|s| &s.points) {
        let t = p.timestamp_ms as f64;
        t0 = t0.min(t);
        t1 = t1.max(t);
    }
    if !(t0.is_finite() && t1.is_finite()) {
        return [0.0, 1.0];
    }
    if t1 <= t0 {
        return [t0 - HALF_YEAR_MS, t1 + HALF_YEAR_MS];
    }
    [t0, t1]
}

/// Y bounds anchored at zero with 5% headroom above the largest value.
pub fn value_bounds(series: &[Series]) -> [f64; 2] {
    let mut y_min = 0.0_f64;
    let mut y_max = f64::NEG_INFINITY;
    for v in series.iter().flat_map(|s| &s.points).filter_map(|p| p.value) {
        if v.is_finite() {
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
    }
    if !y_max.is_finite() || y_max <= y_min {
        return [y_min, y_min + 1.0];
    }
    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    [y_min, y_max + pad]
}
