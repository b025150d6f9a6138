//! Formatted text for charts and terminal output.
//!
//! We keep formatting code in one place so:
//! - the data code stays free of presentation details
//! - output changes are localized (the TUI and CLI share these strings)

use crate::data::articles::TIMEOUT_MESSAGE;
use crate::data::{SeriesSource, SourceRegistry};
use crate::domain::{Article, ArticleOutcome, ArticleRequest, Interval, Metric, Point};

pub const CHART_TITLE: &str = "Australian newspaper articles by date";

pub fn x_axis_label(interval: Interval) -> &'static str {
    match interval {
        Interval::Year => "Year",
        Interval::Month => "Month",
    }
}

pub fn y_axis_label(metric: Metric) -> &'static str {
    match metric {
        Metric::Total => "Number of articles matching query",
        Metric::Ratio => "% of articles matching query",
    }
}

/// X tick label: `1900` for yearly charts, `Mar 1900` for monthly ones.
pub fn format_x_tick(interval: Interval, timestamp_ms: f64) -> String {
    let point = Point {
        timestamp_ms: timestamp_ms.round() as i64,
        value: None,
    };
    let Some(date) = point.date() else {
        return String::new();
    };
    match interval {
        Interval::Year => date.format("%Y").to_string(),
        Interval::Month => date.format("%b %Y").to_string(),
    }
}

/// Y tick label: ratios are shown as percentages with two decimals.
pub fn format_y_tick(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Ratio => format!("{:.2}", value * 100.0),
        Metric::Total => format_count(value),
    }
}

/// Whole counts without a fractional part, anything else as-is.
pub fn format_count(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Format `value` with `precision` significant digits, the way JavaScript's
/// `Number.prototype.toPrecision` does (exponent form for large exponents).
pub fn to_precision(value: f64, precision: usize) -> String {
    let precision = precision.clamp(1, 21);
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return if precision > 1 {
            format!("0.{}", "0".repeat(precision - 1))
        } else {
            "0".to_string()
        };
    }

    let p = precision as i32;
    let mut exp = value.abs().log10().floor() as i32;
    let mut digits = (value.abs() / 10f64.powi(exp - p + 1)).round();
    if digits >= 10f64.powi(p) {
        exp += 1;
        digits = (value.abs() / 10f64.powi(exp - p + 1)).round();
    }
    let sign = if value < 0.0 { "-" } else { "" };

    if exp < -6 || exp >= p {
        let s = format!("{digits:.0}");
        let (head, tail) = s.split_at(1);
        let mantissa = if tail.is_empty() {
            head.to_string()
        } else {
            format!("{head}.{tail}")
        };
        let exp_sign = if exp < 0 { "-" } else { "+" };
        return format!("{sign}{mantissa}e{exp_sign}{}", exp.abs());
    }

    let decimals = (p - 1 - exp).max(0) as usize;
    let rounded = digits * 10f64.powi(exp - p + 1);
    format!("{sign}{rounded:.decimals$}")
}

/// Date label of a point: `1900` or `Mar 1900`.
pub fn point_label(interval: Interval, point: &Point) -> String {
    format_x_tick(interval, point.timestamp_ms as f64)
}

/// Tooltip for one point of `source`, two lines: series name, then detail.
///
/// The secondary figure comes from a point lookup; when that lookup fails its
/// segment is left out.
pub fn format_tooltip(source: &SeriesSource, point: &Point, metric: Metric) -> String {
    let interval = source.interval();
    let (year, month) = source
        .query_date(point.timestamp_ms)
        .map(|date| (date.year(), date.month_or_zero()))
        .unwrap_or((0, 0));

    let Some(y) = point.value else {
        return format!("{}\n{}: no data", source.label, point_label(interval, point));
    };

    let display = match metric {
        Metric::Total => {
            let ratio = source
                .get_ratio(year, month)
                .map(|r| format!(" ({}% )", to_precision(r * 100.0, 2)))
                .unwrap_or_default();
            format!("{} articles{ratio}", format_count(y))
        }
        Metric::Ratio => {
            let total = source
                .get_total(year, month)
                .map(|t| format!(" ({} articles)", format_count(t)))
                .unwrap_or_default();
            format!("{}%{total}", to_precision(y * 100.0, 2))
        }
    };

    format!("{}\n{}: {display}", source.label, point_label(interval, point))
}

/// Short per-source summary used by `trends series`.
pub fn format_registry_summary(registry: &SourceRegistry, metric: Metric) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {CHART_TITLE} ===\n"));
    out.push_str(&format!("Metric: {metric} ({})\n", y_axis_label(metric)));
    out.push_str(&format!("Sources: {}\n", registry.len()));

    for (idx, source) in registry.iter().enumerate() {
        let points = source.make_series(metric);
        let values: Vec<f64> = points.iter().filter_map(|p| p.value).collect();
        let first = points.first().map(|p| point_label(source.interval(), p)).unwrap_or_default();
        let last = points.last().map(|p| point_label(source.interval(), p)).unwrap_or_default();

        out.push_str(&format!(
            "\n[{idx}] {} ({}ly, {} points, {first} - {last})\n",
            source.label,
            source.interval(),
            points.len(),
        ));
        if !source.api_query.is_empty() {
            out.push_str(&format!("    api query: {}\n", source.api_query));
        }
        let years = source.years();
        if let (Some(first), Some(last)) = (years.first(), years.last()) {
            out.push_str(&format!("    years: {first} .. {last} ({} with data)\n", years.len()));
        }
        if let (Some(min), Some(max)) = (
            values.iter().copied().reduce(f64::min),
            values.iter().copied().reduce(f64::max),
        ) {
            out.push_str(&format!(
                "    range: {} .. {}\n",
                format_value(metric, min),
                format_value(metric, max)
            ));
        }
    }
    out
}

/// One line per point: date and value (blank when unset).
pub fn format_series_table(source: &SeriesSource, metric: Metric) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", source.label));
    for point in source.make_series(metric) {
        let value = point.value.map(|v| format_value(metric, v)).unwrap_or_default();
        out.push_str(&format!("  {:<9} {value}\n", point_label(source.interval(), &point)));
    }
    out
}

fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Total => format_count(value),
        Metric::Ratio => format!("{}%", to_precision(value * 100.0, 2)),
    }
}

/// `‘Title’, Newspaper, 1900-03-02`
pub fn format_article(article: &Article) -> String {
    format!(
        "\u{2018}{}\u{2019}, {}, {}",
        article.title.trim(),
        article.newspaper_title.trim(),
        article.issue_date.trim()
    )
}

/// Lines describing an article outcome, shared by the CLI and the TUI panel.
pub fn article_lines(request: &ArticleRequest, outcome: &ArticleOutcome) -> Vec<String> {
    let mut lines = vec![format!("Articles from Trove: {} ({})", request.label, request.query_date)];
    match outcome {
        ArticleOutcome::Found { articles, .. } => {
            for article in articles {
                lines.push(format!("- {}", format_article(article)));
                if !article.url.is_empty() {
                    lines.push(format!("  {}", article.url));
                }
            }
        }
        ArticleOutcome::TimedOut { .. } => lines.push(TIMEOUT_MESSAGE.to_string()),
        ArticleOutcome::NoResults { upstream_error, .. } => {
            lines.push("No articles found.".to_string());
            if let Some(err) = upstream_error {
                lines.push(format!("Trove said: {err}"));
            }
        }
    }
    if let Some(url) = outcome.more_url() {
        lines.push(format!("> View more in Trove: {url}"));
    }
    lines
}

/// Message shown in place of articles when the request itself failed.
pub fn fetch_failed_line(request: &ArticleRequest, err: &crate::error::AppError) -> String {
    format!("Could not fetch articles for {} ({}): {err}", request.label, request.query_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountEntry, QueryDate, SeriesData, utc_month_start_ms};
    use indexmap::IndexMap;

    fn monthly() -> SeriesSource {
        let mut months = IndexMap::new();
        months.insert(3, CountEntry::new(5.0, 0.05));
        let mut years = IndexMap::new();
        years.insert(1900, months);
        SeriesSource::new("drought", "", "all=drought", SeriesData::Monthly(years))
    }

    #[test]
    fn to_precision_matches_javascript() {
        assert_eq!(to_precision(5.000000000000001, 2), "5.0");
        assert_eq!(to_precision(12.345, 2), "12");
        assert_eq!(to_precision(0.123, 2), "0.12");
        assert_eq!(to_precision(9.96, 2), "10");
        assert_eq!(to_precision(123.0, 2), "1.2e+2");
        assert_eq!(to_precision(99.96, 2), "1.0e+2");
        assert_eq!(to_precision(0.0, 2), "0.0");
        assert_eq!(to_precision(-0.5, 2), "-0.50");
    }

    #[test]
    fn tooltip_for_total_shows_ratio() {
        let source = monthly();
        let point = source.make_series(Metric::Total)[0];
        assert_eq!(format_tooltip(&source, &point, Metric::Total), "drought\nMar 1900: 5 articles (5.0% )");
    }

    #[test]
    fn tooltip_for_ratio_shows_total() {
        let source = monthly();
        let point = source.make_series(Metric::Ratio)[0];
        assert_eq!(format_tooltip(&source, &point, Metric::Ratio), "drought\nMar 1900: 5.0% (5 articles)");
    }

    #[test]
    fn tooltip_drops_segment_when_lookup_fails() {
        let source = monthly();
        let point = Point {
            timestamp_ms: utc_month_start_ms(1900, 4).unwrap(),
            value: Some(7.0),
        };
        assert_eq!(format_tooltip(&source, &point, Metric::Total), "drought\nApr 1900: 7 articles");
    }

    #[test]
    fn tick_formats() {
        let ts = utc_month_start_ms(1915, 4).unwrap() as f64;
        assert_eq!(format_x_tick(Interval::Year, ts), "1915");
        assert_eq!(format_x_tick(Interval::Month, ts), "Apr 1915");
        assert_eq!(format_y_tick(Metric::Ratio, 0.01234), "1.23");
        assert_eq!(format_y_tick(Metric::Total, 250.0), "250");
        assert_eq!(x_axis_label(Interval::Month), "Month");
        assert_eq!(y_axis_label(Metric::Ratio), "% of articles matching query");
    }

    #[test]
    fn article_lines_cover_each_outcome() {
        let request = ArticleRequest {
            label: "drought".to_string(),
            query_date: QueryDate::Month(1900, 3),
            api_query: "all=drought".to_string(),
        };

        let found = ArticleOutcome::Found {
            articles: vec![Article {
                url: "http://nla.gov.au/nla.news-article1".to_string(),
                title: "THE DROUGHT".to_string(),
                newspaper_title: "The Argus".to_string(),
                issue_date: "1900-03-02".to_string(),
            }],
            more_url: Some("http://trove".to_string()),
        };
        let lines = article_lines(&request, &found);
        assert_eq!(lines[0], "Articles from Trove: drought (1900/03)");
        assert_eq!(lines[1], "- \u{2018}THE DROUGHT\u{2019}, The Argus, 1900-03-02");
        assert_eq!(lines.last().unwrap(), "> View more in Trove: http://trove");

        let timed_out = ArticleOutcome::TimedOut { more_url: None };
        assert_eq!(article_lines(&request, &timed_out)[1], TIMEOUT_MESSAGE);
    }

    #[test]
    fn summary_lists_sources_in_order() {
        let registry: SourceRegistry = std::iter::once(monthly()).collect();
        let summary = format_registry_summary(&registry, Metric::Total);
        assert!(summary.contains("[0] drought (monthly, 1 points, Mar 1900 - Mar 1900)"));
        assert!(summary.contains("range: 5 .. 5"));
        assert!(summary.contains("years: 1900 .. 1900 (1 with data)"));
    }
}
