//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so the same
//! values flow through file loading, the chart front-ends and CSV export.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::errors::MetricParseError;

/// Which value of a count entry is charted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Raw number of articles matching the query.
    Total,
    /// Matching articles as a proportion of all articles in the period.
    Ratio,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Total => "total",
            Metric::Ratio => "ratio",
        }
    }

    /// The other metric (the TUI toggles between the two).
    pub fn toggle(self) -> Self {
        match self {
            Metric::Total => Metric::Ratio,
            Metric::Ratio => Metric::Total,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = MetricParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" => Ok(Metric::Total),
            "ratio" => Ok(Metric::Ratio),
            other => Err(MetricParseError(other.to_string())),
        }
    }
}

/// Time granularity of a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Year,
    Month,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Year => "year",
            Interval::Month => "month",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Article counts for one year or one month.
///
/// Either field may be absent in the input; an absent field is charted as a gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CountEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
}

impl CountEntry {
    pub fn new(total: f64, ratio: f64) -> Self {
        Self {
            total: Some(total),
            ratio: Some(ratio),
        }
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Total => self.total,
            Metric::Ratio => self.ratio,
        }
    }
}

/// The two valid shapes of a source's counts, keyed by interval.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    /// year -> counts
    Yearly(IndexMap<i32, CountEntry>),
    /// year -> month (1-12) -> counts
    Monthly(IndexMap<i32, IndexMap<u32, CountEntry>>),
}

impl SeriesData {
    pub fn interval(&self) -> Interval {
        match self {
            SeriesData::Yearly(_) => Interval::Year,
            SeriesData::Monthly(_) => Interval::Month,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SeriesData::Yearly(years) => years.is_empty(),
            SeriesData::Monthly(years) => years.values().all(|months| months.is_empty()),
        }
    }
}

/// One chart point: UTC-midnight of the 1st of the month, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub timestamp_ms: i64,
    /// `None` marks an unset value; renderers leave a gap.
    pub value: Option<f64>,
}

impl Point {
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.datetime().map(|dt| dt.date_naive())
    }
}

/// Epoch milliseconds of UTC midnight on the 1st of `month` in `year`.
pub fn utc_month_start_ms(year: i32, month: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis())
}

/// Year and month (1-12) of an epoch-millisecond timestamp, in UTC.
pub fn year_month_of(timestamp_ms: i64) -> Option<(i32, u32)> {
    let dt = DateTime::from_timestamp_millis(timestamp_ms)?;
    Some((dt.year(), dt.month()))
}

/// A named series as handed to a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

/// Date key used to request the articles behind a chart point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryDate {
    Year(i32),
    Month(i32, u32),
}

impl QueryDate {
    pub fn year(self) -> i32 {
        match self {
            QueryDate::Year(y) | QueryDate::Month(y, _) => y,
        }
    }

    /// Month number, or `0` for a yearly date (the lookup sentinel).
    pub fn month_or_zero(self) -> u32 {
        match self {
            QueryDate::Year(_) => 0,
            QueryDate::Month(_, m) => m,
        }
    }
}

impl fmt::Display for QueryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryDate::Year(y) => write!(f, "{y}"),
            QueryDate::Month(y, m) => write!(f, "{y}/{m:02}"),
        }
    }
}

impl FromStr for QueryDate {
    type Err = String;

    /// Parse `YYYY` or `YYYY/MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, month) = match s.split_once('/') {
            Some((y, m)) => (y, Some(m)),
            None => (s, None),
        };
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in query date '{s}'"))?;
        match month {
            None => Ok(QueryDate::Year(year)),
            Some(m) => {
                let month: u32 = m
                    .parse()
                    .map_err(|_| format!("invalid month in query date '{s}'"))?;
                if !(1..=12).contains(&month) {
                    return Err(format!("month out of range in query date '{s}'"));
                }
                Ok(QueryDate::Month(year, month))
            }
        }
    }
}

/// Everything needed to ask the article endpoint about one chart point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRequest {
    /// Label of the owning series (for display only).
    pub label: String,
    pub query_date: QueryDate,
    pub api_query: String,
}

/// One article returned by the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub newspaper_title: String,
    #[serde(default)]
    pub issue_date: String,
}

/// Classified result of a successful article request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleOutcome {
    Found {
        articles: Vec<Article>,
        more_url: Option<String>,
    },
    /// Upstream reported its known timeout signature.
    TimedOut { more_url: Option<String> },
    NoResults {
        more_url: Option<String>,
        upstream_error: Option<String>,
    },
}

impl ArticleOutcome {
    pub fn more_url(&self) -> Option<&str> {
        match self {
            ArticleOutcome::Found { more_url, .. }
            | ArticleOutcome::TimedOut { more_url }
            | ArticleOutcome::NoResults { more_url, .. } => more_url.as_deref(),
        }
    }
}

/// Resolved settings shared by the CLI and the TUI.
#[derive(Debug, Clone)]
pub struct ViewConfig {
    pub files: Vec<PathBuf>,
    pub metric: Metric,
    /// Overrides the environment / built-in article endpoint when set.
    pub endpoint: Option<String>,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export: Option<PathBuf>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            metric: Metric::Ratio,
            endpoint: None,
            plot_width: 100,
            plot_height: 25,
            export: None,
        }
    }
}
