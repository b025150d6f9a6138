//! One named dataset of article counts.
//!
//! A `SeriesSource` is built once from a series file and only read afterwards.
//! It flattens the nested year (and month) counts into chart points and answers
//! the per-point lookups the tooltip needs.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::{
    CountEntry, Interval, LookupError, Metric, Point, QueryDate, SeriesData, SourceError,
    utc_month_start_ms, year_month_of,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSource {
    /// Display name of the series.
    pub label: String,
    /// Human-readable query (usually the Trove search URL).
    pub query: String,
    /// Query string understood by the article endpoint.
    pub api_query: String,
    data: SeriesData,
}

impl SeriesSource {
    pub fn new(
        label: impl Into<String>,
        query: impl Into<String>,
        api_query: impl Into<String>,
        data: SeriesData,
    ) -> Self {
        Self {
            label: label.into(),
            query: query.into(),
            api_query: api_query.into(),
            data,
        }
    }

    pub fn interval(&self) -> Interval {
        self.data.interval()
    }

    pub fn data(&self) -> &SeriesData {
        &self.data
    }

    /// Flatten the counts into `(timestamp, value)` points for `metric`.
    ///
    /// Points are ordered by timestamp. A missing metric field yields a point
    /// with an unset value rather than an error.
    pub fn make_series(&self, metric: Metric) -> Vec<Point> {
        let mut points = Vec::new();
        match &self.data {
            SeriesData::Yearly(years) => {
                for (&year, entry) in years {
                    if let Some(timestamp_ms) = utc_month_start_ms(year, 1) {
                        points.push(Point {
                            timestamp_ms,
                            value: entry.value(metric),
                        });
                    }
                }
            }
            SeriesData::Monthly(years) => {
                for (&year, months) in years {
                    for (&month, entry) in months {
                        if let Some(timestamp_ms) = utc_month_start_ms(year, month) {
                            points.push(Point {
                                timestamp_ms,
                                value: entry.value(metric),
                            });
                        }
                    }
                }
            }
        }
        points.sort_by_key(|p| p.timestamp_ms);
        points
    }

    /// Look up the counts for `year`, or for `year`/`month` when `month > 0`.
    pub fn lookup(&self, year: i32, month: u32) -> Result<&CountEntry, LookupError> {
        match (&self.data, month) {
            (SeriesData::Yearly(years), 0) => years.get(&year).ok_or(LookupError::MissingYear(year)),
            (SeriesData::Monthly(years), m) if m > 0 => years
                .get(&year)
                .ok_or(LookupError::MissingYear(year))?
                .get(&m)
                .ok_or(LookupError::MissingMonth { year, month: m }),
            _ => Err(LookupError::IntervalMismatch {
                interval: self.interval(),
            }),
        }
    }

    pub fn get_total(&self, year: i32, month: u32) -> Result<f64, LookupError> {
        self.get_value(Metric::Total, year, month)
    }

    pub fn get_ratio(&self, year: i32, month: u32) -> Result<f64, LookupError> {
        self.get_value(Metric::Ratio, year, month)
    }

    pub fn get_value(&self, metric: Metric, year: i32, month: u32) -> Result<f64, LookupError> {
        self.lookup(year, month)?
            .value(metric)
            .ok_or_else(|| LookupError::MissingMetric {
                metric,
                key: lookup_key(year, month),
            })
    }

    /// Year keys in ascending order.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = match &self.data {
            SeriesData::Yearly(y) => y.keys().copied().collect(),
            SeriesData::Monthly(y) => y.keys().copied().collect(),
        };
        years.sort_unstable();
        years
    }

    /// The article query date of a point on this series.
    pub fn query_date(&self, timestamp_ms: i64) -> Option<QueryDate> {
        let (year, month) = year_month_of(timestamp_ms)?;
        Some(match self.interval() {
            Interval::Year => QueryDate::Year(year),
            Interval::Month => QueryDate::Month(year, month),
        })
    }
}

fn lookup_key(year: i32, month: u32) -> String {
    if month > 0 {
        QueryDate::Month(year, month).to_string()
    } else {
        QueryDate::Year(year).to_string()
    }
}

/// Build typed counts from the raw `data` object of a series file.
///
/// Year keys must be numeric; for monthly data each year must hold a map of
/// month keys 1-12. A year shaped for the other interval is rejected.
pub fn parse_series_data(
    interval: Interval,
    raw: &IndexMap<String, Value>,
) -> Result<SeriesData, SourceError> {
    match interval {
        Interval::Year => {
            let mut years = IndexMap::with_capacity(raw.len());
            for (key, value) in raw {
                let year = parse_year(key)?;
                if !is_count_object(value) {
                    return Err(SourceError::ShapeMismatch {
                        year: key.clone(),
                        interval,
                    });
                }
                years.insert(year, parse_entry(key, value)?);
            }
            Ok(SeriesData::Yearly(years))
        }
        Interval::Month => {
            let mut years = IndexMap::with_capacity(raw.len());
            for (key, value) in raw {
                let year = parse_year(key)?;
                let Some(months_raw) = value.as_object() else {
                    return Err(SourceError::ShapeMismatch {
                        year: key.clone(),
                        interval,
                    });
                };
                let mut months = IndexMap::with_capacity(months_raw.len());
                for (month_key, entry) in months_raw {
                    if !is_count_object(entry) {
                        return Err(SourceError::ShapeMismatch {
                            year: key.clone(),
                            interval,
                        });
                    }
                    let month = parse_month(year, month_key)?;
                    let entry_key = format!("{year}/{month:02}");
                    months.insert(month, parse_entry(&entry_key, entry)?);
                }
                years.insert(year, months);
            }
            Ok(SeriesData::Monthly(years))
        }
    }
}

/// Inverse of [`parse_series_data`]: the `data` object as written to disk.
pub fn series_data_to_json(data: &SeriesData) -> Value {
    let mut out = serde_json::Map::new();
    match data {
        SeriesData::Yearly(years) => {
            for (year, entry) in years {
                out.insert(year.to_string(), entry_to_json(entry));
            }
        }
        SeriesData::Monthly(years) => {
            for (year, months) in years {
                let mut inner = serde_json::Map::new();
                for (month, entry) in months {
                    inner.insert(month.to_string(), entry_to_json(entry));
                }
                out.insert(year.to_string(), Value::Object(inner));
            }
        }
    }
    Value::Object(out)
}

fn entry_to_json(entry: &CountEntry) -> Value {
    serde_json::to_value(entry).unwrap_or(Value::Null)
}

fn parse_year(key: &str) -> Result<i32, SourceError> {
    key.trim()
        .parse::<i32>()
        .map_err(|_| SourceError::InvalidYear(key.to_string()))
}

fn parse_month(year: i32, key: &str) -> Result<u32, SourceError> {
    match key.trim().parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => Ok(m),
        _ => Err(SourceError::InvalidMonth {
            year,
            month: key.to_string(),
        }),
    }
}

/// A count record is an object with no nested objects inside it.
fn is_count_object(value: &Value) -> bool {
    value
        .as_object()
        .map(|obj| obj.values().all(|v| !v.is_object()))
        .unwrap_or(false)
}

fn parse_entry(key: &str, value: &Value) -> Result<CountEntry, SourceError> {
    CountEntry::deserialize(value).map_err(|e| SourceError::InvalidEntry {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
