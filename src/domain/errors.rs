//! Typed domain errors.

use thiserror::Error;

use super::types::{Interval, Metric};

/// A series file whose `data` does not fit its declared interval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("invalid year key '{0}' (expected a number)")]
    InvalidYear(String),

    #[error("invalid month key '{month}' in year {year} (expected 1-12)")]
    InvalidMonth { year: i32, month: String },

    #[error("data for year {year} does not match interval '{interval}'")]
    ShapeMismatch { year: String, interval: Interval },

    #[error("invalid counts for {key}: {reason}")]
    InvalidEntry { key: String, reason: String },
}

/// A point lookup that could not be answered from the loaded data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no data for year {0}")]
    MissingYear(i32),

    #[error("no data for {year}/{month:02}")]
    MissingMonth { year: i32, month: u32 },

    #[error("lookup does not match the source interval '{interval}'")]
    IntervalMismatch { interval: Interval },

    #[error("no {metric} recorded for {key}")]
    MissingMetric { metric: Metric, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric '{0}' (expected 'total' or 'ratio')")]
pub struct MetricParseError(pub String);
