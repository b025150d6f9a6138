//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - the charted value and granularity enums (`Metric`, `Interval`)
//! - count records and their two data shapes (`CountEntry`, `SeriesData`)
//! - chart outputs (`Point`, `Series`) and article lookups (`QueryDate`, `ArticleRequest`)
//! - typed errors for loading and point lookups

pub mod errors;
pub mod types;

pub use errors::*;
pub use types::*;
