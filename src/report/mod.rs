//! Reporting utilities: tooltip text, axis labels, summaries and article listings.

pub mod format;

pub use format::*;
