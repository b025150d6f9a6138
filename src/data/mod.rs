//! Article-count data and the remote article endpoint.
//!
//! - `source`: one named dataset and its derived series/lookups
//! - `registry`: the ordered set of sources feeding a chart
//! - `query`: Trove search URL -> endpoint query conversion
//! - `articles`: blocking client for the article endpoint

pub mod articles;
pub mod query;
pub mod registry;
pub mod source;

pub use articles::ArticleClient;
pub use registry::SourceRegistry;
pub use source::SeriesSource;
