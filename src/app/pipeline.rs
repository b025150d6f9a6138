//! Shared loading logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve files -> read series files -> registry -> article request
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use std::path::Path;

use crate::cli::picker::resolve_series_files;
use crate::data::{ArticleClient, SourceRegistry};
use crate::domain::{ArticleRequest, Interval, QueryDate, ViewConfig};
use crate::error::AppError;
use crate::io::{load_registry, read_series_file};

/// Resolve the configured files (or discover them) and load every source.
pub fn load_registry_for(config: &ViewConfig) -> Result<SourceRegistry, AppError> {
    let files = resolve_series_files(&config.files)?;
    let registry = load_registry(&files)?;
    if registry.is_empty() {
        return Err(AppError::input("The series files hold no series."));
    }
    tracing::info!(sources = registry.len(), metric = %config.metric, "registry loaded");
    Ok(registry)
}

/// Article client honouring `--endpoint`, then the environment.
pub fn article_client_for(config: &ViewConfig) -> Result<ArticleClient, AppError> {
    ArticleClient::from_env(config.endpoint.as_deref())
}

/// Build the article request for source `series` of `path` at `date`.
///
/// The date form must match the series interval: `YYYY` for yearly series,
/// `YYYY/MM` for monthly ones.
pub fn article_request_for(path: &Path, series: usize, date: QueryDate) -> Result<ArticleRequest, AppError> {
    let sources = read_series_file(path)?;
    let count = sources.len();
    let source = sources.into_iter().nth(series).ok_or_else(|| {
        AppError::input(format!(
            "Series index {series} out of range: '{}' holds {count} series.",
            path.display()
        ))
    })?;

    match (source.interval(), date) {
        (Interval::Year, QueryDate::Year(_)) | (Interval::Month, QueryDate::Month(_, _)) => {}
        (Interval::Year, QueryDate::Month(_, _)) => {
            return Err(AppError::input(format!(
                "'{}' is a yearly series; use --date YYYY.",
                source.label
            )));
        }
        (Interval::Month, QueryDate::Year(_)) => {
            return Err(AppError::input(format!(
                "'{}' is a monthly series; use --date YYYY/MM.",
                source.label
            )));
        }
    }

    Ok(ArticleRequest {
        label: source.label,
        query_date: date,
        api_query: source.api_query,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const MONTHLY: &str = r#"{
        "label": "drought",
        "api_query": "q=drought",
        "interval": "month",
        "data": {"1900": {"3": {"total": 5, "ratio": 0.05}}}
    }"#;

    #[test]
    fn builds_request_for_matching_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drought.json");
        fs::write(&path, MONTHLY).unwrap();

        let req = article_request_for(&path, 0, QueryDate::Month(1900, 3)).unwrap();
        assert_eq!(req.label, "drought");
        assert_eq!(req.api_query, "q=drought");
        assert_eq!(req.query_date.to_string(), "1900/03");
    }

    #[test]
    fn rejects_interval_mismatch_and_bad_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drought.json");
        fs::write(&path, MONTHLY).unwrap();

        let err = article_request_for(&path, 0, QueryDate::Year(1900)).unwrap_err();
        assert!(err.message().contains("monthly"));
        let err = article_request_for(&path, 3, QueryDate::Month(1900, 3)).unwrap_err();
        assert!(err.message().contains("out of range"));
    }

    #[test]
    fn loads_registry_from_explicit_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("drought.json");
        fs::write(&path, MONTHLY).unwrap();

        let config = ViewConfig {
            files: vec![path],
            ..ViewConfig::default()
        };
        let registry = load_registry_for(&config).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
