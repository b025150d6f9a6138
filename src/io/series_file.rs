//! Read/write series JSON files.
//!
//! A series file holds one source object or an array of them:
//!
//! ```json
//! {
//!   "label": "white australia",
//!   "query": "http://trove.nla.gov.au/newspaper/result?q=...",
//!   "api_query": "all=white australia",
//!   "interval": "year",
//!   "data": {"1900": {"total": 10, "ratio": 0.1}}
//! }
//! ```
//!
//! `name` is accepted for `label` and `apiQuery` for `api_query`. When the
//! label or API query is missing they are derived from `query`.

use std::fs::File;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::query::{api_query_from_trove_url, series_name_from_trove_url};
use crate::data::source::{parse_series_data, series_data_to_json};
use crate::data::{SeriesSource, SourceRegistry};
use crate::domain::{Interval, SourceError};
use crate::error::AppError;

/// On-disk shape of one source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SeriesFile {
    #[serde(default, alias = "name")]
    pub label: String,
    #[serde(default)]
    pub query: String,
    #[serde(default, alias = "apiQuery")]
    pub api_query: String,
    pub interval: Interval,
    pub data: IndexMap<String, Value>,
}

impl SeriesFile {
    pub fn into_source(self) -> Result<SeriesSource, SourceError> {
        let data = parse_series_data(self.interval, &self.data)?;

        let label = if self.label.trim().is_empty() {
            series_name_from_trove_url(&self.query)
        } else {
            self.label
        };
        let api_query = if self.api_query.trim().is_empty() && !self.query.trim().is_empty() {
            api_query_from_trove_url(&self.query)
        } else {
            self.api_query
        };

        Ok(SeriesSource::new(label, self.query, api_query, data))
    }

    pub fn from_source(source: &SeriesSource) -> Self {
        let data = match series_data_to_json(source.data()) {
            Value::Object(map) => map.into_iter().collect(),
            _ => IndexMap::new(),
        };
        Self {
            label: source.label.clone(),
            query: source.query.clone(),
            api_query: source.api_query.clone(),
            interval: source.interval(),
            data,
        }
    }
}

/// Parse the text of a JSON series file (single object or array).
pub fn parse_series_json(text: &str) -> Result<Vec<SeriesSource>, AppError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| AppError::input(format!("Invalid series JSON: {e}")))?;

    let files: Vec<SeriesFile> = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value::<SeriesFile>)
            .collect::<Result<_, _>>(),
        other => serde_json::from_value::<SeriesFile>(other).map(|f| vec![f]),
    }
    .map_err(|e| AppError::input(format!("Invalid series JSON: {e}")))?;

    files
        .into_iter()
        .map(|f| f.into_source().map_err(AppError::from))
        .collect()
}

/// Read one series file. `.js` files are read as legacy harvester output.
pub fn read_series_file(path: &Path) -> Result<Vec<SeriesSource>, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::input(format!("Failed to read series file '{}': {e}", path.display())))?;

    let is_legacy = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("js"))
        == Some(true);

    let parsed = if is_legacy {
        super::legacy::parse_legacy_js(&text)
            .and_then(|file| file.into_source().map_err(AppError::from))
            .map(|source| vec![source])
    } else {
        parse_series_json(&text)
    };

    parsed.map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))
}

/// Save every source of `registry` to one JSON file.
///
/// A single source is written as an object, several as an array; both forms
/// read back with [`read_series_file`].
pub fn write_registry_json(path: &Path, registry: &SourceRegistry) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create series JSON '{}': {e}", path.display())))?;
    let files: Vec<SeriesFile> = registry.iter().map(SeriesFile::from_source).collect();
    let result = match files.as_slice() {
        [one] => serde_json::to_writer_pretty(file, one),
        _ => serde_json::to_writer_pretty(file, &files),
    };
    result.map_err(|e| AppError::input(format!("Failed to write series JSON: {e}")))?;
    Ok(())
}

/// Load every file, in order, into a registry.
pub fn load_registry(paths: &[PathBuf]) -> Result<SourceRegistry, AppError> {
    let mut registry = SourceRegistry::new();
    for path in paths {
        let sources = read_series_file(path)?;
        tracing::info!(path = %path.display(), sources = sources.len(), "loaded series file");
        for source in sources {
            registry.push(source);
        }
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Metric;
    use std::io::Write;

    #[test]
    fn parses_single_object_and_array() {
        let one = r#"{"label": "a", "interval": "year", "data": {"1900": {"total": 1, "ratio": 0.5}}}"#;
        assert_eq!(parse_series_json(one).unwrap().len(), 1);

        let many = format!("[{one}, {one}]");
        assert_eq!(parse_series_json(&many).unwrap().len(), 2);
    }

    #[test]
    fn derives_label_and_api_query_from_trove_url() {
        let text = r#"{
            "query": "http://trove.nla.gov.au/newspaper/result?q=drought",
            "interval": "year",
            "data": {}
        }"#;
        let sources = parse_series_json(text).unwrap();
        assert_eq!(sources[0].label, "drought");
        assert_eq!(sources[0].api_query, "all=drought");
    }

    #[test]
    fn shape_errors_name_the_offending_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"name": "x", "interval": "month", "data": {"1900": {"total": 1}}}"#).unwrap();

        let err = read_series_file(&path).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_INPUT);
        assert!(err.message().contains("bad.json"));
        assert!(err.message().contains("1900"));
    }

    #[test]
    fn load_registry_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for name in ["zeta", "alpha"] {
            let path = dir.path().join(format!("{name}.json"));
            let mut f = File::create(&path).unwrap();
            write!(
                f,
                r#"{{"name": "{name}", "apiQuery": "all={name}", "interval": "year", "data": {{"1900": {{"total": 3, "ratio": 0.3}}}}}}"#
            )
            .unwrap();
            paths.push(path);
        }

        let registry = load_registry(&paths).unwrap();
        let names: Vec<_> = registry.list_series(Metric::Total).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        assert_eq!(registry.get(1).unwrap().api_query, "all=alpha");
    }

    #[test]
    fn written_file_reads_back() {
        let text = r#"{"label": "m", "query": "", "api_query": "all=m", "interval": "month",
            "data": {"1901": {"2": {"total": 4, "ratio": 0.04}, "1": {"total": 3}}}}"#;
        let source = parse_series_json(text).unwrap().remove(0);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        let registry: SourceRegistry = std::iter::once(source.clone()).collect();
        write_registry_json(&path, &registry).unwrap();

        let back = read_series_file(&path).unwrap().remove(0);
        assert_eq!(back, source);
    }

    #[test]
    fn one_source_saves_as_object_and_several_as_array() {
        let text = r#"[{"label": "a", "interval": "year", "data": {"1900": {"total": 1}}},
            {"label": "b", "interval": "year", "data": {"1900": {"total": 2}}}]"#;
        let sources = parse_series_json(text).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let single = dir.path().join("single.json");
        let registry: SourceRegistry = sources.iter().take(1).cloned().collect();
        write_registry_json(&single, &registry).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&single).unwrap()).unwrap();
        assert!(value.is_object());

        let both = dir.path().join("both.json");
        let registry: SourceRegistry = sources.iter().cloned().collect();
        write_registry_json(&both, &registry).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&both).unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(read_series_file(&both).unwrap(), sources);
    }
}
