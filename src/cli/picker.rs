//! Series file discovery.
//!
//! When no files are named on the command line every series file under the
//! current working directory is charted, in path order. Only `.json` files
//! that parse as series files and `.js` files written by the harvester are
//! picked up; explicitly named files are loaded as given.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::io::legacy::LEGACY_MARKER;
use crate::io::parse_series_json;

/// Default directory recursion depth for finding series files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Use the given paths, or discover series files when there are none.
pub fn resolve_series_files(files: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    if !files.is_empty() {
        return files.iter().map(|p| validate_series_path(p)).collect();
    }

    let found = discover_series_files();
    if found.is_empty() {
        return Err(AppError::input(
            "No series files found. Pass one or more with `trends <file.json>`.",
        ));
    }
    tracing::info!(count = found.len(), "discovered series files");
    Ok(found)
}

/// Validate the provided path points to a `.json` or `.js` file.
pub fn validate_series_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::input(format!("Series file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::input(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if series_extension(path).is_none() {
        return Err(AppError::input(format!(
            "Expected a .json or .js series file (got: {}).",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover series files under the current directory (deterministic order).
pub fn discover_series_files() -> Vec<PathBuf> {
    find_series_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_series_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_series_files_inner(root, 0, max_depth, &mut out);
    out.sort_by(|a, b| pretty_path(a).cmp(&pretty_path(b)));
    out
}

fn find_series_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_series_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        if !file_type.is_file() {
            continue;
        }
        match series_extension(&path) {
            Some(SeriesExt::Json) if is_series_json(&path) => out.push(path),
            Some(SeriesExt::Js) if is_legacy_data_file(&path) => out.push(path),
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeriesExt {
    Json,
    Js,
}

fn series_extension(path: &Path) -> Option<SeriesExt> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    if ext.eq_ignore_ascii_case("json") {
        Some(SeriesExt::Json)
    } else if ext.eq_ignore_ascii_case("js") {
        Some(SeriesExt::Js)
    } else {
        None
    }
}

fn is_legacy_data_file(path: &Path) -> bool {
    fs::read_to_string(path)
        .map(|text| text.contains(LEGACY_MARKER))
        .unwrap_or(false)
}

fn is_series_json(path: &Path) -> bool {
    let Ok(text) = fs::read_to_string(path) else {
        return false;
    };
    match parse_series_json(&text) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "skipping non-series JSON file");
            false
        }
    }
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
