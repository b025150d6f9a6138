//! Reader for the JavaScript data files written by the old harvester.
//!
//! Those files were meant to be included by an HTML page and look like:
//!
//! ```text
//! // Query: http://trove.nla.gov.au/newspaper/result?q=drought
//! // Date: 2011-08-30 10:12
//! var drought_2011_08_30 = new graphData();
//! drought_2011_08_30.name = "drought";
//! drought_2011_08_30.interval = "year";
//! drought_2011_08_30.api_query = 'all=drought';
//! drought_2011_08_30.data = {"1900": {"total": 10, "ratio": 0.1}};
//! dataSources.sources.push(drought_2011_08_30);
//! ```

use indexmap::IndexMap;
use serde_json::Value;

use crate::domain::Interval;
use crate::error::AppError;

use super::series_file::SeriesFile;

/// Marker that identifies a legacy series data file.
pub const LEGACY_MARKER: &str = "new graphData()";

/// Parse a legacy data file into the JSON file model.
///
/// Files written before monthly harvesting existed have no `interval` and are
/// yearly.
pub fn parse_legacy_js(text: &str) -> Result<SeriesFile, AppError> {
    let mut query = String::new();
    let mut label = String::new();
    let mut api_query = String::new();
    let mut interval = None;

    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("// Query:") {
            query = rest.trim().to_string();
            continue;
        }
        let Some((property, value)) = assignment(line) else {
            continue;
        };
        match property {
            "name" | "label" => label = string_literal(value)?,
            "api_query" => api_query = string_literal(value)?,
            "query" => query = string_literal(value)?,
            "interval" => {
                interval = Some(match string_literal(value)?.as_str() {
                    "year" => Interval::Year,
                    "month" => Interval::Month,
                    other => {
                        return Err(AppError::input(format!("Unknown interval '{other}' in legacy data file")));
                    }
                });
            }
            _ => {}
        }
    }

    let data_text = data_object(text)
        .ok_or_else(|| AppError::input("Legacy data file has no `.data = {...}` assignment"))?;
    let data: IndexMap<String, Value> = serde_json::from_str(data_text)
        .map_err(|e| AppError::input(format!("Invalid data object in legacy data file: {e}")))?;

    let interval = interval.unwrap_or_else(|| {
        tracing::debug!("legacy data file has no interval, assuming yearly");
        Interval::Year
    });

    Ok(SeriesFile {
        label,
        query,
        api_query,
        interval,
        data,
    })
}

/// Split `var_name.property = value;` into `(property, value)`.
fn assignment(line: &str) -> Option<(&str, &str)> {
    let (lhs, rhs) = line.split_once('=')?;
    let (_, property) = lhs.trim().rsplit_once('.')?;
    if property.contains(' ') || lhs.trim_start().starts_with("var ") {
        return None;
    }
    Some((property.trim(), rhs.trim().trim_end_matches(';').trim()))
}

/// Unquote a single- or double-quoted JavaScript string literal.
fn string_literal(raw: &str) -> Result<String, AppError> {
    let quote = raw
        .chars()
        .next()
        .filter(|c| *c == '"' || *c == '\'')
        .ok_or_else(|| AppError::input(format!("Expected a quoted string, got `{raw}`")))?;
    let inner = raw
        .strip_prefix(quote)
        .and_then(|r| r.strip_suffix(quote))
        .ok_or_else(|| AppError::input(format!("Unterminated string `{raw}`")))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// The `{...}` object literal of the `<var>.data = ` assignment, which may
/// span lines.
fn data_object(text: &str) -> Option<&str> {
    let mut line_start = 0;
    let mut start = None;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.starts_with("//") && matches!(assignment(trimmed), Some(("data", _))) {
            let eq = line.find('=')?;
            start = Some(line_start + eq + line[eq..].find('{')?);
            break;
        }
        line_start += line.len();
    }
    let start = start?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}
