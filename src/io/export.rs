//! Export derived series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::data::SourceRegistry;
use crate::domain::{Interval, Metric, Point};
use crate::error::AppError;

/// Write every series of the registry for `metric` to a CSV file.
pub fn write_series_csv(path: &Path, registry: &SourceRegistry, metric: Metric) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series_csv_to(&mut file, registry, metric)?;
    tracing::info!(path = %path.display(), metric = %metric, "exported series");
    Ok(())
}

/// Same as [`write_series_csv`] but into any writer.
pub fn write_series_csv_to<W: Write>(out: &mut W, registry: &SourceRegistry, metric: Metric) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["series", "interval", "date", "timestamp_ms", metric.as_str()])
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for source in registry.iter() {
        let interval = source.interval();
        for point in source.make_series(metric) {
            let date = point_date(&point, interval);
            let timestamp = point.timestamp_ms.to_string();
            let value = point.value.map(|v| v.to_string()).unwrap_or_default();
            wtr.write_record([
                source.label.as_str(),
                interval.as_str(),
                date.as_str(),
                timestamp.as_str(),
                value.as_str(),
            ])
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
        }
    }

    wtr.flush()
        .map_err(|e| AppError::input(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn point_date(point: &Point, interval: Interval) -> String {
    let Some(date) = point.date() else {
        return String::new();
    };
    match interval {
        Interval::Year => date.format("%Y").to_string(),
        Interval::Month => date.format("%Y-%m").to_string(),
    }
}
