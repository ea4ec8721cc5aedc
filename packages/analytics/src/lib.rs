#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Descriptive summaries of incident-level crime records.
//!
//! [`summaries::summarize`] computes the data behind each chart;
//! [`write_summaries`] stores one JSON document per summary in a directory.

pub mod summaries;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crime_panel_analytics_models::{Summaries, SummaryDocument, SummaryKind};
use crime_panel_source_models::IncidentRecord;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing summaries.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// I/O error (summary directory or file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn write_document<T: Serialize>(
    dir: &Path,
    kind: SummaryKind,
    data: &T,
) -> Result<PathBuf, AnalyticsError> {
    let path = dir.join(kind.file_name());
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &SummaryDocument::new(kind, data))?;
    writer.flush()?;
    log::debug!("Wrote {kind} summary to {}", path.display());
    Ok(path)
}

/// Writes every summary to `dir`, creating it if needed. Existing files
/// are overwritten.
///
/// Returns the written paths in [`SummaryKind::all`] order.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the directory cannot be created or a
/// document cannot be written.
pub fn write_summaries(summaries: &Summaries, dir: &Path) -> Result<Vec<PathBuf>, AnalyticsError> {
    std::fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(SummaryKind::all().len());
    for &kind in SummaryKind::all() {
        let path = match kind {
            SummaryKind::MonthlyTrend => write_document(dir, kind, &summaries.monthly_trend)?,
            SummaryKind::TopOffenceTypes => {
                write_document(dir, kind, &summaries.top_offence_types)?
            }
            SummaryKind::TopSuburbs => write_document(dir, kind, &summaries.top_suburbs)?,
            SummaryKind::SuburbHeatmap => write_document(dir, kind, &summaries.suburb_heatmap)?,
            SummaryKind::Level1Distribution => {
                write_document(dir, kind, &summaries.level1_distribution)?
            }
            SummaryKind::TopOffenceLevel2 => {
                write_document(dir, kind, &summaries.top_offence_level2)?
            }
        };
        paths.push(path);
    }
    Ok(paths)
}

/// Summarizes `records` and writes the documents to `dir`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if any document cannot be written.
pub fn run_summaries(
    records: &[IncidentRecord],
    dir: &Path,
) -> Result<Vec<PathBuf>, AnalyticsError> {
    let summaries = summaries::summarize(records);
    let paths = write_summaries(&summaries, dir)?;
    log::info!(
        "Summaries: {} document(s) over {} record(s) written to {}",
        paths.len(),
        records.len(),
        dir.display()
    );
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crime_panel_analytics_models::RankedCount;

    use super::*;

    fn record(suburb: &str, count: u64) -> IncidentRecord {
        IncidentRecord {
            period: "2022-23".to_string(),
            reported_at: NaiveDate::from_ymd_opt(2022, 7, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0),
            suburb: Some(suburb.to_string()),
            offence_level_1: Some("Property".to_string()),
            offence_level_2: Some("Theft".to_string()),
            offence_level_3: Some("Shop theft".to_string()),
            offence_count: Some(count),
        }
    }

    #[test]
    fn writes_one_document_per_summary() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Visualizations");
        let records = [record("Adelaide", 3), record("Burnside", 1)];
        let paths = run_summaries(&records, &out).unwrap();

        assert_eq!(paths.len(), SummaryKind::all().len());
        for (path, kind) in paths.iter().zip(SummaryKind::all()) {
            assert_eq!(path.file_name().unwrap(), kind.file_name());
            assert!(path.exists(), "{} missing", path.display());
        }

        let text = std::fs::read_to_string(out.join("top_10_crime_suburbs.json")).unwrap();
        let doc: SummaryDocument<Vec<RankedCount>> = serde_json::from_str(&text).unwrap();
        assert_eq!(doc.kind, SummaryKind::TopSuburbs);
        assert_eq!(doc.title, "Top 10 Crime Suburbs");
        assert_eq!(doc.data[0].label, "Adelaide");
        assert_eq!(doc.data[0].offence_count, 3);
    }

    #[test]
    fn monthly_trend_serializes_months_as_text() {
        let dir = tempfile::tempdir().unwrap();
        run_summaries(&[record("Adelaide", 3)], dir.path()).unwrap();

        let path = dir.path().join(SummaryKind::MonthlyTrend.file_name());
        let text = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["data"][0]["month"], "2022-07");
        assert_eq!(value["data"][0]["offenceCount"], 3);
    }

    #[test]
    fn rerun_overwrites_existing_documents() {
        let dir = tempfile::tempdir().unwrap();
        run_summaries(&[record("Adelaide", 3)], dir.path()).unwrap();
        run_summaries(&[], dir.path()).unwrap();

        let path = dir.path().join(SummaryKind::TopOffenceTypes.file_name());
        let text = std::fs::read_to_string(path).unwrap();
        let doc: SummaryDocument<Vec<RankedCount>> = serde_json::from_str(&text).unwrap();
        assert!(doc.data.is_empty());
    }
}
