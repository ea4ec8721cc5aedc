#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Supervised-learning panel construction from incident-level crime data.
//!
//! The pipeline runs strictly left to right, each stage taking its input
//! table by reference and returning a new one:
//!
//! 1. [`crime_panel_source::load_records`]: unified incident records
//! 2. [`aggregate::aggregate_monthly`]: monthly counts per entity key
//! 3. [`features::build_panel`]: positional lags and window statistics
//! 4. [`filter::retain_complete`] then [`emit::emit_panel`]: complete rows
//!    only, written as CSV
//!
//! Re-running on the same inputs produces an identical table.

pub mod aggregate;
pub mod emit;
pub mod features;
pub mod filter;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crime_panel_panel_models::{PanelConfig, PanelRow, PipelineReport};
use crime_panel_source::SourceError;
use crime_panel_source::progress::ProgressCallback;
use crime_panel_source::source_def::SourceDefinition;
use crime_panel_source::{LoadOptions, load_records};
use crime_panel_source_models::IncidentRecord;

/// Errors that can occur while building or writing the panel.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Loading the source tables failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// I/O error (output directory or file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The panel configuration is unusable.
    #[error("Invalid panel configuration: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },

    /// A panel row lacks a required output column.
    #[error("Panel row is missing required column '{column}'")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },
}

/// Retained panel rows plus the counts needed for a [`PipelineReport`].
#[derive(Debug, Clone)]
pub struct PanelTable {
    /// Complete rows, ordered by entity key then month.
    pub rows: Vec<PanelRow>,
    /// Records with no month.
    pub records_missing_month: u64,
    /// Dated records with a blank key component.
    pub records_without_key: u64,
    /// Monthly aggregate rows.
    pub aggregates: u64,
    /// Panel rows before filtering.
    pub panel_rows: u64,
}

/// Runs aggregation, feature construction, and the completeness filter
/// over an already-loaded record set.
///
/// # Errors
///
/// Returns [`PanelError::InvalidConfig`] if `config` fails validation.
pub fn build_panel_table(
    records: &[IncidentRecord],
    config: &PanelConfig,
) -> Result<PanelTable, PanelError> {
    config.validate().map_err(|e| PanelError::InvalidConfig {
        message: e.to_string(),
    })?;

    let aggregation = aggregate::aggregate_monthly(records);
    let panel = features::build_panel(&aggregation.aggregates, config);
    let panel_rows = panel.len() as u64;
    let rows = filter::retain_complete(panel);

    Ok(PanelTable {
        rows,
        records_missing_month: aggregation.records_missing_month,
        records_without_key: aggregation.records_without_key,
        aggregates: aggregation.aggregates.len() as u64,
        panel_rows,
    })
}

/// Builds the panel from loaded records and writes it to `output_path`.
///
/// # Errors
///
/// Returns [`PanelError`] if the configuration is invalid or the table
/// cannot be written.
pub fn run_on_records(
    records: &[IncidentRecord],
    config: &PanelConfig,
    output_path: &Path,
) -> Result<PipelineReport, PanelError> {
    let start = Instant::now();
    let table = build_panel_table(records, config)?;
    emit::emit_panel(output_path, &table.rows, config)?;

    let report = PipelineReport {
        records_loaded: records.len() as u64,
        records_missing_month: table.records_missing_month,
        records_without_key: table.records_without_key,
        aggregates: table.aggregates,
        panel_rows: table.panel_rows,
        retained_rows: table.rows.len() as u64,
        output_path: output_path.to_path_buf(),
        duration: start.elapsed(),
    };
    log_report(&report);
    Ok(report)
}

/// Loads every table named by `definition` and runs the full pipeline.
///
/// Table paths are resolved against `base_dir`; the output path is taken
/// from the definition as-is.
///
/// # Errors
///
/// Returns [`PanelError`] if the definition is invalid, a table cannot be
/// loaded (including a missing canonical column, which aborts before any
/// output is written), or the table cannot be written.
pub fn run_pipeline(
    definition: &SourceDefinition,
    base_dir: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<PipelineReport, PanelError> {
    let start = Instant::now();
    definition.validate()?;

    let tables = definition.resolve_tables(base_dir);
    let options = LoadOptions::from_definition(definition)?;
    let records = load_records(&tables, options, progress)?;

    let mut report = run_on_records(
        &records,
        &definition.panel,
        &definition.output.panel_path(),
    )?;
    report.duration = start.elapsed();
    Ok(report)
}

fn log_report(report: &PipelineReport) {
    log::info!(
        "Panel: {} record(s) loaded, {} undated, {} without key",
        report.records_loaded,
        report.records_missing_month,
        report.records_without_key
    );
    log::info!(
        "Panel: {} monthly aggregate(s), {} panel row(s), {} retained",
        report.aggregates,
        report.panel_rows,
        report.retained_rows
    );
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::fs;
    use std::path::PathBuf;

    use crime_panel_source::progress::null_progress;
    use crime_panel_source::source_def::parse_source_toml;

    use super::*;

    const HEADER: &str = "Reported Date,Suburb - Incident,Offence Level 1 Description,Offence Level 2 Description,Offence Level 3 Description,Offence count";

    /// Writes two period tables and a definition pointing at them.
    fn fixture(dir: &Path) -> SourceDefinition {
        let values = [5, 6, 4, 7, 3, 9, 2, 8, 6, 5, 4, 7, 10];
        let mut first = format!("{HEADER}\n");
        let mut second = format!("{HEADER}\n");
        for (i, value) in values.iter().enumerate() {
            // Jan 2023 .. Jan 2024, split across two fiscal-year tables.
            let (year, month) = (2023 + i / 12, i % 12 + 1);
            let table = if i < 6 { &mut first } else { &mut second };
            writeln!(
                table,
                "15/{month:02}/{year},Smithville,Theft,Shoplifting,Shop,{value}"
            )
            .unwrap();
        }
        for month in 1..=10 {
            writeln!(first, "02/{month:02}/2023,Shortville,Theft,Shoplifting,Shop,1").unwrap();
        }
        writeln!(first, "not-a-date,Smithville,Theft,Shoplifting,Shop,100").unwrap();

        fs::write(dir.join("a.csv"), first).unwrap();
        fs::write(dir.join("b.csv"), second).unwrap();

        let toml_str = format!(
            r#"
id = "fixture"
name = "Fixture"

[output]
dir = '{out}'
filename = "panel.csv"

[columns]
"Offence Level 1 Description" = "Offence Level 1"
"Offence Level 2 Description" = "Offence Level 2"
"Offence Level 3 Description" = "Offence Level 3"
"Offence count" = "Offence Count"
"Suburb - Incident" = "Suburb"

[[tables]]
period = "2022-23"
path = "a.csv"

[[tables]]
period = "2023-24"
path = "b.csv"
"#,
            out = dir.join("Outputs").display()
        );
        parse_source_toml(&toml_str).unwrap()
    }

    fn output_path(dir: &Path) -> PathBuf {
        dir.join("Outputs").join("panel.csv")
    }

    #[test]
    fn end_to_end_retains_only_complete_history() {
        let dir = tempfile::tempdir().unwrap();
        let definition = fixture(dir.path());

        let report = run_pipeline(&definition, dir.path(), &null_progress()).unwrap();
        assert_eq!(report.records_loaded, 13 + 10 + 1);
        assert_eq!(report.records_missing_month, 1);
        assert_eq!(report.records_without_key, 0);
        assert_eq!(report.aggregates, 23);
        assert_eq!(report.panel_rows, 23);
        assert_eq!(report.retained_rows, 1);

        let text = fs::read_to_string(output_path(dir.path())).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(
            fields[..17].join(","),
            "Smithville,Theft,Shoplifting,2024-01-01,10,7,4,5,6,8,2,9,3,7,4,6,5"
        );
        let avg: f64 = fields[17].parse().unwrap();
        let std: f64 = fields[18].parse().unwrap();
        assert!((avg - 16.0 / 3.0).abs() < 1e-9);
        assert!((std - (7.0_f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(fields[19], "1");
    }

    #[test]
    fn rerun_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let definition = fixture(dir.path());

        run_pipeline(&definition, dir.path(), &null_progress()).unwrap();
        let first = fs::read(output_path(dir.path())).unwrap();
        run_pipeline(&definition, dir.path(), &null_progress()).unwrap();
        let second = fs::read(output_path(dir.path())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn missing_column_aborts_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let definition = fixture(dir.path());
        fs::write(
            dir.path().join("b.csv"),
            "Reported Date,Suburb - Incident,Offence Level 1 Description\n01/01/2024,X,Y\n",
        )
        .unwrap();

        let err = run_pipeline(&definition, dir.path(), &null_progress()).unwrap_err();
        match err {
            PanelError::Source(SourceError::MissingColumn { table, column }) => {
                assert_eq!(table, "2023-24");
                assert_eq!(column, "Offence Level 2");
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
        assert!(!output_path(dir.path()).exists());
    }

    #[test]
    fn empty_tables_produce_header_only_output() {
        let dir = tempfile::tempdir().unwrap();
        let definition = fixture(dir.path());
        fs::write(dir.path().join("a.csv"), format!("{HEADER}\n")).unwrap();
        fs::write(dir.path().join("b.csv"), HEADER).unwrap();

        let report = run_pipeline(&definition, dir.path(), &null_progress()).unwrap();
        assert_eq!(report.records_loaded, 0);
        assert_eq!(report.retained_rows, 0);
        let text = fs::read_to_string(output_path(dir.path())).unwrap();
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn invalid_window_is_rejected() {
        let config = PanelConfig {
            lag_depth: 1,
            stats_window: 3,
        };
        assert!(matches!(
            build_panel_table(&[], &config),
            Err(PanelError::InvalidConfig { .. })
        ));
    }
}
