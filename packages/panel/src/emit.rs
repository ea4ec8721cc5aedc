//! Panel table emitter.
//!
//! Writes retained panel rows as CSV. Rows are schema-checked against the
//! configured feature window before anything touches the file system, and
//! the file is written to a temporary sibling then renamed into place, so a
//! failed run never leaves a partial table behind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crime_panel_panel_models::{PanelConfig, PanelRow};

use crate::PanelError;

/// Checks that every row carries exactly the configured lag columns.
///
/// # Errors
///
/// Returns [`PanelError::MissingColumn`] naming the first lag column a row
/// lacks, or [`PanelError::InvalidConfig`] if a row has more lags than
/// configured.
pub fn check_schema(rows: &[PanelRow], config: &PanelConfig) -> Result<(), PanelError> {
    for row in rows {
        if row.lags.len() < config.lag_depth {
            return Err(PanelError::MissingColumn {
                column: PanelConfig::lag_column(row.lags.len() + 1),
            });
        }
        if row.lags.len() > config.lag_depth {
            return Err(PanelError::InvalidConfig {
                message: format!(
                    "row for {} has {} lags but lag_depth is {}",
                    row.key,
                    row.lags.len(),
                    config.lag_depth
                ),
            });
        }
    }
    Ok(())
}

/// Formats a float feature, keeping a decimal point on integral values.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn format_row(row: &PanelRow) -> Vec<String> {
    let mut fields = Vec::with_capacity(row.lags.len() + 8);
    fields.push(row.key.suburb.clone());
    fields.push(row.key.offence_level_1.clone());
    fields.push(row.key.offence_level_2.clone());
    fields.push(row.month.first_day().to_string());
    fields.push(row.offence_count.to_string());
    fields.extend(
        row.lags
            .iter()
            .map(|lag| lag.map(|v| v.to_string()).unwrap_or_default()),
    );
    fields.push(row.avg_lag.map(format_float).unwrap_or_default());
    fields.push(row.std_lag.map(format_float).unwrap_or_default());
    fields.push(row.month_number().to_string());
    fields
}

/// Writes the header and rows to any writer.
///
/// # Errors
///
/// Returns [`PanelError`] if the rows do not match the configured schema or
/// the writer fails.
pub fn write_panel<W: Write>(
    writer: W,
    rows: &[PanelRow],
    config: &PanelConfig,
) -> Result<(), PanelError> {
    check_schema(rows, config)?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(config.output_header())?;
    for row in rows {
        csv_writer.write_record(format_row(row))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes the panel table to `path`, creating its directory if needed.
///
/// # Errors
///
/// Returns [`PanelError`] on a schema mismatch (nothing is written) or any
/// I/O failure (the temporary file is removed and `path` is left as it
/// was).
pub fn emit_panel(path: &Path, rows: &[PanelRow], config: &PanelConfig) -> Result<(), PanelError> {
    check_schema(rows, config)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    let result = File::create(&tmp_path)
        .map_err(PanelError::from)
        .and_then(|file| write_panel(BufWriter::new(file), rows, config));

    if let Err(e) = result {
        std::fs::remove_file(&tmp_path).ok();
        return Err(e);
    }

    std::fs::rename(&tmp_path, path)?;
    log::info!("Wrote {} panel row(s) to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crime_panel_crime_models::{EntityKey, Month};

    use super::*;

    fn row(lags: Vec<Option<u64>>) -> PanelRow {
        PanelRow {
            key: EntityKey::new("Smithville", "Theft", "Shoplifting"),
            month: Month::new(2024, 1).unwrap(),
            offence_count: 10,
            lags,
            avg_lag: Some(16.0 / 3.0),
            std_lag: Some(1.5),
        }
    }

    fn full_row() -> PanelRow {
        row((1..=12).map(Some).collect())
    }

    #[test]
    fn writes_header_and_row() {
        let mut out = Vec::new();
        write_panel(&mut out, &[full_row()], &PanelConfig::default()).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Suburb,Offence Level 1,Offence Level 2,Month,offence_count,lag_1,lag_2,lag_3,lag_4,lag_5,lag_6,lag_7,lag_8,lag_9,lag_10,lag_11,lag_12,avg_lag_3,std_lag_3,month"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Smithville,Theft,Shoplifting,2024-01-01,10,1,2,3,4,5,6,7,8,9,10,11,12,5.333333333333333,1.5,1"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn integral_floats_keep_decimal_point() {
        assert_eq!(format_float(6.0), "6.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(2.5), "2.5");
    }

    #[test]
    fn undefined_values_are_empty_cells() {
        let mut r = row(vec![None; 12]);
        r.avg_lag = None;
        r.std_lag = None;
        let fields = format_row(&r);
        assert!(fields[5..19].iter().all(String::is_empty));
        assert_eq!(fields[19], "1");
    }

    #[test]
    fn missing_lag_column_is_fatal_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("panel.csv");
        let short = row((1..=11).map(Some).collect());

        let err = emit_panel(&path, &[short], &PanelConfig::default()).unwrap_err();
        match err {
            PanelError::MissingColumn { column } => assert_eq!(column, "lag_12"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
        assert!(!path.exists());
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn creates_directory_and_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Outputs").join("crime_model_data.csv");
        let config = PanelConfig::default();

        emit_panel(&path, &[full_row(), full_row()], &config).unwrap();
        emit_panel(&path, &[full_row()], &config).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!path.with_extension("csv.tmp").exists());
    }

    #[test]
    fn empty_table_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("panel.csv");
        emit_panel(&path, &[], &PanelConfig::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
