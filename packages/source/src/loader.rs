//! Record loader: period-partitioned CSV tables into one record set.
//!
//! Each table is read with its headers renamed through the definition's
//! [`ColumnMapping`], checked for every [`CanonicalColumn`], and converted
//! into [`IncidentRecord`]s. Tables are concatenated without deduplication
//! and the result is ordered by reported date.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::sync::Arc;

use crime_panel_source_models::{CanonicalColumn, ColumnMapping, IncidentRecord, SourceTable};

use crate::SourceError;
use crate::parsing::{non_blank, parse_offence_count, parse_reported_date};
use crate::progress::ProgressCallback;
use crate::source_def::SourceDefinition;

/// Options shared by every table in one load.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions<'a> {
    /// Source header to canonical header renames.
    pub columns: &'a ColumnMapping,
    /// Field delimiter byte.
    pub delimiter: u8,
}

impl<'a> LoadOptions<'a> {
    /// Builds load options from a source definition.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidDefinition`] if the definition's
    /// delimiter is not a single byte.
    pub fn from_definition(definition: &'a SourceDefinition) -> Result<Self, SourceError> {
        Ok(Self {
            columns: &definition.columns,
            delimiter: definition.delimiter_byte()?,
        })
    }
}

/// Positions of the canonical columns within one table's header row.
#[derive(Debug, Clone)]
struct ColumnIndex {
    positions: BTreeMap<CanonicalColumn, usize>,
}

impl ColumnIndex {
    fn cell<'r>(&self, row: &'r csv::StringRecord, column: CanonicalColumn) -> &'r str {
        self.positions
            .get(&column)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
    }
}

fn index_columns(
    period: &str,
    headers: &csv::StringRecord,
    columns: &ColumnMapping,
) -> Result<ColumnIndex, SourceError> {
    let renamed: Vec<&str> = headers
        .iter()
        .map(|h| columns.rename(h.trim_start_matches('\u{feff}').trim()))
        .collect();

    let mut positions = BTreeMap::new();
    for &column in CanonicalColumn::all() {
        let position = renamed
            .iter()
            .position(|h| *h == column.as_ref())
            .ok_or_else(|| SourceError::MissingColumn {
                table: period.to_owned(),
                column: column.to_string(),
            })?;
        positions.insert(column, position);
    }

    Ok(ColumnIndex { positions })
}

/// Reads one table from any reader.
///
/// # Errors
///
/// Returns [`SourceError::MissingColumn`] if a canonical column is absent
/// after renaming, or [`SourceError::Csv`] if the data is not valid CSV.
pub fn read_table<R: Read>(
    period: &str,
    reader: R,
    options: LoadOptions<'_>,
) -> Result<Vec<IncidentRecord>, SourceError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let index = index_columns(period, &headers, options.columns)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let cell = |column| index.cell(&row, column);

        records.push(IncidentRecord {
            period: period.to_owned(),
            reported_at: parse_reported_date(cell(CanonicalColumn::ReportedDate)),
            suburb: non_blank(cell(CanonicalColumn::Suburb)),
            offence_level_1: non_blank(cell(CanonicalColumn::OffenceLevel1)),
            offence_level_2: non_blank(cell(CanonicalColumn::OffenceLevel2)),
            offence_level_3: non_blank(cell(CanonicalColumn::OffenceLevel3)),
            offence_count: parse_offence_count(cell(CanonicalColumn::OffenceCount)),
        });
    }

    Ok(records)
}

/// Reads one table from disk.
///
/// # Errors
///
/// Returns [`SourceError::Open`] if the file cannot be opened, plus any
/// error from [`read_table`].
pub fn load_table(
    table: &SourceTable,
    options: LoadOptions<'_>,
) -> Result<Vec<IncidentRecord>, SourceError> {
    let file = File::open(&table.path).map_err(|source| SourceError::Open {
        path: table.path.clone(),
        source,
    })?;
    read_table(&table.period, BufReader::new(file), options)
}

/// Loads and concatenates every table into one record set ordered by
/// reported date.
///
/// The sort is stable, so records reported at the same instant keep their
/// table order. Records without a parseable date are kept and placed after
/// all dated records.
///
/// # Errors
///
/// Returns the first [`SourceError`] encountered. A schema mismatch in any
/// table aborts the whole load.
pub fn load_records(
    tables: &[SourceTable],
    options: LoadOptions<'_>,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<IncidentRecord>, SourceError> {
    progress.set_total(tables.len() as u64);
    if options.columns.is_empty() {
        log::debug!("Loading {} table(s) with headers as-is", tables.len());
    } else {
        log::debug!(
            "Loading {} table(s) with {} column rename(s)",
            tables.len(),
            options.columns.len()
        );
    }

    let mut records = Vec::new();
    for (i, table) in tables.iter().enumerate() {
        progress.set_message(format!("Reading {}", table.period));
        log::info!(
            "[{}] Reading table {}/{}: {}",
            table.period,
            i + 1,
            tables.len(),
            table.path.display()
        );

        let loaded = load_table(table, options)?;
        log::info!("[{}] {} record(s)", table.period, loaded.len());
        records.extend(loaded);
        progress.inc(1);
    }

    if tables.is_empty() {
        log::warn!("No source tables configured; the record set is empty");
    }

    records.sort_by_key(|r| (r.reported_at.is_none(), r.reported_at));

    let undated = records.iter().filter(|r| r.reported_at.is_none()).count();
    if undated > 0 {
        log::info!("{undated} record(s) have a missing or unparseable reported date");
    }
    progress.finish(format!("Loaded {} record(s)", records.len()));

    Ok(records)
}
