//! Config-driven crime source definition.
//!
//! A [`SourceDefinition`] describes one dataset: the period-partitioned
//! tables that make it up, how their columns map to canonical names, the
//! panel feature window, and where outputs go. Definitions are TOML
//! documents, either embedded at compile time (see [`crate::registry`]) or
//! read from disk with [`load_source_definition`].

use std::path::{Path, PathBuf};

use crime_panel_panel_models::PanelConfig;
use crime_panel_source_models::{ColumnMapping, SourceTable};
use serde::Deserialize;

use crate::SourceError;

/// A complete crime dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"sa_crime"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Single-character field delimiter. Defaults to a comma.
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Source column name to canonical column name.
    #[serde(default)]
    pub columns: ColumnMapping,
    /// Feature window for the panel builder.
    #[serde(default)]
    pub panel: PanelConfig,
    /// Output locations.
    #[serde(default)]
    pub output: OutputSettings,
    /// Period-partitioned tables, in concatenation order.
    #[serde(default)]
    pub tables: Vec<SourceTable>,
}

// ── Output settings ──────────────────────────────────────────────────────

/// Where the panel table and descriptive summaries are written.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory for the panel table. Created if missing.
    pub dir: PathBuf,
    /// File name of the panel table inside `dir`.
    pub filename: String,
    /// Directory for the descriptive summaries. Created if missing.
    pub summary_dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Outputs"),
            filename: "crime_model_data.csv".to_string(),
            summary_dir: PathBuf::from("Visualizations"),
        }
    }
}

impl OutputSettings {
    /// Full path of the panel table.
    #[must_use]
    pub fn panel_path(&self) -> PathBuf {
        self.dir.join(&self.filename)
    }
}

impl SourceDefinition {
    /// Returns the field delimiter as a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidDefinition`] if the configured delimiter
    /// is not exactly one byte long.
    pub fn delimiter_byte(&self) -> Result<u8, SourceError> {
        match self.delimiter.as_deref() {
            None => Ok(b','),
            Some(d) if d.len() == 1 => Ok(d.as_bytes()[0]),
            Some(d) => Err(SourceError::InvalidDefinition {
                message: format!("{}: delimiter must be a single byte, got {d:?}", self.id),
            }),
        }
    }

    /// Returns the tables with relative paths resolved against `base_dir`.
    #[must_use]
    pub fn resolve_tables(&self, base_dir: &Path) -> Vec<SourceTable> {
        self.tables
            .iter()
            .map(|table| SourceTable {
                period: table.period.clone(),
                path: if table.path.is_absolute() {
                    table.path.clone()
                } else {
                    base_dir.join(&table.path)
                },
            })
            .collect()
    }

    /// Returns a copy of this definition with its output directories
    /// resolved against `base_dir`.
    #[must_use]
    pub fn with_output_base(mut self, base_dir: &Path) -> Self {
        if self.output.dir.is_relative() {
            self.output.dir = base_dir.join(&self.output.dir);
        }
        if self.output.summary_dir.is_relative() {
            self.output.summary_dir = base_dir.join(&self.output.summary_dir);
        }
        self
    }

    /// Checks the definition for values that would make a run meaningless.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidDefinition`] for an empty id, a bad
    /// delimiter, duplicate table periods, or an invalid panel window.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.id.trim().is_empty() {
            return Err(SourceError::InvalidDefinition {
                message: "definition id is empty".to_string(),
            });
        }
        self.delimiter_byte()?;

        let mut periods: Vec<&str> = self.tables.iter().map(|t| t.period.as_str()).collect();
        periods.sort_unstable();
        if let Some(pair) = periods.windows(2).find(|w| w[0] == w[1]) {
            return Err(SourceError::InvalidDefinition {
                message: format!("{}: duplicate table period {:?}", self.id, pair[0]),
            });
        }

        self.panel
            .validate()
            .map_err(|e| SourceError::InvalidDefinition {
                message: format!("{}: {e}", self.id),
            })
    }
}

/// Parses a TOML string into a [`SourceDefinition`].
///
/// # Errors
///
/// Returns [`SourceError::Toml`] if the TOML is malformed or does not match
/// the definition schema.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, SourceError> {
    Ok(toml::de::from_str(toml_str)?)
}

/// Reads and validates a definition file.
///
/// # Errors
///
/// Returns [`SourceError`] if the file cannot be read, parsed, or fails
/// [`SourceDefinition::validate`].
pub fn load_source_definition(path: &Path) -> Result<SourceDefinition, SourceError> {
    let contents = std::fs::read_to_string(path)?;
    let definition = parse_source_toml(&contents)?;
    definition.validate()?;
    log::debug!(
        "Loaded definition '{}' from {} ({} table(s))",
        definition.id,
        path.display(),
        definition.tables.len()
    );
    Ok(definition)
}
