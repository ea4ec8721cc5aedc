#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record loader for period-partitioned crime tables.
//!
//! A [`source_def::SourceDefinition`] names the tables and the column
//! renames; [`load_records`] turns them into one chronologically ordered
//! set of [`crime_panel_source_models::IncidentRecord`]s.

pub mod loader;
pub mod parsing;
pub mod progress;
pub mod registry;
pub mod source_def;

use std::path::PathBuf;

pub use loader::{LoadOptions, load_records};

/// Errors that can occur while reading source definitions or tables.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// I/O error (definition file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A source table could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// Path of the table.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A definition TOML document could not be parsed.
    #[error("Definition parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required canonical column is absent after renaming.
    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn {
        /// Period label of the offending table.
        table: String,
        /// Canonical name of the missing column.
        column: String,
    },

    /// A definition is structurally valid TOML but unusable.
    #[error("Invalid definition: {message}")]
    InvalidDefinition {
        /// Description of what went wrong.
        message: String,
    },
}
