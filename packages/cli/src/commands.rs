//! Subcommand implementations.
//!
//! Every command works on a [`Workspace`]: a definition whose output
//! directories are already resolved, plus the directory its relative table
//! paths resolve against.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crime_panel_cli_utils::{IndicatifProgress, MultiProgress};
use crime_panel_source::progress::ProgressCallback;
use crime_panel_source::registry::{all_definitions, default_definition};
use crime_panel_source::source_def::{SourceDefinition, load_source_definition};
use crime_panel_source::{LoadOptions, SourceError, load_records};
use crime_panel_source_models::IncidentRecord;

/// A definition ready to run.
pub struct Workspace {
    /// The definition, output directories resolved.
    pub definition: SourceDefinition,
    /// Directory relative table paths resolve against.
    pub base_dir: PathBuf,
}

impl Workspace {
    /// Loads `config` if given, otherwise the embedded default definition.
    ///
    /// Paths in a config file are relative to the file's directory; the
    /// default definition's paths are relative to the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the config file cannot be loaded or the
    /// working directory cannot be determined.
    pub fn open(config: Option<&Path>) -> Result<Self, SourceError> {
        let (definition, base_dir) = match config {
            Some(path) => {
                let definition = load_source_definition(path)?;
                let base_dir = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                    _ => std::env::current_dir()?,
                };
                (definition, base_dir)
            }
            None => {
                let definition = default_definition();
                definition.validate()?;
                (definition, std::env::current_dir()?)
            }
        };

        Ok(Self {
            definition: definition.with_output_base(&base_dir),
            base_dir,
        })
    }

    fn load(&self, multi: &MultiProgress) -> Result<Vec<IncidentRecord>, SourceError> {
        let progress: Arc<dyn ProgressCallback> =
            IndicatifProgress::tables_bar(multi, &format!("Loading {}", self.definition.name));
        let tables = self.definition.resolve_tables(&self.base_dir);
        let options = LoadOptions::from_definition(&self.definition)?;
        load_records(&tables, options, &progress)
    }
}

/// Runs the full panel pipeline.
///
/// # Errors
///
/// Returns an error if loading, building, or writing the panel fails.
pub fn panel(
    workspace: &Workspace,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress =
        IndicatifProgress::tables_bar(multi, &format!("Loading {}", workspace.definition.name));
    let report =
        crime_panel_panel::run_pipeline(&workspace.definition, &workspace.base_dir, &progress)?;

    log::info!(
        "Panel complete: {} row(s) written to {} in {:.1}s",
        report.retained_rows,
        report.output_path.display(),
        report.duration.as_secs_f64()
    );
    Ok(())
}

/// Loads the records and writes the descriptive summaries.
///
/// # Errors
///
/// Returns an error if loading fails or a summary cannot be written.
pub fn summarize(
    workspace: &Workspace,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let records = workspace.load(multi)?;
    let paths =
        crime_panel_analytics::run_summaries(&records, &workspace.definition.output.summary_dir)?;

    log::info!(
        "Summaries complete: {} document(s) in {:.1}s",
        paths.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Loads the records once, then writes both the panel and the summaries.
///
/// # Errors
///
/// Returns an error if any stage fails. Summaries are not written when the
/// panel fails.
pub fn all(workspace: &Workspace, multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let definition = &workspace.definition;
    let records = workspace.load(multi)?;

    let report = crime_panel_panel::run_on_records(
        &records,
        &definition.panel,
        &definition.output.panel_path(),
    )?;
    let paths = crime_panel_analytics::run_summaries(&records, &definition.output.summary_dir)?;

    log::info!(
        "Done: {} panel row(s) to {}, {} summary document(s) in {:.1}s",
        report.retained_rows,
        report.output_path.display(),
        paths.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Prints the definition's period tables.
pub fn list_sources(workspace: &Workspace) {
    let definition = &workspace.definition;
    println!("{} ({})", definition.name, definition.id);
    println!("{:<10} PATH", "PERIOD");
    println!("{}", "-".repeat(60));
    for table in definition.resolve_tables(&workspace.base_dir) {
        println!("{:<10} {}", table.period, table.path.display());
    }
    println!();
    println!("Panel:     {}", definition.output.panel_path().display());
    println!("Summaries: {}", definition.output.summary_dir.display());

    println!();
    println!("Embedded definitions:");
    for embedded in all_definitions() {
        println!("  {:<10} {}", embedded.id, embedded.name);
    }
}
