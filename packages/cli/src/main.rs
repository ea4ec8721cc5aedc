#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the crime panel toolchain.
//!
//! Builds the supervised-learning panel, writes descriptive summaries, or
//! both. Without a subcommand the user picks one interactively and the
//! embedded default definition is used.
//!
//! Uses `indicatif-log-bridge` (via [`crime_panel_cli_utils::init_logger`])
//! so log lines and the table loading bar share the terminal cleanly.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dialoguer::Select;

use crate::commands::Workspace;

#[derive(Parser)]
#[command(name = "crime_panel", about = "Crime panel construction tool")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct ConfigArgs {
    /// Definition TOML file; relative table paths resolve against its
    /// directory. Defaults to the embedded South Australia definition.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the lag-feature panel and write it as CSV
    Panel {
        #[command(flatten)]
        config: ConfigArgs,
        /// Directory for the panel CSV (overrides the definition)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Write descriptive summaries as JSON documents
    Summarize {
        #[command(flatten)]
        config: ConfigArgs,
        /// Directory for the summary documents (overrides the definition)
        #[arg(long)]
        summary_dir: Option<PathBuf>,
    },
    /// Load the tables once and write both the panel and the summaries
    All {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// List the configured period tables
    Sources {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

/// Interactive tool selection when no subcommand is given.
enum Tool {
    Panel,
    Summarize,
    All,
    Sources,
}

impl Tool {
    const ALL: &[Self] = &[Self::All, Self::Panel, Self::Summarize, Self::Sources];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::All => "Build panel and summaries",
            Self::Panel => "Build panel only",
            Self::Summarize => "Write summaries only",
            Self::Sources => "List source tables",
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = crime_panel_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Panel { config, output_dir }) => {
            let mut workspace = Workspace::open(config.config.as_deref())?;
            if let Some(dir) = output_dir {
                workspace.definition.output.dir = dir;
            }
            commands::panel(&workspace, &multi)?;
        }
        Some(Commands::Summarize {
            config,
            summary_dir,
        }) => {
            let mut workspace = Workspace::open(config.config.as_deref())?;
            if let Some(dir) = summary_dir {
                workspace.definition.output.summary_dir = dir;
            }
            commands::summarize(&workspace, &multi)?;
        }
        Some(Commands::All { config }) => {
            let workspace = Workspace::open(config.config.as_deref())?;
            commands::all(&workspace, &multi)?;
        }
        Some(Commands::Sources { config }) => {
            let workspace = Workspace::open(config.config.as_deref())?;
            commands::list_sources(&workspace);
        }
        None => {
            println!("Crime Panel Toolchain");
            println!();

            let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();
            let idx = Select::new()
                .with_prompt("What would you like to do?")
                .items(&labels)
                .default(0)
                .interact()?;

            let workspace = Workspace::open(None)?;
            match Tool::ALL[idx] {
                Tool::All => commands::all(&workspace, &multi)?,
                Tool::Panel => commands::panel(&workspace, &multi)?,
                Tool::Summarize => commands::summarize(&workspace, &multi)?,
                Tool::Sources => commands::list_sources(&workspace),
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_panel_overrides() {
        let cli = Cli::try_parse_from([
            "crime_panel",
            "panel",
            "--config",
            "defs/sa.toml",
            "--output-dir",
            "out",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Panel { config, output_dir }) => {
                assert_eq!(config.config, Some(PathBuf::from("defs/sa.toml")));
                assert_eq!(output_dir, Some(PathBuf::from("out")));
            }
            _ => panic!("expected panel subcommand"),
        }
    }

    #[test]
    fn subcommand_is_optional() {
        let cli = Cli::try_parse_from(["crime_panel"]).unwrap();
        assert!(cli.command.is_none());
    }
}
