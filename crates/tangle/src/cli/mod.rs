//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `cycles`: Detect and explain circular dependencies
//! - `impact`: Measure the blast radius of a change
//! - `trend`: Check a quality history for regressions
//! - `schema`: Print the JSON Schema of an input record
//!
//! # Global Flags
//!
//! - `--config <FILE>`: YAML configuration (default `tangle.yaml` when present)
//! - `--json`: Output in JSON format
//! - `--output <FILE>`: Also write the report as JSON to a file
//! - `-v`: More logging (repeatable)
//!
//! # Example
//!
//! ```bash
//! tangle cycles ./deps --min-severity high --fail-on critical
//! tangle impact ./deps --module pkg/auth --kind deletion
//! tangle --json trend history.jsonl --repository acme/api
//! ```

mod args;
mod execute;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

pub use args::{CyclesArgs, ImpactArgs, InputArgs, SchemaArgs, TrendArgs};
pub use execute::Session;
pub use types::{ChangeKindArg, SchemaTarget, SeverityArg};

use crate::config::AnalysisConfig;
use crate::output::OutputMode;

/// Tangle - dependency-graph analysis
///
/// Finds circular dependencies, measures the impact of changes and watches
/// quality trends, from dependency records written by language parsers.
#[derive(Parser, Debug)]
#[command(name = "tangle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Also write the report as JSON to this file
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Detect circular dependencies
    ///
    /// Reports every elementary cycle with its severity, shape and the
    /// edges best suited to break it.
    Cycles(CyclesArgs),

    /// Analyze the impact of a change
    ///
    /// Propagates the change through dependents and dependencies, scores
    /// each affected module and assesses the overall risk.
    Impact(ImpactArgs),

    /// Check a quality history for regressions and anomalies
    Trend(TrendArgs),

    /// Print the JSON Schema of an input record type
    Schema(SchemaArgs),
}

impl Cli {
    /// Parse arguments from the process command line.
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse arguments from an iterator.
    ///
    /// # Errors
    ///
    /// Returns a clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Default log filter for the chosen verbosity.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "tangle=warn,tangle_jsonl=warn",
            1 => "tangle=info,tangle_jsonl=info",
            2 => "tangle=debug,tangle_jsonl=debug",
            _ => "tangle=trace,tangle_jsonl=trace",
        }
    }

    /// Loads the configuration and runs the command.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, input cannot be
    /// read or the report cannot be written.
    pub async fn execute(&self) -> Result<ExitCode> {
        if let Commands::Schema(args) = &self.command {
            return execute::execute_schema(args);
        }

        let session = Session {
            config: AnalysisConfig::discover(self.config.as_deref())?,
            mode: if self.json {
                OutputMode::Json
            } else {
                OutputMode::Text
            },
            output: self.output.clone(),
        };

        match &self.command {
            Commands::Cycles(args) => execute::execute_cycles(&session, args).await,
            Commands::Impact(args) => execute::execute_impact(&session, args).await,
            Commands::Trend(args) => execute::execute_trend(&session, args).await,
            Commands::Schema(args) => execute::execute_schema(args),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["tangle", "cycles", "deps", "--json", "-vv"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_filter(), "tangle=debug,tangle_jsonl=debug");
        match cli.command {
            Commands::Cycles(args) => assert_eq!(args.input.dir, PathBuf::from("deps")),
            _ => panic!("Expected Cycles command"),
        }
    }

    #[test]
    fn test_parse_cycles_defaults() {
        let cli = Cli::try_parse_from(["tangle", "cycles"]).unwrap();
        match cli.command {
            Commands::Cycles(args) => {
                assert_eq!(args.input.dir, PathBuf::from("."));
                assert!(args.min_severity.is_none());
                assert!(args.fail_on.is_none());
                assert!(!args.include_external);
            }
            _ => panic!("Expected Cycles command"),
        }
    }

    #[test]
    fn test_parse_impact_modules_comma_separated() {
        let cli = Cli::try_parse_from([
            "tangle", "impact", "-m", "pkg/a,pkg/b", "--kind", "deletion",
        ])
        .unwrap();
        match cli.command {
            Commands::Impact(args) => {
                assert_eq!(args.modules, vec!["pkg/a", "pkg/b"]);
                assert_eq!(args.kind, ChangeKindArg::Deletion);
            }
            _ => panic!("Expected Impact command"),
        }
    }

    #[test]
    fn test_modules_and_files_conflict() {
        let result = Cli::try_parse_from(["tangle", "impact", "-m", "a", "--files", "a/x.go"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_schema_target() {
        let cli = Cli::try_parse_from(["tangle", "schema", "change-set"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Schema(SchemaArgs {
                target: SchemaTarget::ChangeSet
            })
        ));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["tangle"]).is_err());
    }
}
