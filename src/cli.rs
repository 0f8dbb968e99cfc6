//! CLI argument parsing for benchreport

use crate::render::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "benchreport")]
#[command(version)]
#[command(
    about = "Summarize VPDA learning, preprocessing and validation benchmark results",
    long_about = None
)]
pub struct Cli {
    /// Root directory reports are written under
    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        default_value = ".",
        global = true
    )]
    pub output_dir: PathBuf,

    /// Override the report's subdirectory (e.g. learning instead of figures)
    #[arg(long = "subdir", value_name = "NAME", global = true)]
    pub subdir: Option<String>,

    /// Override the report's output format
    #[arg(long = "format", value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Digits after the decimal point for float cells
    #[arg(long = "precision", value_name = "N", default_value = "2", global = true)]
    pub precision: usize,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// One-row summary of a learning run (figures/, LaTeX)
    Learning {
        /// CSV file written by the learning benchmarks
        input: PathBuf,

        /// Time limit the benchmarks ran with, in seconds
        time_limit: u64,

        /// Report file name, without extension
        name: String,
    },

    /// One-row summary of a key-graph preprocessing run (preprocessing/, LaTeX)
    Preprocessing {
        input: PathBuf,
        name: String,
    },

    /// Per-length validation statistics (validation/, text)
    Validation {
        /// CSV with `Document ID` and `Memory document`, added to the validator memory
        #[arg(long = "memory", value_name = "FILE")]
        memory: Option<PathBuf>,

        /// Also report path and successor statistics
        #[arg(long = "extended")]
        extended: bool,

        input: PathBuf,
        name: String,
    },

    /// Grouped report described by a TOML definition
    Custom {
        /// Report definition file
        #[arg(long = "config", value_name = "FILE")]
        config: PathBuf,

        /// CSV joined through the definition's [merge] section
        #[arg(long = "memory", value_name = "FILE")]
        memory: Option<PathBuf>,

        input: PathBuf,
        name: String,
    },
}

impl Command {
    /// Report file name, without extension
    pub fn name(&self) -> &str {
        match self {
            Command::Learning { name, .. }
            | Command::Preprocessing { name, .. }
            | Command::Validation { name, .. }
            | Command::Custom { name, .. } => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_learning() {
        let cli = Cli::parse_from(["benchreport", "learning", "results.csv", "60", "run1"]);
        match cli.command {
            Command::Learning {
                input,
                time_limit,
                name,
            } => {
                assert_eq!(input, PathBuf::from("results.csv"));
                assert_eq!(time_limit, 60);
                assert_eq!(name, "run1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["benchreport", "preprocessing", "results.csv", "run1"]);
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert_eq!(cli.precision, 2);
        assert!(cli.subdir.is_none());
        assert!(cli.format.is_none());
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "benchreport",
            "validation",
            "results.csv",
            "run1",
            "-o",
            "out",
            "--format",
            "json",
            "--subdir",
            "learning",
            "--debug",
        ]);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert_eq!(cli.subdir.as_deref(), Some("learning"));
        assert!(cli.debug);
    }

    #[test]
    fn test_cli_validation_flags() {
        let cli = Cli::parse_from([
            "benchreport",
            "validation",
            "--memory",
            "memory.csv",
            "--extended",
            "results.csv",
            "run1",
        ]);
        match cli.command {
            Command::Validation {
                memory, extended, ..
            } => {
                assert_eq!(memory, Some(PathBuf::from("memory.csv")));
                assert!(extended);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_validation_defaults() {
        let cli = Cli::parse_from(["benchreport", "validation", "results.csv", "run1"]);
        assert!(matches!(
            cli.command,
            Command::Validation {
                memory: None,
                extended: false,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_custom_requires_config() {
        let result = Cli::try_parse_from(["benchreport", "custom", "results.csv", "run1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_rejects_non_numeric_time_limit() {
        let result = Cli::try_parse_from(["benchreport", "learning", "results.csv", "ten", "run1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_command_name() {
        let cli = Cli::parse_from([
            "benchreport",
            "custom",
            "--config",
            "report.toml",
            "results.csv",
            "run1",
        ]);
        assert_eq!(cli.command.name(), "run1");
    }
}
