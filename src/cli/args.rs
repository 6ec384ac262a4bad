//! Command-line argument parsing for TSE Fetcher
//!
//! This module defines the CLI structure using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// TSE Fetcher - Download Brazilian electoral court open data
#[derive(Parser, Debug)]
#[command(
    name = "tse_fetcher",
    version,
    about = "Download nationwide CSV files from the TSE open-data archive",
    long_about = "Downloads the nationwide CSV of a TSE dataset for an election year.
Transfers are skipped when the remote archive's ETag or Last-Modified matches the last successful download."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch one dataset for one election year
    Fetch(FetchArgs),

    /// List the known datasets
    Datasets,

    /// Inspect the cache record
    Cache(CacheArgs),
}

/// Arguments for the fetch command
#[derive(Args, Debug, Clone, Default)]
pub struct FetchArgs {
    /// Dataset identifier (e.g., "cand"); prompted for when omitted
    pub dataset: Option<String>,

    /// Election year; prompted for when omitted
    pub year: Option<u16>,

    /// Destination base directory
    #[arg(long, value_name = "DIR")]
    pub base_path: Option<PathBuf>,

    /// Transfer even when the stored copy is current
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for cache inspection
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache actions
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show the cache record and its entries
    Show {
        /// Destination base directory
        #[arg(long, value_name = "DIR")]
        base_path: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level requested by flags, if any
    pub fn log_level(&self) -> Option<tracing::Level> {
        if self.global.quiet {
            Some(tracing::Level::ERROR)
        } else if self.global.very_verbose {
            Some(tracing::Level::DEBUG)
        } else if self.global.verbose {
            Some(tracing::Level::INFO)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(global: GlobalArgs) -> Cli {
        Cli {
            global,
            command: Commands::Datasets,
        }
    }

    fn flags(verbose: bool, very_verbose: bool, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            very_verbose,
            quiet,
            config: None,
        }
    }

    #[test]
    fn test_log_level() {
        use tracing::Level;

        assert_eq!(cli(flags(false, false, true)).log_level(), Some(Level::ERROR));
        assert_eq!(cli(flags(true, false, false)).log_level(), Some(Level::INFO));
        assert_eq!(cli(flags(false, true, false)).log_level(), Some(Level::DEBUG));
        assert_eq!(cli(flags(false, false, false)).log_level(), None);
        // Quiet wins over verbose
        assert_eq!(cli(flags(true, false, true)).log_level(), Some(Level::ERROR));
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "tse_fetcher",
            "fetch",
            "cand",
            "2022",
            "--base-path",
            "/tmp/tse",
            "--force",
            "-v",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.dataset.as_deref(), Some("cand"));
                assert_eq!(args.year, Some(2022));
                assert_eq!(args.base_path, Some(PathBuf::from("/tmp/tse")));
                assert!(args.force);
            }
            other => panic!("Expected fetch command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_fetch_without_positionals() {
        let cli = Cli::try_parse_from(["tse_fetcher", "fetch"]).unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert!(args.dataset.is_none());
                assert!(args.year.is_none());
                assert!(!args.force);
            }
            other => panic!("Expected fetch command, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_year_rejected() {
        assert!(Cli::try_parse_from(["tse_fetcher", "fetch", "cand", "twenty"]).is_err());
    }

    #[test]
    fn test_parse_cache_show() {
        let cli =
            Cli::try_parse_from(["tse_fetcher", "cache", "show", "--base-path", "out"]).unwrap();
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Show { base_path },
            }) => assert_eq!(base_path, Some(PathBuf::from("out"))),
            other => panic!("Expected cache show, got {:?}", other),
        }
    }
}
