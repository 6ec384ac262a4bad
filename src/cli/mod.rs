//! Command-line interface components
//!
//! This module contains CLI-specific code for the TSE Fetcher application,
//! including argument parsing, command handlers and interactive prompts.

pub mod args;
pub mod commands;
pub mod startup;

pub use args::{CacheAction, CacheArgs, Cli, Commands, FetchArgs, GlobalArgs};
pub use commands::{handle_cache, handle_datasets, handle_fetch};
pub use startup::{Prompter, latest_year, resolve_fetch_inputs, validate_year};
