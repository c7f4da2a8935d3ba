//! Command-line interface for veriscan.
//!
//! Provides one subcommand per input kind and an offline `extract` command.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands};
