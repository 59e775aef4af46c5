//! Command implementations for the lf CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod compile;
pub mod config;
pub mod eval;
pub mod tokens;

use serde::Serialize;

use crate::cli::Cli;
use config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter compilation error.
    #[error("filter error: {0}")]
    Filter(#[from] listfilter_rs::CompileError),

    /// Predicate matching error.
    #[error("match error: {0}")]
    Match(#[from] listfilter_rs::MatchError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to pretty-print JSON output.
    pub pretty: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and loaded config.
    ///
    /// `--compact` always wins; otherwise `output.pretty` decides, defaulting to true.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        Self {
            pretty: !cli.compact && config.output.pretty.unwrap_or(true),
            quiet: cli.quiet,
            verbose: cli.verbose,
        }
    }

    /// Renders a value as JSON in the configured layout.
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(rendered)
    }
}
