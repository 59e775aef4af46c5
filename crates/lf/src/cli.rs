//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the lf CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// lf - compile and test list-endpoint filter expressions
#[derive(Parser, Debug)]
#[command(name = "lf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a filter and print the result as JSON
    #[command(alias = "c")]
    Compile {
        /// Filter expression (e.g., "status = 'active' && age >= 18")
        filter: String,

        /// Output form (default: from config, else predicate)
        #[arg(short, long, value_enum)]
        target: Option<OutputTarget>,
    },

    /// Print the token stream of a filter
    Tokens {
        /// Filter expression
        filter: String,
    },

    /// Print the documents of a JSON array that match a filter
    Eval {
        /// Filter expression
        filter: String,

        /// File holding a JSON array of documents (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// View or manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Compiled output forms
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    /// Backend-neutral predicate tree
    #[default]
    Predicate,
    /// MongoDB query document
    Mongo,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print config file path
    Path,
}
