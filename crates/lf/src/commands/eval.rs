//! Eval command implementation.
//!
//! Reads a JSON array of documents and prints the ones a filter matches.

use std::fs;
use std::io;
use std::path::PathBuf;

use listfilter_rs::{FilterCompiler, PredicateMatcher};
use serde_json::Value;

use super::{CommandContext, Result};

/// Options for the eval command.
pub struct EvalOptions {
    /// Filter expression.
    pub filter: String,
    /// Document file; stdin when absent.
    pub input: Option<PathBuf>,
}

/// Executes the eval command.
pub fn execute(ctx: &CommandContext, opts: &EvalOptions) -> Result<()> {
    let predicate = FilterCompiler::new().compile(&opts.filter)?;
    let matcher = PredicateMatcher::new(&predicate)?;

    let content = match &opts.input {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let documents: Vec<Value> = serde_json::from_str(&content)?;

    let matched = matcher.filter_documents(&documents);
    tracing::debug!(
        total = documents.len(),
        matched = matched.len(),
        "evaluated filter"
    );

    println!("{}", ctx.to_json(&matched)?);
    Ok(())
}
