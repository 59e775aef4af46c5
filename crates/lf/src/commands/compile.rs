//! Compile command implementation.
//!
//! Compiles a filter and prints the predicate tree or a MongoDB query as JSON.

use listfilter_mongo_rs::to_mongo_query;
use listfilter_rs::FilterCompiler;

use super::{CommandContext, Result};
use crate::cli::OutputTarget;

/// Options for the compile command.
pub struct CompileOptions {
    /// Filter expression.
    pub filter: String,
    /// Output form.
    pub target: OutputTarget,
}

/// Executes the compile command.
pub fn execute(ctx: &CommandContext, opts: &CompileOptions) -> Result<()> {
    let predicate = FilterCompiler::new().compile(&opts.filter)?;

    let rendered = match opts.target {
        OutputTarget::Predicate => ctx.to_json(&predicate)?,
        OutputTarget::Mongo => ctx.to_json(&to_mongo_query(&predicate))?,
    };

    if ctx.verbose {
        eprintln!("Compiled: {predicate}");
    }
    println!("{rendered}");

    Ok(())
}
