//! Tokens command implementation.
//!
//! Prints the token stream of a filter, one token per line.

use listfilter_rs::{CompileError, Lexer, Token};

use super::{CommandContext, Result};

/// Executes the tokens command.
pub fn execute(ctx: &CommandContext, filter: &str) -> Result<()> {
    let tokens = Lexer::new(filter).tokenize().map_err(CompileError::from)?;

    if !ctx.quiet {
        println!("{:>6}  {:<20}  TEXT", "OFFSET", "KIND");
    }
    for token in &tokens {
        println!("{}", format_token(token));
    }

    Ok(())
}

fn format_token(token: &Token<'_>) -> String {
    format!("{:>6}  {:<20}  {}", token.offset, token.kind.to_string(), token.text)
}
