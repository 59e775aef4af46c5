use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::config::load_config;
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {e}");
            error_exit_code(&e)
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the CLI flags.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let filter_command = match &cli.command {
        // Config commands must work even when the config file is broken
        Commands::Config { command } => {
            let ctx = CommandContext::from_cli(cli, &Default::default());
            return commands::config::execute(&ctx, command.as_ref());
        }
        other => other,
    };

    let config = load_config()?;
    let ctx = CommandContext::from_cli(cli, &config);

    match filter_command {
        Commands::Compile { filter, target } => {
            let opts = commands::compile::CompileOptions {
                filter: filter.clone(),
                target: target.or(config.output.target).unwrap_or_default(),
            };
            commands::compile::execute(&ctx, &opts)
        }
        Commands::Tokens { filter } => commands::tokens::execute(&ctx, filter),
        Commands::Eval { filter, input } => {
            let opts = commands::eval::EvalOptions {
                filter: filter.clone(),
                input: input.clone(),
            };
            commands::eval::execute(&ctx, &opts)
        }
        Commands::Config { .. } => Ok(()),
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(exit_status(e))
}

fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Filter(_) => 1,
        CommandError::Match(_) => 1,
        CommandError::Json(_) => 1,
        CommandError::Io(_) => 3,
        CommandError::Config(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listfilter_rs::compile;

    #[test]
    fn test_exit_codes() {
        let filter_err = CommandError::from(compile("a =").unwrap_err());
        assert_eq!(exit_status(&filter_err), 1);

        let io_err = CommandError::from(std::io::Error::other("boom"));
        assert_eq!(exit_status(&io_err), 3);

        let config_err = CommandError::Config("bad".to_string());
        assert_eq!(exit_status(&config_err), 5);
    }
}
