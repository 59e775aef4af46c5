//! Config command implementation.
//!
//! View and manage configuration settings.
//! Config file is located at ~/.config/lf/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use super::{CommandContext, CommandError, Result};
use crate::cli::{ConfigCommands, OutputTarget};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable naming an explicit config file.
const CONFIG_ENV: &str = "LF_CONFIG";

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# lf - filter compiler configuration

# Config schema version (do not modify)
version = 1

# Output preferences
[output]
# target = "predicate"  # "predicate" or "mongo"
# pretty = true         # pretty-print JSON (--compact overrides)
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: OutputConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default target for `lf compile`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<OutputTarget>,

    /// Pretty-print JSON output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

/// Gets the config file path.
///
/// `$LF_CONFIG` wins, then `$XDG_CONFIG_HOME/lf/config.toml`, then
/// `~/.config/lf/config.toml` on all platforms.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("lf").join("config.toml"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("lf").join("config.toml"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Loads the configuration from disk. A missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    parse_config(&content)
}

/// Parses config file contents, rejecting versions newer than this build knows.
fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Unsupported config version {} (this lf understands up to {})",
            config.version, CONFIG_VERSION
        )));
    }

    Ok(config)
}

/// Dispatches a config subcommand; `lf config` alone shows the config.
pub fn execute(ctx: &CommandContext, command: Option<&ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => execute_show(ctx),
        Some(ConfigCommands::Init { force }) => execute_init(ctx, *force),
        Some(ConfigCommands::Path) => execute_path(),
    }
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    let output = serde_json::json!({
        "path": path.display().to_string(),
        "exists": path.exists(),
        "config": config,
    });
    println!("{}", ctx.to_json(&output)?);

    Ok(())
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    if !ctx.quiet {
        println!("Created config at: {}", path.display());
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path() -> Result<()> {
    println!("{}", get_config_path()?.display());
    Ok(())
}
