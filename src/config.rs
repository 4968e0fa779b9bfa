use crate::core::{BatchError, Result};
use crate::results_grid::OutputFormat;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Top-level configuration structure parsed from a TOML file.
///
/// Every section is optional; a missing file is the same as an empty one.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Which database to open and how to prepare it.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file or `:memory:`.
    pub path: Option<String>,
    /// Applied as `PRAGMA <entry>;` after opening.
    pub pragmas: Vec<String>,
}

/// How tabular outcomes are printed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub max_rows: Option<usize>,
}

/// Logging configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl LoggingConfig {
    /// The configured level, `warn` when unset.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        match &self.level {
            Some(level) => level
                .parse()
                .map_err(|_| BatchError::Config(format!("invalid logging level '{}'", level))),
            None => Ok(LevelFilter::WARN),
        }
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| BatchError::Config(e.to_string()))
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = sqlbatch::config::load_config("sqlbatch.toml").expect("Failed to load config");
/// println!("{:?}", config);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        BatchError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_config(&content)
}

/// `<config_dir>/sqlbatch/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqlbatch").join("config.toml"))
}

/// Loads the explicit file if given, else the default file if it exists,
/// else the built-in defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => load_config(path),
        _ => Ok(Config::default()),
    }
}
