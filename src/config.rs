//! # Configuration Module
//!
//! This module provides configuration support for copyright-keeper, allowing
//! users to add or replace comment dialects per file extension and to ignore
//! files by glob.
//!
//! Configuration can be specified in a `.copyright-keeper.toml` file or via the
//! `COPYRIGHT_KEEPER_CONFIG` environment variable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::dialect::{Dialect, DialectError};
use crate::verbose_log;

/// The default config file name.
pub const DEFAULT_CONFIG_FILENAME: &str = ".copyright-keeper.toml";

/// Environment variable for specifying config file path.
pub const CONFIG_ENV_VAR: &str = "COPYRIGHT_KEEPER_CONFIG";

/// User-defined comment dialect for one file extension.
///
/// At least one of `line` or the `block-open`/`block-close` pair must be set.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DialectConfig {
  /// Line comment token (e.g. "--").
  #[serde(default)]
  pub line: Option<String>,

  /// Block comment opening delimiter (e.g. "--[[").
  #[serde(default)]
  pub block_open: Option<String>,

  /// Block comment closing delimiter (e.g. "]]").
  #[serde(default)]
  pub block_close: Option<String>,

  /// Regular expression that recognizes the copyright phrase.
  #[serde(default)]
  pub phrase: Option<String>,
}

impl DialectConfig {
  /// A line-comment-only dialect.
  pub fn line(token: &str) -> Self {
    Self {
      line: Some(token.to_string()),
      ..Self::default()
    }
  }
}

/// File selection settings.
#[derive(Debug, Default, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
  /// Glob patterns of files to leave untouched.
  #[serde(default)]
  pub ignore: Vec<String>,
}

/// Main configuration struct for copyright-keeper.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
  /// Comment dialect overrides.
  /// Keys are file extensions without the leading dot (e.g., "lua", "rs").
  #[serde(default)]
  pub dialects: HashMap<String, DialectConfig>,

  #[serde(default)]
  pub files: FilesConfig,
}

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// The config file could not be read.
  #[error("Failed to read config file '{path}': {source}")]
  ReadError { path: PathBuf, source: std::io::Error },

  /// The config file contains invalid TOML.
  #[error("Failed to parse config file '{path}': {source}")]
  ParseError { path: PathBuf, source: toml::de::Error },

  /// A dialect entry is invalid.
  #[error("Invalid dialect for '{extension}': {message}")]
  InvalidDialect { extension: String, message: String },

  /// An ignore pattern is not a valid glob.
  #[error("Invalid ignore pattern '{pattern}': {source}")]
  InvalidIgnore { pattern: String, source: glob::PatternError },
}

impl Config {
  /// Load configuration from a file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file
  ///
  /// # Returns
  ///
  /// The loaded configuration, or an error if the file cannot be read, parsed
  /// or validated.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    verbose_log!("Loading config from: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
      path: path.to_path_buf(),
      source: e,
    })?;

    let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
      path: path.to_path_buf(),
      source: e,
    })?;

    config.validate()?;
    let config = config.normalize();

    verbose_log!(
      "Loaded {} dialect overrides and {} ignore patterns",
      config.dialects.len(),
      config.files.ignore.len()
    );

    Ok(config)
  }

  /// Validate the configuration.
  ///
  /// Checks that:
  /// - Extension names don't include the leading dot
  /// - Every dialect builds (delimiters present and paired, phrase compiles)
  /// - Every ignore entry is a valid glob
  fn validate(&self) -> Result<(), ConfigError> {
    for (ext, dialect) in &self.dialects {
      if ext.starts_with('.') {
        return Err(ConfigError::InvalidDialect {
          extension: ext.clone(),
          message: "extension should not include leading dot".to_string(),
        });
      }

      Dialect::from_config(ext, dialect).map_err(|e: DialectError| ConfigError::InvalidDialect {
        extension: ext.clone(),
        message: e.to_string(),
      })?;
    }

    for pattern in &self.files.ignore {
      glob::Pattern::new(pattern).map_err(|source| ConfigError::InvalidIgnore {
        pattern: pattern.clone(),
        source,
      })?;
    }

    Ok(())
  }

  /// Merge `--dialect EXT=TOKEN` overrides from the command line on top of the
  /// file configuration. Command line entries win.
  pub fn merge_cli_dialects(&mut self, specs: &[String]) -> Result<(), ConfigError> {
    for spec in specs {
      let (ext, token) = parse_dialect_arg(spec)?;
      verbose_log!("Dialect override from command line: .{} uses '{}'", ext, token);
      self.dialects.insert(ext, DialectConfig::line(&token));
    }
    Ok(())
  }

  /// Normalize extension keys to lowercase without a leading dot.
  fn normalize(self) -> Self {
    let dialects = self
      .dialects
      .into_iter()
      .map(|(k, v)| (k.to_lowercase(), v))
      .collect();

    Self {
      dialects,
      files: self.files,
    }
  }
}

/// Parse a `EXT=TOKEN` command line dialect.
pub fn parse_dialect_arg(spec: &str) -> Result<(String, String), ConfigError> {
  let Some((ext, token)) = spec.split_once('=') else {
    return Err(ConfigError::InvalidDialect {
      extension: spec.to_string(),
      message: "expected EXT=TOKEN".to_string(),
    });
  };

  let ext = ext.trim().trim_start_matches('.').to_lowercase();
  let token = token.trim();
  if ext.is_empty() || token.is_empty() {
    return Err(ConfigError::InvalidDialect {
      extension: spec.to_string(),
      message: "extension and token must both be non-empty".to_string(),
    });
  }
  Ok((ext, token.to_string()))
}

/// Discover the configuration file path.
///
/// The configuration file is discovered in the following order:
/// 1. Path specified via `--config` flag (passed as `explicit_path`)
/// 2. Path specified via `COPYRIGHT_KEEPER_CONFIG` environment variable
/// 3. `.copyright-keeper.toml` in the workspace root
///
/// # Returns
///
/// The path to the configuration file, or `None` if no config file is found.
pub fn discover_config_path(explicit_path: Option<&Path>, workspace_root: &Path) -> Option<PathBuf> {
  if let Some(path) = explicit_path {
    if path.exists() {
      verbose_log!("Using explicit config path: {}", path.display());
      return Some(path.to_path_buf());
    }
    verbose_log!("Explicit config path does not exist: {}", path.display());
    return None;
  }

  if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
    let path = PathBuf::from(&env_path);
    if path.exists() {
      verbose_log!("Using config from {}: {}", CONFIG_ENV_VAR, path.display());
      return Some(path);
    }
    verbose_log!("{} path does not exist: {}", CONFIG_ENV_VAR, env_path);
  }

  let workspace_config = workspace_root.join(DEFAULT_CONFIG_FILENAME);
  if workspace_config.exists() {
    verbose_log!("Using workspace config: {}", workspace_config.display());
    return Some(workspace_config);
  }

  verbose_log!("No config file found");
  None
}

/// Load configuration from the discovered path, or return a default config.
///
/// # Arguments
///
/// * `explicit_path` - Optional explicit path from CLI flag
/// * `workspace_root` - The workspace root directory
/// * `no_config` - If true, skip config file discovery and use defaults
pub fn load_config(explicit_path: Option<&Path>, workspace_root: &Path, no_config: bool) -> Result<Config> {
  if no_config {
    verbose_log!("Config file discovery disabled (--no-config)");
    return Ok(Config::default());
  }

  match discover_config_path(explicit_path, workspace_root) {
    Some(path) => Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display())),
    None => Ok(Config::default()),
  }
}
