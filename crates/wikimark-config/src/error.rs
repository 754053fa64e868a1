use std::io;

use thiserror::Error;
use wikimark_markup::PluginError;

/// Error type for wikimark-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("TOML error: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("Plugin error: {0}")]
  Plugin(#[from] PluginError),
}
