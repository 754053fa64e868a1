//! Error types for markup operations.
use std::io;

use thiserror::Error;

/// Result type for markup operations.
pub type MarkupResult<T> = Result<T, MarkupError>;

/// Errors raised while loading pipeline configuration.
///
/// None of these abort a render: the pipeline logs them and falls back to an
/// empty token set or the default whitelist.
#[derive(Debug, Error)]
pub enum MarkupError {
  #[error("Failed to load custom tokens: {0}")]
  TokenSource(String),

  #[error("Failed to load HTML whitelist: {0}")]
  WhitelistSource(String),

  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

/// Errors raised by text plugins and plugin registration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PluginError {
  #[error("A plugin with id '{0}' is already registered")]
  DuplicateId(String),

  #[error("Plugin '{id}' failed: {message}")]
  Hook { id: String, message: String },
}

impl PluginError {
  /// Hook failure raised by the plugin `id`.
  pub fn hook(id: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Hook {
      id:      id.into(),
      message: message.into(),
    }
  }
}
