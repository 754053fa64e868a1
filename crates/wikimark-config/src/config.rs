use std::{
  fs,
  path::{Path, PathBuf},
  sync::Arc,
};

use serde::{Deserialize, Serialize};
use wikimark_markup::{
  ExternalLinksPlugin,
  MarkdownDialect,
  MarkupPipeline,
  NoWikiPlugin,
  PageCatalog,
  PipelineOptions,
  resolver::{DEFAULT_ATTACHMENTS_URL, DEFAULT_PAGE_URL_BASE},
  toc::DEFAULT_TOC_PLACEHOLDER,
};

use crate::{
  error::ConfigError,
  sources::{FileTokenSource, FileWhitelistSource},
};

/// File names looked up, in order, when no config file is given.
pub const CONFIG_FILENAMES: [&str; 4] = [
  "wikimark.toml",
  "wikimark.json",
  ".wikimark.toml",
  ".wikimark.json",
];

/// Configuration for the wikimark render pipeline.
///
/// Every field has a default, so an empty file is a valid configuration.
/// Relative paths in a loaded file are resolved against the directory the
/// file lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Base URL of uploaded attachments.
  pub attachments_url: String,

  /// Prefix of internal page URLs.
  pub page_url_base: String,

  /// Custom token definitions (TOML or JSON).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tokens_path: Option<PathBuf>,

  /// HTML whitelist replacing the built-in one (TOML or JSON).
  #[serde(skip_serializing_if = "Option::is_none")]
  pub whitelist_path: Option<PathBuf>,

  /// Text replaced by the table of contents.
  pub toc_placeholder: String,

  /// Whether the Markdown dialect enables GitHub flavoured extensions.
  pub gfm: bool,

  /// Built-in plugins to register.
  pub plugins: PluginsConfig,
}

/// Toggles for the plugins shipped with the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
  /// `[nowiki]...[/nowiki]` blocks.
  pub nowiki: bool,

  /// `target="_blank"` and `rel="nofollow noopener"` on external links.
  pub external_links: bool,
}

impl Default for PluginsConfig {
  fn default() -> Self {
    Self {
      nowiki:         true,
      external_links: false,
    }
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      attachments_url: DEFAULT_ATTACHMENTS_URL.to_string(),
      page_url_base:   DEFAULT_PAGE_URL_BASE.to_string(),
      tokens_path:     None,
      whitelist_path:  None,
      toc_placeholder: DEFAULT_TOC_PLACEHOLDER.to_string(),
      gfm:             true,
      plugins:         PluginsConfig::default(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Io`] if the file cannot be read,
  /// [`ConfigError::Toml`] or [`ConfigError::Serde`] if it cannot be parsed,
  /// and [`ConfigError::Config`] if the format is unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(str::to_lowercase);

    let config: Self = match extension.as_deref() {
      Some("json") => serde_json::from_str(&fs::read_to_string(path)?)?,
      Some("toml") => toml::from_str(&fs::read_to_string(path)?)?,
      Some(_) => {
        return Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )));
      },
      None => {
        return Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )));
      },
    };

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.resolve_paths(base))
  }

  /// Load the given config file, or the one discovered in the working
  /// directory, or the defaults.
  ///
  /// # Errors
  ///
  /// Returns an error if the chosen file cannot be loaded.
  pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
    if let Some(path) = config_file {
      return Self::from_file(path);
    }

    let Some(discovered) = std::env::current_dir()
      .ok()
      .and_then(|dir| Self::find_config_file_in(&dir))
    else {
      log::debug!("No config file found, using defaults");
      return Ok(Self::default());
    };

    log::info!("Using discovered config file: {}", discovered.display());
    Self::from_file(&discovered).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to load discovered config from {}: {}",
        discovered.display(),
        e
      ))
    })
  }

  /// Search `dir` for one of [`CONFIG_FILENAMES`].
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|name| dir.join(name))
      .find(|path| path.is_file())
  }

  fn resolve_paths(mut self, base: &Path) -> Self {
    let resolve = |path: PathBuf| {
      if path.is_relative() {
        base.join(path)
      } else {
        path
      }
    };
    self.tokens_path = self.tokens_path.map(resolve);
    self.whitelist_path = self.whitelist_path.map(resolve);
    self
  }

  /// Pipeline options derived from this configuration.
  #[must_use]
  pub fn pipeline_options(&self) -> PipelineOptions {
    PipelineOptions {
      toc_placeholder: self.toc_placeholder.clone(),
      page_url_base: self.page_url_base.clone(),
      ..Default::default()
    }
  }

  /// Assemble a render pipeline resolving internal links against `catalog`.
  ///
  /// Token and whitelist files are only read on the first render, a missing
  /// or broken file degrades to no tokens or the default whitelist.
  ///
  /// # Errors
  ///
  /// Returns an error if a plugin cannot be registered.
  pub fn build_pipeline(
    &self,
    catalog: Arc<dyn PageCatalog>,
  ) -> Result<MarkupPipeline, ConfigError> {
    let mut builder = MarkupPipeline::builder(MarkdownDialect::new(self.gfm))
      .catalog(catalog)
      .attachments_url(&self.attachments_url)
      .options(self.pipeline_options());

    if let Some(ref path) = self.tokens_path {
      builder = builder.token_source(Arc::new(FileTokenSource::new(path)));
    }
    if let Some(ref path) = self.whitelist_path {
      builder =
        builder.whitelist_source(Arc::new(FileWhitelistSource::new(path)));
    }

    if self.plugins.nowiki {
      builder = builder.plugin(NoWikiPlugin)?;
    }
    if self.plugins.external_links {
      builder = builder.plugin(ExternalLinksPlugin)?;
    }

    let pipeline = builder.build();
    log::debug!(
      "Pipeline plugins: {:?}",
      pipeline.plugins().ids().collect::<Vec<_>>()
    );
    Ok(pipeline)
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Config(e.to_string()))?;

    fs::write(path, config_content)?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}
