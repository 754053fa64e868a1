//! Type definitions for the render pipeline.
//!
//! # Examples
//!
//! ```
//! use wikimark_markup::{MarkdownDialect, MarkupPipeline, PipelineOptions};
//!
//! let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
//!   .options(PipelineOptions {
//!     page_url_base: "/pages".to_string(),
//!     ..Default::default()
//!   })
//!   .build();
//!
//! assert!(pipeline.render("# Hello").contains("Hello"));
//! ```
use std::{fmt, sync::Arc};

use crate::{
  cache::SnapshotCache,
  dialect::DialectParser,
  error::PluginError,
  plugins::{PluginChain, TextPlugin},
  resolver::{
    AttachmentPathProvider,
    DEFAULT_PAGE_URL_BASE,
    PageCatalog,
    ReferenceResolver,
    StaticAttachmentPath,
    StaticPageCatalog,
  },
  sanitizer::{Whitelist, WhitelistSource},
  toc::{DEFAULT_TOC_PLACEHOLDER, TocBuilder},
  tokens::{TokenReplacer, TokenSource},
};

/// Default cache key for the whitelist snapshot.
pub const DEFAULT_WHITELIST_KEY: &str = "wikimark:whitelist";

/// Default cache key for the compiled token rules.
pub const DEFAULT_TOKENS_KEY: &str = "wikimark:tokens";

/// Options for configuring the render pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
  /// Text replaced by the table of contents.
  pub toc_placeholder: String,

  /// Cache key of the whitelist snapshot. Pipelines sharing a cache and a key
  /// share one whitelist.
  pub whitelist_key: String,

  /// Cache key of the compiled token rules.
  pub tokens_key: String,

  /// Prefix of internal page URLs (`{page_url_base}/{id}/{slug}`).
  pub page_url_base: String,
}

impl Default for PipelineOptions {
  fn default() -> Self {
    Self {
      toc_placeholder: DEFAULT_TOC_PLACEHOLDER.to_string(),
      whitelist_key:   DEFAULT_WHITELIST_KEY.to_string(),
      tokens_key:      DEFAULT_TOKENS_KEY.to_string(),
      page_url_base:   DEFAULT_PAGE_URL_BASE.to_string(),
    }
  }
}

/// The markup rendering pipeline.
///
/// Cheap to share: wrap it in an [`Arc`] and render from as many threads as
/// needed. Configuration snapshots are built on first use and reused until
/// [`reload`](Self::reload).
pub struct MarkupPipeline {
  pub(crate) dialect:          Arc<dyn DialectParser>,
  pub(crate) resolver:         ReferenceResolver,
  pub(crate) plugins:          PluginChain,
  pub(crate) token_source:     Option<Arc<dyn TokenSource>>,
  pub(crate) whitelist_source: Option<Arc<dyn WhitelistSource>>,
  pub(crate) whitelists:       Arc<SnapshotCache<Whitelist>>,
  pub(crate) tokens:           Arc<SnapshotCache<TokenReplacer>>,
  pub(crate) toc:              TocBuilder,
  pub(crate) options:          PipelineOptions,
}

impl fmt::Debug for MarkupPipeline {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MarkupPipeline")
      .field("dialect", &self.dialect.name())
      .field("resolver", &self.resolver)
      .field("plugins", &self.plugins)
      .field("options", &self.options)
      .finish_non_exhaustive()
  }
}

/// Builder for [`MarkupPipeline`].
pub struct PipelineBuilder {
  dialect:          Arc<dyn DialectParser>,
  catalog:          Option<Arc<dyn PageCatalog>>,
  attachments:      Option<Arc<dyn AttachmentPathProvider>>,
  token_source:     Option<Arc<dyn TokenSource>>,
  whitelist_source: Option<Arc<dyn WhitelistSource>>,
  plugins:          PluginChain,
  options:          PipelineOptions,
  whitelists:       Option<Arc<SnapshotCache<Whitelist>>>,
  tokens:           Option<Arc<SnapshotCache<TokenReplacer>>>,
}

impl PipelineBuilder {
  /// Create a builder around `dialect` with default options.
  #[must_use]
  pub fn new(dialect: Arc<dyn DialectParser>) -> Self {
    Self {
      dialect,
      catalog: None,
      attachments: None,
      token_source: None,
      whitelist_source: None,
      plugins: PluginChain::new(),
      options: PipelineOptions::default(),
      whitelists: None,
      tokens: None,
    }
  }

  /// Page catalog used to resolve internal links.
  #[must_use]
  pub fn catalog(mut self, catalog: Arc<dyn PageCatalog>) -> Self {
    self.catalog = Some(catalog);
    self
  }

  /// Provider of the attachments base URL.
  #[must_use]
  pub fn attachments(mut self, provider: Arc<dyn AttachmentPathProvider>) -> Self {
    self.attachments = Some(provider);
    self
  }

  /// Serve attachments under a fixed base URL.
  #[must_use]
  pub fn attachments_url(self, base_url: &str) -> Self {
    self.attachments(Arc::new(StaticAttachmentPath::new(base_url)))
  }

  /// Where custom tokens are loaded from.
  #[must_use]
  pub fn token_source(mut self, source: Arc<dyn TokenSource>) -> Self {
    self.token_source = Some(source);
    self
  }

  /// Where the whitelist is loaded from.
  #[must_use]
  pub fn whitelist_source(mut self, source: Arc<dyn WhitelistSource>) -> Self {
    self.whitelist_source = Some(source);
    self
  }

  /// Register a plugin after the ones already registered.
  ///
  /// # Errors
  ///
  /// Returns [`PluginError::DuplicateId`] if the id is taken.
  pub fn plugin<P>(mut self, plugin: P) -> Result<Self, PluginError>
  where
    P: TextPlugin + 'static,
  {
    self.plugins.register(plugin)?;
    Ok(self)
  }

  /// Replace the plugin chain.
  #[must_use]
  pub fn plugins(mut self, plugins: PluginChain) -> Self {
    self.plugins = plugins;
    self
  }

  #[must_use]
  pub fn options(mut self, options: PipelineOptions) -> Self {
    self.options = options;
    self
  }

  /// Share a whitelist cache with other pipelines.
  #[must_use]
  pub fn whitelist_cache(mut self, cache: Arc<SnapshotCache<Whitelist>>) -> Self {
    self.whitelists = Some(cache);
    self
  }

  /// Share a token rule cache with other pipelines.
  #[must_use]
  pub fn token_cache(mut self, cache: Arc<SnapshotCache<TokenReplacer>>) -> Self {
    self.tokens = Some(cache);
    self
  }

  /// Build the pipeline.
  #[must_use]
  pub fn build(self) -> MarkupPipeline {
    let catalog = self
      .catalog
      .unwrap_or_else(|| Arc::new(StaticPageCatalog::default()));
    let attachments = self
      .attachments
      .unwrap_or_else(|| Arc::new(StaticAttachmentPath::default()));
    let resolver = ReferenceResolver::new(catalog, attachments)
      .with_page_url_base(&self.options.page_url_base);

    MarkupPipeline {
      dialect: self.dialect,
      resolver,
      plugins: self.plugins,
      token_source: self.token_source,
      whitelist_source: self.whitelist_source,
      whitelists: self.whitelists.unwrap_or_default(),
      tokens: self.tokens.unwrap_or_default(),
      toc: TocBuilder::new(self.options.toc_placeholder.clone()),
      options: self.options,
    }
  }
}
