//! Core implementation of the render pipeline.
//!
//! Stage order for one render:
//!
//! 1. strip forged protection sentinels from the raw markup
//! 2. custom token replacement
//! 3. plugin `before_parse` hooks, then protected regions are masked
//! 4. dialect parsing, with links and images resolved as they are found
//! 5. plugin `after_parse` hooks, then leftover sentinels are stripped
//! 6. sanitization
//! 7. table of contents
//! 8. protected regions are restored
use std::sync::Arc;

use log::{debug, info, trace};

use super::{
  process::{escape_markup, process_safe},
  types::{MarkupPipeline, PipelineBuilder, PipelineOptions},
};
use crate::{
  dialect::DialectParser,
  plugins::{PluginChain, ProtectedRegions, strip_sentinels},
  resolver::{self, ReferenceResolver},
  sanitizer::{HtmlSanitizer, Whitelist},
  tokens::TokenReplacer,
  types::{RenderResult, TocEntry},
};

impl MarkupPipeline {
  /// Start building a pipeline for `dialect`.
  pub fn builder<D>(dialect: D) -> PipelineBuilder
  where
    D: DialectParser + 'static,
  {
    PipelineBuilder::new(Arc::new(dialect))
  }

  /// A pipeline with default options, no plugins, an empty page catalog and
  /// the default whitelist.
  pub fn new<D>(dialect: D) -> Self
  where
    D: DialectParser + 'static,
  {
    Self::builder(dialect).build()
  }

  /// Access pipeline options.
  #[must_use]
  pub const fn options(&self) -> &PipelineOptions {
    &self.options
  }

  #[must_use]
  pub const fn plugins(&self) -> &PluginChain {
    &self.plugins
  }

  #[must_use]
  pub const fn resolver(&self) -> &ReferenceResolver {
    &self.resolver
  }

  #[must_use]
  pub fn dialect(&self) -> &dyn DialectParser {
    self.dialect.as_ref()
  }

  /// Current whitelist snapshot, loading it on first use.
  #[must_use]
  pub fn whitelist(&self) -> Arc<Whitelist> {
    self.whitelists.get_or_init(&self.options.whitelist_key, || {
      debug!("Loading whitelist for '{}'", self.options.whitelist_key);
      Whitelist::load(self.whitelist_source.as_deref())
    })
  }

  /// Current compiled token rules, loading them on first use.
  #[must_use]
  pub fn token_replacer(&self) -> Arc<TokenReplacer> {
    self.tokens.get_or_init(&self.options.tokens_key, || {
      debug!("Loading custom tokens for '{}'", self.options.tokens_key);
      TokenReplacer::load(self.token_source.as_deref())
    })
  }

  /// Sanitizer over the current whitelist snapshot.
  #[must_use]
  pub fn sanitizer(&self) -> HtmlSanitizer {
    HtmlSanitizer::new(self.whitelist())
  }

  /// Render markup to sanitized HTML.
  ///
  /// Never panics. If rendering fails unexpectedly the failure is logged and
  /// the markup is returned HTML-escaped instead.
  #[must_use]
  pub fn render(&self, markup: &str) -> String {
    process_safe(markup, |text| self.render_unguarded(text), escape_markup)
  }

  /// Render markup and collect its heading tree and title.
  #[must_use]
  pub fn render_result(&self, markup: &str) -> RenderResult {
    let html = self.render(markup);
    let headings = self.toc.headings(&html);
    let title = first_title(&headings);
    RenderResult {
      html,
      headings,
      title,
    }
  }

  fn render_unguarded(&self, markup: &str) -> String {
    let tokens = self.token_replacer();
    let sanitizer = self.sanitizer();

    let text = strip_sentinels(markup);
    let text = tokens.replace_tokens(&text);
    let text = self.plugins.run_before(&text);
    let (text, protected) = ProtectedRegions::extract(&text);
    trace!("Masked {} protected region(s)", protected.len());

    let html = self.dialect.transform(&text, &self.resolver);
    let html = self.plugins.run_after(&html);
    let html = strip_sentinels(&html);

    let html = sanitizer.sanitize(&html);
    let html = self.toc.insert_toc(&html);
    strip_sentinels(&protected.restore(&html))
  }

  /// Whether `text` links to the page titled `title`.
  #[must_use]
  pub fn contains_page_link(&self, text: &str, title: &str) -> bool {
    resolver::contains_page_link(self.dialect.as_ref(), text, title)
  }

  /// Rewrite links to `old_title` so they point at `new_title`.
  #[must_use]
  pub fn replace_page_links(
    &self,
    text: &str,
    old_title: &str,
    new_title: &str,
  ) -> String {
    resolver::replace_page_links(self.dialect.as_ref(), text, old_title, new_title)
  }

  /// Drop the cached whitelist and token rules so the next render reloads
  /// them from their sources.
  pub fn reload(&self) {
    let whitelist = self.whitelists.invalidate(&self.options.whitelist_key);
    let tokens = self.tokens.invalidate(&self.options.tokens_key);
    info!(
      "Configuration reloaded (whitelist cached: {whitelist}, tokens cached: \
       {tokens})"
    );
  }
}

/// Text of the first level-1 heading in document order.
fn first_title(entries: &[TocEntry]) -> Option<String> {
  let mut stack: Vec<&TocEntry> = entries.iter().rev().collect();
  while let Some(entry) = stack.pop() {
    if entry.level == 1 {
      return Some(entry.text.clone());
    }
    stack.extend(entry.children.iter().rev());
  }
  None
}
