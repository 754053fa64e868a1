//! # wikimark-markup
//!
//! The rendering half of a wiki engine: turns user-authored wiki markup into
//! safe, navigable HTML.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wikimark_markup::{
//!   MarkdownDialect,
//!   MarkupPipeline,
//!   PageLookupResult,
//!   StaticPageCatalog,
//! };
//!
//! let catalog = StaticPageCatalog::new(vec![PageLookupResult {
//!   id:    5,
//!   title: "Home".to_string(),
//! }]);
//!
//! let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
//!   .catalog(Arc::new(catalog))
//!   .attachments_url("/attachments")
//!   .build();
//!
//! let html = pipeline.render("Back to [[Home|the start]].");
//! assert!(html.contains("the start"));
//! ```
//!
//! ## Pipeline
//!
//! - **Custom tokens**: operator-defined regex substitutions on raw markup
//! - **Dialect parsing** through the [`DialectParser`] trait, with a comrak
//!   Markdown dialect behind the default `markdown` feature
//! - **Link resolution** of attachments and internal page links against a
//!   [`PageCatalog`]
//! - **Plugins** with `before_parse`/`after_parse` hooks and protected regions
//! - **Allowlist sanitization** of elements, attributes and attribute values
//! - **Tables of contents** wherever the `{TOC}` placeholder appears
//!
//! Whitelist and token configuration are loaded once per cache key and shared
//! by concurrent renders. A render never panics: unexpected failures return
//! the escaped markup.
pub mod cache;
pub mod dialect;
pub mod error;
pub mod plugins;
pub mod processor;
pub mod resolver;
pub mod sanitizer;
pub mod toc;
pub mod tokens;
pub mod types;
pub mod utils;

#[cfg(feature = "markdown")]
pub use crate::dialect::MarkdownDialect;
pub use crate::{
  cache::SnapshotCache,
  dialect::{DialectParser, NoopVisitor, ReferenceVisitor},
  error::{MarkupError, MarkupResult, PluginError},
  plugins::{ExternalLinksPlugin, NoWikiPlugin, PluginChain, TextPlugin, protect},
  processor::{MarkupPipeline, PipelineBuilder, PipelineOptions},
  resolver::{
    AttachmentPathProvider,
    PageCatalog,
    ReferenceResolver,
    StaticAttachmentPath,
    StaticPageCatalog,
    contains_page_link,
    replace_page_links,
  },
  sanitizer::{HtmlSanitizer, Whitelist, WhitelistSource},
  toc::TocBuilder,
  tokens::{TokenReplacer, TokenSource},
  types::{
    HtmlElementRule,
    ImageEvent,
    LinkEvent,
    PageLookupResult,
    RenderResult,
    TextToken,
    TocEntry,
  },
};
