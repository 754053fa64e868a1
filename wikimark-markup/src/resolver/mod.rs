//! Link and image resolution against the page catalog and attachment store.
pub mod rename;

use std::{fs, path::Path, sync::Arc};

use log::{debug, trace};

pub use self::rename::{contains_page_link, replace_page_links};
use crate::{
  dialect::ReferenceVisitor,
  error::MarkupResult,
  types::{ImageEvent, LinkEvent, PageLookupResult},
  utils::{slugify, starts_with_ignore_case, strip_prefix_ignore_case},
};

/// Default URL prefix for internal page links.
pub const DEFAULT_PAGE_URL_BASE: &str = "/wiki";

/// Default URL prefix for attachments.
pub const DEFAULT_ATTACHMENTS_URL: &str = "/attachments";

/// Page lookup by title.
pub trait PageCatalog: Send + Sync {
  /// Find a page whose title matches `title` case-insensitively.
  fn find_by_title(&self, title: &str) -> Option<PageLookupResult>;
}

impl<F> PageCatalog for F
where
  F: Fn(&str) -> Option<PageLookupResult> + Send + Sync,
{
  fn find_by_title(&self, title: &str) -> Option<PageLookupResult> {
    self(title)
  }
}

/// Provides the URL prefix attachments are served under.
pub trait AttachmentPathProvider: Send + Sync {
  fn base_url(&self) -> String;
}

/// In-memory page catalog.
#[derive(Debug, Clone, Default)]
pub struct StaticPageCatalog {
  pages: Vec<PageLookupResult>,
}

impl StaticPageCatalog {
  #[must_use]
  pub const fn new(pages: Vec<PageLookupResult>) -> Self {
    Self { pages }
  }

  /// Parse a catalog from a JSON array of `{"id": .., "title": ..}` records.
  ///
  /// # Errors
  ///
  /// Returns an error if the JSON is malformed.
  pub fn from_json(json: &str) -> MarkupResult<Self> {
    Ok(Self::new(serde_json::from_str(json)?))
  }

  /// Load a catalog from a JSON file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed.
  pub fn from_json_file(path: &Path) -> MarkupResult<Self> {
    let content = fs::read_to_string(path)?;
    Self::from_json(&content)
  }

  #[must_use]
  pub fn pages(&self) -> &[PageLookupResult] {
    &self.pages
  }
}

impl PageCatalog for StaticPageCatalog {
  fn find_by_title(&self, title: &str) -> Option<PageLookupResult> {
    let wanted = title.to_lowercase();
    self
      .pages
      .iter()
      .find(|page| page.title.to_lowercase() == wanted)
      .cloned()
  }
}

/// Attachment base URL fixed at construction time.
#[derive(Debug, Clone)]
pub struct StaticAttachmentPath(String);

impl StaticAttachmentPath {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self(base_url.into())
  }
}

impl Default for StaticAttachmentPath {
  fn default() -> Self {
    Self::new(DEFAULT_ATTACHMENTS_URL)
  }
}

impl AttachmentPathProvider for StaticAttachmentPath {
  fn base_url(&self) -> String {
    self.0.clone()
  }
}

/// Rewrites attachment references and internal page links as the dialect
/// reports them.
#[derive(Clone)]
pub struct ReferenceResolver {
  catalog:       Arc<dyn PageCatalog>,
  attachments:   Arc<dyn AttachmentPathProvider>,
  page_url_base: String,
}

impl std::fmt::Debug for ReferenceResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ReferenceResolver")
      .field("attachments", &self.attachments.base_url())
      .field("page_url_base", &self.page_url_base)
      .finish_non_exhaustive()
  }
}

impl Default for ReferenceResolver {
  fn default() -> Self {
    Self::new(
      Arc::new(StaticPageCatalog::default()),
      Arc::new(StaticAttachmentPath::default()),
    )
  }
}

impl ReferenceResolver {
  #[must_use]
  pub fn new(
    catalog: Arc<dyn PageCatalog>,
    attachments: Arc<dyn AttachmentPathProvider>,
  ) -> Self {
    Self {
      catalog,
      attachments,
      page_url_base: DEFAULT_PAGE_URL_BASE.to_string(),
    }
  }

  /// Set the prefix internal page URLs are built under.
  #[must_use]
  pub fn with_page_url_base(mut self, base: &str) -> Self {
    self.page_url_base = base.trim_end_matches('/').to_string();
    self
  }

  /// Attachment base URL without a trailing slash.
  fn attachments_base(&self) -> String {
    self.attachments.base_url().trim_end_matches('/').to_string()
  }

  /// Canonical URL of a catalog page.
  #[must_use]
  pub fn page_url(&self, page: &PageLookupResult) -> String {
    format!("{}/{}/{}", self.page_url_base, page.id, slugify(&page.title))
  }

  /// Resolve an image source.
  pub fn resolve_image(&self, image: &mut ImageEvent) {
    let src = image.original_src.trim();
    if src.is_empty() || is_absolute_image(src) {
      return;
    }

    let src = strip_prefix_ignore_case(src, "File:").unwrap_or(src);
    let separator = if src.starts_with('/') { "" } else { "/" };
    image.resolved_src = format!("{}{separator}{src}", self.attachments_base());
  }

  /// Resolve a link href.
  pub fn resolve_link(&self, link: &mut LinkEvent) {
    let href = link.original_href.trim();
    if href.is_empty() {
      return;
    }

    if is_absolute_link(href) || href.starts_with('#') {
      link.target = None;
      return;
    }

    if let Some(path) = strip_prefix_ignore_case(href, "attachment:") {
      let path = path.trim_start_matches('/');
      link.resolved_href = format!("{}/{path}", self.attachments_base());
    } else if let Some(path) = href.strip_prefix('~') {
      if path.starts_with('/') {
        link.resolved_href = format!("{}{path}", self.attachments_base());
      } else {
        self.resolve_page_link(link);
      }
    } else {
      self.resolve_page_link(link);
    }
  }

  fn resolve_page_link(&self, link: &mut LinkEvent) {
    let href = link.original_href.trim();
    let (title, fragment) = match href.split_once('#') {
      Some((title, fragment)) => (title.trim(), Some(fragment)),
      None => (href, None),
    };

    let Some(page) = self.catalog.find_by_title(title) else {
      debug!("No page titled '{title}', leaving link as authored");
      return;
    };

    let mut url = self.page_url(&page);
    if let Some(fragment) = fragment.filter(|f| !f.is_empty()) {
      url.push('#');
      url.push_str(fragment);
    }
    trace!("Internal link '{href}' -> '{url}'");
    link.resolved_href = url;
    link.target = None;
  }
}

impl ReferenceVisitor for ReferenceResolver {
  fn visit_link(&self, link: &mut LinkEvent) {
    self.resolve_link(link);
  }

  fn visit_image(&self, image: &mut ImageEvent) {
    self.resolve_image(image);
  }
}

fn is_absolute_image(src: &str) -> bool {
  ["http://", "https://", "www."]
    .iter()
    .any(|prefix| starts_with_ignore_case(src, prefix))
}

fn is_absolute_link(href: &str) -> bool {
  ["http://", "https://", "www.", "mailto:"]
    .iter()
    .any(|prefix| starts_with_ignore_case(href, prefix))
}
