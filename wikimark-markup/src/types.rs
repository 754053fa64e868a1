//! Types for the wikimark-markup public API and internal use.
use serde::{Deserialize, Serialize};

/// A custom token: a regex substitution applied to raw markup before the
/// dialect parser sees it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextToken {
  /// Name used in log messages.
  pub name: String,

  /// Regex searched for in the raw markup.
  #[serde(alias = "searchRegex")]
  pub search_regex: String,

  /// Replacement text, may reference capture groups (`$1`, `${name}`).
  #[serde(alias = "htmlReplacement")]
  pub html_replacement: String,
}

impl TextToken {
  /// Create a new token.
  pub fn new(
    name: impl Into<String>,
    search_regex: impl Into<String>,
    html_replacement: impl Into<String>,
  ) -> Self {
    Self {
      name:             name.into(),
      search_regex:     search_regex.into(),
      html_replacement: html_replacement.into(),
    }
  }
}

/// Allowed element and its allowed attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HtmlElementRule {
  /// Tag name, matched case-insensitively.
  #[serde(alias = "tagName", alias = "name")]
  pub tag: String,

  /// Attribute names allowed on this tag, matched case-insensitively.
  #[serde(default, alias = "allowedAttributes")]
  pub attributes: Vec<String>,
}

impl HtmlElementRule {
  /// Create a rule from a tag and a list of attribute names.
  pub fn new(tag: impl Into<String>, attributes: &[&str]) -> Self {
    Self {
      tag:        tag.into(),
      attributes: attributes.iter().map(|a| (*a).to_string()).collect(),
    }
  }
}

/// A link discovered by the dialect parser.
///
/// `resolved_href` starts out equal to `original_href`; visitors overwrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
  pub original_href: String,
  pub resolved_href: String,
  pub link_text:     String,
  /// Window target (`_blank` and friends). `None` means no override.
  pub target:        Option<String>,
}

impl LinkEvent {
  #[must_use]
  pub fn new(href: &str, link_text: &str) -> Self {
    Self {
      original_href: href.to_string(),
      resolved_href: href.to_string(),
      link_text:     link_text.to_string(),
      target:        None,
    }
  }

  /// Whether a visitor changed the href.
  #[must_use]
  pub fn is_resolved(&self) -> bool {
    self.resolved_href != self.original_href
  }
}

/// An image discovered by the dialect parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEvent {
  pub original_src:     String,
  pub resolved_src:     String,
  pub alt:              String,
  pub title:            String,
  pub horizontal_align: Option<String>,
}

impl ImageEvent {
  #[must_use]
  pub fn new(src: &str) -> Self {
    Self {
      original_src:     src.to_string(),
      resolved_src:     src.to_string(),
      alt:              String::new(),
      title:            String::new(),
      horizontal_align: None,
    }
  }

  #[must_use]
  pub fn is_resolved(&self) -> bool {
    self.resolved_src != self.original_src
  }
}

/// A page found in the page catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageLookupResult {
  pub id:    i64,
  /// Canonical title as stored, which may differ in case from the lookup key.
  pub title: String,
}

/// A node of the heading tree used for tables of contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TocEntry {
  /// Heading level (1-5).
  pub level:    u8,
  /// Generated anchor id, unique within the document.
  pub id:       String,
  /// Heading text content.
  pub text:     String,
  /// Deeper headings that follow this one.
  pub children: Vec<Self>,
}

/// Result of a full render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderResult {
  /// Sanitized HTML output.
  pub html: String,

  /// Heading tree of the output.
  pub headings: Vec<TocEntry>,

  /// Text of the first `h1`, if any.
  pub title: Option<String>,
}
