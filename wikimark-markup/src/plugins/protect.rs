//! Protected regions.
//!
//! A plugin marks content it has already rendered with [`protect`]. Between
//! the `before_parse` fold and the end of the pipeline each complete region is
//! replaced by an opaque alphanumeric placeholder, which neither the dialect
//! parser nor the sanitizer alters, and the content is put back verbatim as
//! the last step.
//!
//! Content is only put back where a placeholder sits in ordinary text.
//! Placeholders that ended up in an attribute value or in raw text such as
//! `<style>` are dropped, since region content is markup and would otherwise
//! land unsanitized in a context it can escape from.
//!
//! Sentinels are stripped from user markup before any processing, so only
//! plugins can create regions.
use kuchikikiki::NodeData;

use crate::{sanitizer::serialize_children, utils::dom};

/// Opening sentinel of a protected region.
pub const PROTECT_START: &str = "{{{wikimark:protect}}}";

/// Closing sentinel of a protected region.
pub const PROTECT_END: &str = "{{{/wikimark:protect}}}";

const PLACEHOLDER_STEM: &str = "wmprotect";

/// Elements whose text content is not HTML-escaped on output.
const RAW_CONTENT_ELEMENTS: &[&str] = &[
  "script",
  "style",
  "xmp",
  "iframe",
  "noembed",
  "noframes",
  "plaintext",
  "noscript",
  "textarea",
  "title",
];

/// Wrap `content` in protection sentinels.
#[must_use]
pub fn protect(content: &str) -> String {
  format!("{PROTECT_START}{content}{PROTECT_END}")
}

/// Remove every sentinel string from `text`.
///
/// Repeats until none is left, so removing one cannot join the text around it
/// into a new sentinel.
#[must_use]
pub fn strip_sentinels(text: &str) -> String {
  let mut current = text.to_string();
  while current.contains(PROTECT_START) || current.contains(PROTECT_END) {
    current = current.replace(PROTECT_START, "").replace(PROTECT_END, "");
  }
  current
}

/// Content of the protected regions of one render.
#[derive(Debug, Clone, Default)]
pub struct ProtectedRegions {
  prefix:  String,
  regions: Vec<String>,
}

impl ProtectedRegions {
  /// Swap every complete region in `text` for a placeholder.
  ///
  /// An opening sentinel without a matching close is left in place.
  #[must_use]
  pub fn extract(text: &str) -> (String, Self) {
    if !text.contains(PROTECT_START) {
      return (text.to_string(), Self::default());
    }

    // Pick a prefix that cannot collide with anything in the input
    let mut salt = 0_u32;
    let mut prefix = format!("{PLACEHOLDER_STEM}{salt}x");
    while text.contains(&prefix) {
      salt += 1;
      prefix = format!("{PLACEHOLDER_STEM}{salt}x");
    }

    let mut regions = Self {
      prefix,
      regions: Vec::new(),
    };
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(PROTECT_START) {
      let after_start = &rest[start + PROTECT_START.len()..];
      let Some(end) = after_start.find(PROTECT_END) else {
        break;
      };

      output.push_str(&rest[..start]);
      output.push_str(&regions.placeholder(regions.regions.len()));
      regions.regions.push(strip_sentinels(&after_start[..end]));
      rest = &after_start[end + PROTECT_END.len()..];
    }
    output.push_str(rest);

    (output, regions)
  }

  fn placeholder(&self, index: usize) -> String {
    format!("{}{index}x", self.prefix)
  }

  /// Put the region content back in place of the placeholders found in text
  /// nodes of `html`, dropping every other placeholder.
  #[must_use]
  pub fn restore(&self, html: &str) -> String {
    if self.regions.is_empty() || !html.contains(&self.prefix) {
      return html.to_string();
    }

    let mut output = self.scrub_placeholders(html);
    for (index, content) in self.regions.iter().enumerate() {
      output = output.replace(&self.placeholder(index), content);
    }
    output
  }

  /// Remove placeholders from attribute values and raw text. Afterwards any
  /// placeholder left in the serialized output is in text context.
  fn scrub_placeholders(&self, html: &str) -> String {
    let body = dom::parse_fragment(html);

    for node in body.descendants() {
      match node.data() {
        NodeData::Element(element) => {
          for attribute in element.attributes.borrow_mut().map.values_mut() {
            if attribute.value.contains(&self.prefix) {
              attribute.value = self.remove_placeholders(&attribute.value);
            }
          }
        },
        NodeData::Text(text) => {
          let raw_content = node
            .parent()
            .and_then(|parent| dom::tag_name(&parent))
            .is_some_and(|tag| RAW_CONTENT_ELEMENTS.contains(&tag.as_str()));
          if raw_content && text.borrow().contains(&self.prefix) {
            let cleaned = self.remove_placeholders(&text.borrow());
            *text.borrow_mut() = cleaned;
          }
        },
        _ => {},
      }
    }

    serialize_children(&body)
  }

  /// Remove placeholders from `value`, repeating until the prefix is gone so
  /// the text around a removed one cannot join into a new one.
  fn remove_placeholders(&self, value: &str) -> String {
    let mut current = value.to_string();
    while current.contains(&self.prefix) {
      for index in (0..self.regions.len()).rev() {
        current = current.replace(&self.placeholder(index), "");
      }
      current = current.replace(&self.prefix, "");
    }
    current
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.regions.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.regions.is_empty()
  }
}
