//! Allowlist HTML sanitizer.
//!
//! The element and attribute allowlist is the primary control. Attribute
//! values additionally lose script-bearing keywords and are written fully
//! character-encoded; those are secondary layers and not a completeness
//! guarantee.
//!
//! Elements outside the allowlist are removed together with everything they
//! contain, not unwrapped.
pub mod encode;
pub mod serialize;
pub mod whitelist;

use std::{
  panic::{AssertUnwindSafe, catch_unwind},
  sync::Arc,
};

use kuchikikiki::{ElementData, NodeData, NodeRef};
use log::{error, trace};

pub use self::{
  encode::{clean_attribute_value, encode_attribute_value, strip_dangerous_keywords},
  serialize::serialize_children,
  whitelist::{Whitelist, WhitelistSource, default_rules},
};
use crate::utils::{dom, panic_message};

/// Removes everything the whitelist does not allow.
#[derive(Debug, Clone, Default)]
pub struct HtmlSanitizer {
  whitelist: Arc<Whitelist>,
}

impl HtmlSanitizer {
  #[must_use]
  pub const fn new(whitelist: Arc<Whitelist>) -> Self {
    Self { whitelist }
  }

  #[must_use]
  pub fn whitelist(&self) -> &Whitelist {
    &self.whitelist
  }

  /// Sanitize an HTML fragment.
  ///
  /// Never panics; if anything goes wrong internally the result is empty
  /// rather than partially sanitized.
  #[must_use]
  pub fn sanitize(&self, html: &str) -> String {
    if html.is_empty() {
      return String::new();
    }

    match catch_unwind(AssertUnwindSafe(|| self.sanitize_fragment(html))) {
      Ok(sanitized) => sanitized,
      Err(payload) => {
        error!(
          "Sanitizer failed, discarding output: {}",
          panic_message(&*payload)
        );
        String::new()
      },
    }
  }

  fn sanitize_fragment(&self, html: &str) -> String {
    let body = dom::parse_fragment(html);
    self.clean_tree(&body);
    serialize_children(&body)
  }

  /// Clean the descendants of `root` in place.
  pub fn clean_tree(&self, root: &NodeRef) {
    let mut stack: Vec<NodeRef> = root.children().collect();

    while let Some(node) = stack.pop() {
      match node.data() {
        NodeData::Element(element) => {
          let tag = element.name.local.to_ascii_lowercase();
          if !self.whitelist.allows_tag(&tag) {
            trace!("Removing <{tag}> and its content");
            node.detach();
            continue;
          }
          self.clean_attributes(&tag, element);
          stack.extend(node.children());
        },
        NodeData::Text(_) => {},
        NodeData::Comment(_)
        | NodeData::ProcessingInstruction(_)
        | NodeData::Doctype(_)
        | NodeData::Document(_)
        | NodeData::DocumentFragment => node.detach(),
      }
    }
  }

  fn clean_attributes(&self, tag: &str, element: &ElementData) {
    let mut attributes = element.attributes.borrow_mut();

    attributes.map.retain(|name, attribute| {
      let allowed = name.ns.is_empty()
        && attribute.prefix.is_none()
        && self.whitelist.allows_attribute(tag, &name.local);
      if !allowed {
        trace!("Removing attribute '{}' from <{tag}>", name.local);
      }
      allowed
    });

    for (name, attribute) in &mut attributes.map {
      attribute.value = strip_dangerous_keywords(&name.local, &attribute.value);
    }
  }
}
