//! Helpers around the kuchikikiki DOM shared by the dialect, plugins,
//! sanitizer and TOC builder.
use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{QualName, local_name, ns};
use tendril::TendrilSink;

/// Parse an HTML fragment and return its `<body>` element.
///
/// The input is parsed behind an explicit `<body>` start tag so that elements
/// normally hoisted into `<head>` (`<script>`, `<style>`, `<meta>`, ...) stay
/// in document order with the rest of the fragment.
#[must_use]
pub fn parse_fragment(html: &str) -> NodeRef {
  let document = kuchikikiki::parse_html().one(format!("<body>{html}").as_str());
  document
    .select_first("body")
    .map(|body| body.as_node().clone())
    .unwrap_or(document)
}

/// Serialize the children of `node` with the stock html5ever serializer.
#[must_use]
pub fn inner_html(node: &NodeRef) -> String {
  let mut out = Vec::new();
  for child in node.children() {
    if child.serialize(&mut out).is_err() {
      log::warn!("Failed to serialize DOM node, output truncated");
      break;
    }
  }
  String::from_utf8(out).unwrap_or_default()
}

/// Parse `html`, hand the fragment root to `transform`, and serialize back.
pub fn transform_fragment<F>(html: &str, transform: F) -> String
where
  F: FnOnce(&NodeRef),
{
  let body = parse_fragment(html);
  transform(&body);
  inner_html(&body)
}

/// Create an HTML element with the given attributes.
#[must_use]
pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), tag.into()),
    attributes.iter().map(|(name, value)| {
      (ExpandedName::new("", *name), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

/// Lowercase local name of an element node, `None` for other node kinds.
#[must_use]
pub fn tag_name(node: &NodeRef) -> Option<String> {
  node
    .as_element()
    .map(|element| element.name.local.to_ascii_lowercase().to_string())
}

/// Read an attribute value from an element node.
#[must_use]
pub fn attribute(node: &NodeRef, name: &str) -> Option<String> {
  node
    .as_element()
    .and_then(|element| element.attributes.borrow().get(name).map(str::to_string))
}

/// Set an attribute value on an element node.
pub fn set_attribute(node: &NodeRef, name: &str, value: &str) {
  if let Some(element) = node.as_element() {
    element
      .attributes
      .borrow_mut()
      .insert(name, value.to_string());
  }
}

/// Remove an attribute from an element node.
pub fn remove_attribute(node: &NodeRef, name: &str) {
  if let Some(element) = node.as_element() {
    element.attributes.borrow_mut().remove(name);
  }
}

/// Whether `node` sits inside an element with one of the given tag names.
#[must_use]
pub fn is_inside(node: &NodeRef, tags: &[&str]) -> bool {
  node.ancestors().any(|ancestor| {
    ancestor.as_element().is_some_and(|element| {
      tags.iter().any(|tag| (&*element.name.local).eq_ignore_ascii_case(tag))
    })
  })
}

/// Whether `node` is an `<a>` element.
#[must_use]
pub fn is_anchor(node: &NodeRef) -> bool {
  node
    .as_element()
    .is_some_and(|element| element.name.local == local_name!("a"))
}
