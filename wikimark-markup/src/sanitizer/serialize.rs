//! HTML serialization for sanitized trees.
//!
//! Attribute values are always written through
//! [`encode_attribute_value`](super::encode::encode_attribute_value), so no
//! attribute can carry markup or a quote out of its value. The walk is
//! iterative; deeply nested input cannot overflow the stack.
use kuchikikiki::{NodeData, NodeRef};

use super::encode::encode_attribute_value;

const VOID_ELEMENTS: &[&str] = &[
  "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
  "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
  "script",
  "style",
  "xmp",
  "iframe",
  "noembed",
  "noframes",
  "plaintext",
  "noscript",
];

/// Elements whose first newline is dropped by the parser.
const NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

enum Step {
  Enter(NodeRef),
  Leave(String),
}

/// Serialize the children of `root`.
#[must_use]
pub fn serialize_children(root: &NodeRef) -> String {
  let mut out = String::new();
  let mut stack: Vec<Step> = root.children().rev().map(Step::Enter).collect();

  while let Some(step) = stack.pop() {
    let node = match step {
      Step::Leave(tag) => {
        out.push_str("</");
        out.push_str(&tag);
        out.push('>');
        continue;
      },
      Step::Enter(node) => node,
    };

    match node.data() {
      NodeData::Element(element) => {
        let tag = element.name.local.to_string();
        out.push('<');
        out.push_str(&tag);
        for (name, attribute) in &element.attributes.borrow().map {
          out.push(' ');
          out.push_str(&name.local);
          out.push_str("=\"");
          out.push_str(&encode_attribute_value(&attribute.value));
          out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&tag.as_str()) {
          continue;
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
          for child in node.children() {
            if let Some(text) = child.as_text() {
              out.push_str(&text.borrow());
            }
          }
          stack.push(Step::Leave(tag));
          continue;
        }

        if NEWLINE_ELEMENTS.contains(&tag.as_str())
          && node
            .first_child()
            .and_then(|child| child.as_text().map(|t| t.borrow().starts_with('\n')))
            .unwrap_or(false)
        {
          out.push('\n');
        }

        stack.push(Step::Leave(tag));
        stack.extend(node.children().rev().map(Step::Enter));
      },
      NodeData::Text(text) => {
        out.push_str(&html_escape::encode_text(&*text.borrow()));
      },
      NodeData::Document(_) | NodeData::DocumentFragment => {
        stack.extend(node.children().rev().map(Step::Enter));
      },
      NodeData::Comment(_)
      | NodeData::ProcessingInstruction(_)
      | NodeData::Doctype(_) => {},
    }
  }

  out
}
