//! Table of contents generation.
use std::collections::HashSet;

use kuchikikiki::NodeRef;
use log::trace;

use crate::{
  sanitizer::serialize_children,
  types::TocEntry,
  utils::{dom, slugify},
};

/// Default placeholder replaced by the table of contents.
pub const DEFAULT_TOC_PLACEHOLDER: &str = "{TOC}";

const TOC_HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5"];

/// Builds heading trees and injects tables of contents.
#[derive(Debug, Clone)]
pub struct TocBuilder {
  placeholder: String,
}

impl Default for TocBuilder {
  fn default() -> Self {
    Self::new(DEFAULT_TOC_PLACEHOLDER)
  }
}

impl TocBuilder {
  pub fn new(placeholder: impl Into<String>) -> Self {
    Self {
      placeholder: placeholder.into(),
    }
  }

  #[must_use]
  pub fn placeholder(&self) -> &str {
    &self.placeholder
  }

  /// Whether `html` contains the placeholder.
  #[must_use]
  pub fn has_placeholder(&self, html: &str) -> bool {
    !self.placeholder.is_empty() && html.contains(&self.placeholder)
  }

  /// Give every heading an id and replace each placeholder with a nested
  /// list linking to them.
  ///
  /// Returns `html` unchanged when it has no placeholder. Without headings
  /// the placeholder is simply removed.
  #[must_use]
  pub fn insert_toc(&self, html: &str) -> String {
    if !self.has_placeholder(html) {
      return html.to_string();
    }

    let body = dom::parse_fragment(html);
    let entries = annotate_headings(&body, true, self.skipped_heading());
    trace!("Inserting table of contents with {} top-level entries", entries.len());

    // A placeholder inside a heading stays literal text
    let placeholders: Vec<NodeRef> = body
      .descendants()
      .filter(|node| {
        node
          .as_text()
          .is_some_and(|text| text.borrow().contains(&self.placeholder))
          && !dom::is_inside(node, TOC_HEADINGS)
      })
      .collect();

    for text_node in placeholders {
      self.replace_placeholder(&text_node, &entries);
    }

    serialize_children(&body)
  }

  /// Heading tree of `html`, ids as [`insert_toc`](Self::insert_toc) would
  /// assign them.
  #[must_use]
  pub fn headings(&self, html: &str) -> Vec<TocEntry> {
    annotate_headings(&dom::parse_fragment(html), false, self.skipped_heading())
  }

  /// Headings reading just the placeholder are not listed.
  fn skipped_heading(&self) -> Option<&str> {
    Some(self.placeholder.as_str()).filter(|p| !p.is_empty())
  }

  fn replace_placeholder(&self, text_node: &NodeRef, entries: &[TocEntry]) {
    let content = text_node
      .as_text()
      .map(|text| text.borrow().clone())
      .unwrap_or_default();

    // A paragraph holding nothing but the placeholder is replaced outright
    if let Some(parent) = text_node.parent() {
      let only_child = parent.children().count() == 1;
      if only_child
        && dom::tag_name(&parent).as_deref() == Some("p")
        && content.trim() == self.placeholder
      {
        if !entries.is_empty() {
          parent.insert_before(render_toc(entries));
        }
        parent.detach();
        return;
      }
    }

    let mut parts = content.split(self.placeholder.as_str()).peekable();
    while let Some(part) = parts.next() {
      if !part.is_empty() {
        text_node.insert_before(NodeRef::new_text(part));
      }
      if parts.peek().is_some() && !entries.is_empty() {
        text_node.insert_before(render_toc(entries));
      }
    }
    text_node.detach();
  }
}

/// Heading tree of `html`.
#[must_use]
pub fn headings(html: &str) -> Vec<TocEntry> {
  annotate_headings(&dom::parse_fragment(html), false, None)
}

/// Collect `h1`-`h5` under `root` into a tree, optionally writing the
/// generated ids back onto the headings.
///
/// An existing unique id is kept; otherwise the id is the slug of the heading
/// text (`section` if that is empty), suffixed `-1`, `-2`, ... on collision.
/// Headings whose text equals `skip` are left out and keep their attributes.
fn annotate_headings(
  root: &NodeRef,
  write_ids: bool,
  skip: Option<&str>,
) -> Vec<TocEntry> {
  let mut used = HashSet::new();
  let mut flat = Vec::new();

  let found = root.descendants().filter_map(|node| {
    let tag = dom::tag_name(&node)?;
    let level = TOC_HEADINGS.iter().position(|h| *h == tag)?;
    Some((node, u8::try_from(level + 1).unwrap_or(1)))
  });

  for (node, level) in found {
    let text = node.text_contents().trim().to_string();
    if skip.is_some_and(|skip| skip == text) {
      continue;
    }
    let id = match dom::attribute(&node, "id") {
      Some(existing) if !existing.is_empty() && !used.contains(&existing) => {
        existing
      },
      _ => unique_id(&text, &used),
    };
    used.insert(id.clone());

    if write_ids {
      dom::set_attribute(&node, "id", &id);
    }
    flat.push(TocEntry {
      level,
      id,
      text,
      children: Vec::new(),
    });
  }

  build_tree(flat)
}

fn unique_id(text: &str, used: &HashSet<String>) -> String {
  let mut base = slugify(text);
  if base.is_empty() {
    base = "section".to_string();
  }

  if !used.contains(&base) {
    return base;
  }
  let mut suffix = 1;
  loop {
    let candidate = format!("{base}-{suffix}");
    if !used.contains(&candidate) {
      return candidate;
    }
    suffix += 1;
  }
}

/// Nest a flat heading list: each heading owns the deeper headings that
/// follow it until one of equal or shallower level.
fn build_tree(flat: Vec<TocEntry>) -> Vec<TocEntry> {
  let mut roots = Vec::new();
  let mut open: Vec<TocEntry> = Vec::new();

  for entry in flat {
    close_until(&mut open, &mut roots, Some(entry.level));
    open.push(entry);
  }
  close_until(&mut open, &mut roots, None);

  roots
}

fn close_until(
  open: &mut Vec<TocEntry>,
  roots: &mut Vec<TocEntry>,
  level: Option<u8>,
) {
  while open
    .last()
    .is_some_and(|top| level.is_none_or(|level| top.level >= level))
  {
    let Some(done) = open.pop() else {
      break;
    };
    match open.last_mut() {
      Some(parent) => parent.children.push(done),
      None => roots.push(done),
    }
  }
}

fn render_toc(entries: &[TocEntry]) -> NodeRef {
  let container = dom::new_element("div", &[("class", "toc")]);
  container.append(render_list(entries));
  container
}

fn render_list(entries: &[TocEntry]) -> NodeRef {
  let list = dom::new_element("ul", &[]);
  for entry in entries {
    let item = dom::new_element("li", &[]);
    let href = format!("#{}", entry.id);
    let link = dom::new_element("a", &[("href", href.as_str())]);
    link.append(NodeRef::new_text(entry.text.as_str()));
    item.append(link);
    if !entry.children.is_empty() {
      item.append(render_list(&entry.children));
    }
    list.append(item);
  }
  list
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_two_level_tree() {
    let html = "<p>{TOC}</p><h1>A</h1><p>x</p><h2>B</h2>";
    let out = TocBuilder::default().insert_toc(html);

    assert_eq!(
      out,
      "<div class=\"toc\"><ul><li><a href=\"&#x23;a\">A</a><ul><li><a \
       href=\"&#x23;b\">B</a></li></ul></li></ul></div><h1 \
       id=\"a\">A</h1><p>x</p><h2 id=\"b\">B</h2>"
    );
  }

  #[test]
  fn test_duplicate_and_empty_ids() {
    let entries = headings("<h2>Intro</h2><h2>Intro</h2><h3>!!</h3><h2>intro</h2>");
    let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["intro", "intro-1", "intro-2"]);
    assert_eq!(entries[1].children[0].id, "section");
  }

  #[test]
  fn test_tree_shape() {
    let entries = headings("<h2>a</h2><h3>b</h3><h4>c</h4><h3>d</h3><h1>e</h1><h6>f</h6>");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "a");
    assert_eq!(entries[0].children.len(), 2);
    assert_eq!(entries[0].children[0].children[0].text, "c");
    assert_eq!(entries[1].text, "e");
    assert!(entries[1].children.is_empty());
  }

  #[test]
  fn test_no_headings_removes_placeholder() {
    let out = TocBuilder::default().insert_toc("<p>{TOC}</p><p>body</p>");
    assert_eq!(out, "<p>body</p>");
  }

  #[test]
  fn test_inline_placeholder_splits_text() {
    let out = TocBuilder::default().insert_toc("<p>before {TOC} after</p><h1>T</h1>");
    assert!(out.starts_with("<p>before <div class=\"toc\">"), "{out}");
    assert!(out.contains("</div> after</p>"), "{out}");
  }

  #[test]
  fn test_without_placeholder_is_untouched() {
    let html = "<h1>A</h1>";
    assert_eq!(TocBuilder::default().insert_toc(html), html);
    assert_eq!(TocBuilder::new("").insert_toc("<p>{TOC}</p>"), "<p>{TOC}</p>");
  }

  #[test]
  fn test_placeholder_inside_heading_is_not_expanded() {
    let builder = TocBuilder::default();
    let out = builder.insert_toc("<h1>{TOC}</h1><p>{TOC}</p><h2>B</h2>");

    assert_eq!(
      out,
      "<h1>{TOC}</h1><div class=\"toc\"><ul><li><a \
       href=\"&#x23;b\">B</a></li></ul></div><h2 id=\"b\">B</h2>"
    );
    assert_eq!(builder.headings(&out).len(), 1);
  }

  #[test]
  fn test_existing_ids_kept() {
    let entries = headings(r#"<h1 id="top">A</h1><h1 id="top">B</h1>"#);
    assert_eq!(entries[0].id, "top");
    assert_eq!(entries[1].id, "b");
  }
}
