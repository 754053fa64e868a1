//! Markdown dialect backed by comrak.
//!
//! Internal page links use the wikilink form `[[Page Title|link text]]`, or
//! `[[Page Title]]` to show the title itself; ordinary Markdown links and images work as usual. Raw HTML is passed
//! through untouched, the sanitizer deals with it later in the pipeline.
use comrak::{Options, markdown_to_html};
use kuchikikiki::NodeRef;
use log::trace;
use percent_encoding::percent_decode_str;

use super::{DialectParser, ReferenceVisitor};
use crate::{
  types::{ImageEvent, LinkEvent},
  utils::dom,
};

const LINK_START: &str = "[[%URL%|";
const LINK_END: &str = "%LINKTEXT%]]";
const BARE_LINK: &str = "[[%URL%]]";

/// CommonMark (optionally GFM) with wikilinks.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownDialect {
  gfm: bool,
}

impl Default for MarkdownDialect {
  fn default() -> Self {
    Self { gfm: true }
  }
}

impl MarkdownDialect {
  #[must_use]
  pub const fn new(gfm: bool) -> Self {
    Self { gfm }
  }

  /// Build comrak options.
  fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    options.extension.wikilinks_title_after_pipe = true;
    options.render.r#unsafe = true;
    options
  }
}

impl DialectParser for MarkdownDialect {
  fn transform(&self, text: &str, visitor: &dyn ReferenceVisitor) -> String {
    let html = markdown_to_html(text, &self.comrak_options());
    dom::transform_fragment(&html, |body| discover_references(body, visitor))
  }

  fn link_start(&self) -> &str {
    LINK_START
  }

  fn link_end(&self) -> &str {
    LINK_END
  }

  fn bare_link(&self) -> Option<&str> {
    Some(BARE_LINK)
  }

  fn name(&self) -> &str {
    "markdown"
  }
}

/// Fire link and image events in document order and apply the results.
fn discover_references(body: &NodeRef, visitor: &dyn ReferenceVisitor) {
  // Collect first, the visitor must see the tree as the parser produced it
  let references: Vec<NodeRef> = body
    .descendants()
    .filter(|node| {
      matches!(dom::tag_name(node).as_deref(), Some("a" | "img"))
    })
    .collect();

  for node in references {
    if dom::is_anchor(&node) {
      visit_link(&node, visitor);
    } else {
      visit_image(&node, visitor);
    }
  }
}

fn visit_link(node: &NodeRef, visitor: &dyn ReferenceVisitor) {
  let Some(href) = dom::attribute(node, "href") else {
    return;
  };

  let mut link = LinkEvent::new(&decode_url(&href), &node.text_contents());
  link.target = dom::attribute(node, "target");
  visitor.visit_link(&mut link);

  if link.is_resolved() {
    trace!("Link '{}' resolved to '{}'", link.original_href, link.resolved_href);
    dom::set_attribute(node, "href", &link.resolved_href);
  }
  match link.target.as_deref() {
    Some(target) => dom::set_attribute(node, "target", target),
    None => dom::remove_attribute(node, "target"),
  }
}

fn visit_image(node: &NodeRef, visitor: &dyn ReferenceVisitor) {
  let Some(src) = dom::attribute(node, "src") else {
    return;
  };

  let mut image = ImageEvent::new(&decode_url(&src));
  image.alt = dom::attribute(node, "alt").unwrap_or_default();
  image.title = dom::attribute(node, "title").unwrap_or_default();
  image.horizontal_align = dom::attribute(node, "align");
  visitor.visit_image(&mut image);

  if image.is_resolved() {
    trace!("Image '{}' resolved to '{}'", image.original_src, image.resolved_src);
    dom::set_attribute(node, "src", &image.resolved_src);
  }
  if let Some(align) = image.horizontal_align.as_deref() {
    dom::set_attribute(node, "align", align);
  }
}

/// comrak percent-encodes hrefs, visitors want the authored text back.
fn decode_url(url: &str) -> String {
  percent_decode_str(url).decode_utf8_lossy().into_owned()
}
