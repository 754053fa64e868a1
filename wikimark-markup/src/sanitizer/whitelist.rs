//! Element and attribute allowlist.
use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::{error::MarkupResult, types::HtmlElementRule};

/// Somewhere allowlist rules can be read from.
pub trait WhitelistSource: Send + Sync {
  /// Load the allowed elements, in order.
  ///
  /// # Errors
  ///
  /// Returns an error if the source is missing or cannot be parsed.
  fn load_rules(&self) -> MarkupResult<Vec<HtmlElementRule>>;
}

impl WhitelistSource for Vec<HtmlElementRule> {
  fn load_rules(&self) -> MarkupResult<Vec<HtmlElementRule>> {
    Ok(self.clone())
  }
}

/// Immutable set of allowed elements and their attributes.
///
/// Tag and attribute names are matched case-insensitively. A tag listed more
/// than once allows the union of its attribute lists.
#[derive(Debug, Clone)]
pub struct Whitelist {
  rules: Vec<HtmlElementRule>,
  index: HashMap<String, HashSet<String>>,
}

impl Default for Whitelist {
  fn default() -> Self {
    Self::new(default_rules())
  }
}

impl Whitelist {
  #[must_use]
  pub fn new(rules: Vec<HtmlElementRule>) -> Self {
    let mut index: HashMap<String, HashSet<String>> = HashMap::new();
    for rule in &rules {
      let tag = rule.tag.trim().to_ascii_lowercase();
      if tag.is_empty() {
        continue;
      }
      index.entry(tag).or_default().extend(
        rule
          .attributes
          .iter()
          .map(|attribute| attribute.trim().to_ascii_lowercase()),
      );
    }
    Self { rules, index }
  }

  /// Load rules from `source`, falling back to the built-in defaults with a
  /// warning when it is absent or fails.
  #[must_use]
  pub fn load(source: Option<&dyn WhitelistSource>) -> Self {
    let Some(source) = source else {
      debug!("No whitelist source configured, using the default whitelist");
      return Self::default();
    };

    match source.load_rules() {
      Ok(rules) => {
        if rules.is_empty() {
          warn!("Whitelist source is empty, every element will be removed");
        }
        Self::new(rules)
      },
      Err(e) => {
        warn!("{e}; using the default whitelist");
        Self::default()
      },
    }
  }

  /// Rules in the order they were loaded.
  #[must_use]
  pub fn rules(&self) -> &[HtmlElementRule] {
    &self.rules
  }

  #[must_use]
  pub fn allows_tag(&self, tag: &str) -> bool {
    self.index.contains_key(&tag.to_ascii_lowercase())
  }

  #[must_use]
  pub fn allows_attribute(&self, tag: &str, attribute: &str) -> bool {
    self
      .index
      .get(&tag.to_ascii_lowercase())
      .is_some_and(|allowed| allowed.contains(&attribute.to_ascii_lowercase()))
  }
}

/// Built-in allowlist used when no source is configured.
#[must_use]
pub fn default_rules() -> Vec<HtmlElementRule> {
  const CELL: &[&str] = &[
    "class", "colspan", "rowspan", "align", "valign", "width", "style",
  ];
  const HEADING: &[&str] = &["id", "class", "style"];

  vec![
    HtmlElementRule::new("a", &["href", "title", "class", "id", "name", "target", "rel"]),
    HtmlElementRule::new("abbr", &["title"]),
    HtmlElementRule::new("b", &["class"]),
    HtmlElementRule::new("blockquote", &["cite", "class"]),
    HtmlElementRule::new("br", &[]),
    HtmlElementRule::new("caption", &["class"]),
    HtmlElementRule::new("cite", &[]),
    HtmlElementRule::new("code", &["class"]),
    HtmlElementRule::new("col", &["span", "width"]),
    HtmlElementRule::new("colgroup", &["span", "width"]),
    HtmlElementRule::new("dd", &["class"]),
    HtmlElementRule::new("del", &["datetime"]),
    HtmlElementRule::new("div", &["class", "id", "style", "align"]),
    HtmlElementRule::new("dl", &["class"]),
    HtmlElementRule::new("dt", &["class"]),
    HtmlElementRule::new("em", &["class"]),
    HtmlElementRule::new("h1", HEADING),
    HtmlElementRule::new("h2", HEADING),
    HtmlElementRule::new("h3", HEADING),
    HtmlElementRule::new("h4", HEADING),
    HtmlElementRule::new("h5", HEADING),
    HtmlElementRule::new("h6", HEADING),
    HtmlElementRule::new("hr", &["class"]),
    HtmlElementRule::new("i", &["class"]),
    HtmlElementRule::new("img", &[
      "src", "alt", "title", "width", "height", "class", "align", "border",
    ]),
    HtmlElementRule::new("ins", &["datetime"]),
    HtmlElementRule::new("kbd", &[]),
    HtmlElementRule::new("li", &["class", "id"]),
    HtmlElementRule::new("ol", &["class", "start", "type"]),
    HtmlElementRule::new("p", &["class", "style", "align"]),
    HtmlElementRule::new("pre", &["class"]),
    HtmlElementRule::new("s", &[]),
    HtmlElementRule::new("section", &["class", "id"]),
    HtmlElementRule::new("small", &[]),
    HtmlElementRule::new("span", &["class", "style", "title", "id"]),
    HtmlElementRule::new("strike", &[]),
    HtmlElementRule::new("strong", &["class"]),
    HtmlElementRule::new("sub", &[]),
    HtmlElementRule::new("sup", &["class", "id"]),
    HtmlElementRule::new("table", &[
      "class", "border", "cellpadding", "cellspacing", "width", "style",
    ]),
    HtmlElementRule::new("tbody", &[]),
    HtmlElementRule::new("td", CELL),
    HtmlElementRule::new("tfoot", &[]),
    HtmlElementRule::new("th", &[
      "class", "colspan", "rowspan", "align", "valign", "width", "style",
      "scope",
    ]),
    HtmlElementRule::new("thead", &[]),
    HtmlElementRule::new("tr", &["class", "align", "valign"]),
    HtmlElementRule::new("u", &[]),
    HtmlElementRule::new("ul", &["class"]),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::MarkupError;

  struct Unreadable;

  impl WhitelistSource for Unreadable {
    fn load_rules(&self) -> MarkupResult<Vec<HtmlElementRule>> {
      Err(MarkupError::WhitelistSource("whitelist.toml: not found".into()))
    }
  }

  #[test]
  fn test_case_insensitive_lookup() {
    let whitelist = Whitelist::new(vec![HtmlElementRule::new("IMG", &["SRC"])]);
    assert!(whitelist.allows_tag("img"));
    assert!(whitelist.allows_tag("Img"));
    assert!(whitelist.allows_attribute("img", "src"));
    assert!(!whitelist.allows_attribute("img", "onerror"));
    assert!(!whitelist.allows_tag("script"));
  }

  #[test]
  fn test_duplicate_tags_merge() {
    let whitelist = Whitelist::new(vec![
      HtmlElementRule::new("a", &["href"]),
      HtmlElementRule::new("A", &["title"]),
    ]);
    assert!(whitelist.allows_attribute("a", "href"));
    assert!(whitelist.allows_attribute("a", "title"));
    assert_eq!(whitelist.rules().len(), 2);
  }

  #[test]
  fn test_fallback_to_default() {
    let whitelist = Whitelist::load(Some(&Unreadable));
    assert!(whitelist.allows_tag("p"));
    assert!(whitelist.allows_attribute("a", "href"));
    assert!(!whitelist.allows_tag("script"));
    assert!(Whitelist::load(None).allows_tag("table"));
  }

  #[test]
  fn test_default_rules_exclude_script_vectors() {
    let whitelist = Whitelist::default();
    for tag in ["script", "style", "iframe", "object", "embed", "form", "svg"] {
      assert!(!whitelist.allows_tag(tag), "{tag}");
    }
    for rule in default_rules() {
      assert!(
        rule.attributes.iter().all(|a| !a.starts_with("on")),
        "{}",
        rule.tag
      );
    }
  }
}
