//! Plugins shipped with the pipeline.
use std::sync::LazyLock;

use log::error;
use regex::Regex;

use super::{TextPlugin, protect::protect};
use crate::{
  error::PluginError,
  utils::{dom, never_matching_regex, starts_with_ignore_case},
};

static NOWIKI_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)\[nowiki\](.*?)\[/nowiki\]").unwrap_or_else(|e| {
    error!("Failed to compile NOWIKI_BLOCK regex: {e}");
    never_matching_regex()
  })
});

/// `[nowiki]...[/nowiki]` blocks are shown literally: the content is
/// HTML-escaped and kept away from the dialect parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoWikiPlugin;

impl NoWikiPlugin {
  pub const ID: &'static str = "nowiki";
}

impl TextPlugin for NoWikiPlugin {
  fn id(&self) -> &str {
    Self::ID
  }

  fn before_parse(&self, text: &str) -> Result<String, PluginError> {
    Ok(
      NOWIKI_BLOCK
        .replace_all(text, |caps: &regex::Captures| {
          let content = caps.get(1).map_or("", |m| m.as_str());
          protect(&html_escape::encode_safe(content))
        })
        .into_owned(),
    )
  }
}

/// Marks links to other sites: `target="_blank"`, `rel="nofollow noopener"`
/// and the `external-link` class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalLinksPlugin;

impl ExternalLinksPlugin {
  pub const ID: &'static str = "external-links";
  pub const CLASS: &'static str = "external-link";
}

impl TextPlugin for ExternalLinksPlugin {
  fn id(&self) -> &str {
    Self::ID
  }

  fn after_parse(&self, html: &str) -> Result<String, PluginError> {
    if !html.contains("<a") {
      return Ok(html.to_string());
    }

    Ok(dom::transform_fragment(html, |body| {
      let anchors: Vec<_> =
        body.descendants().filter(dom::is_anchor).collect();

      for anchor in anchors {
        let Some(href) = dom::attribute(&anchor, "href") else {
          continue;
        };
        if !starts_with_ignore_case(&href, "http://")
          && !starts_with_ignore_case(&href, "https://")
        {
          continue;
        }

        dom::set_attribute(&anchor, "target", "_blank");
        dom::set_attribute(&anchor, "rel", "nofollow noopener");
        let class = match dom::attribute(&anchor, "class") {
          Some(existing)
            if existing.split_whitespace().any(|c| c == Self::CLASS) =>
          {
            existing
          },
          Some(existing) if !existing.trim().is_empty() => {
            format!("{existing} {}", Self::CLASS)
          },
          _ => Self::CLASS.to_string(),
        };
        dom::set_attribute(&anchor, "class", &class);
      }
    }))
  }
}
