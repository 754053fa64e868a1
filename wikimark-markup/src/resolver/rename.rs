//! Rewriting internal links when a page is renamed.
//!
//! The link pattern is derived from the dialect's own link tokens, so these
//! functions work for any [`DialectParser`] without knowing its grammar.
use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use crate::dialect::{DialectParser, LINK_TEXT_PLACEHOLDER, URL_PLACEHOLDER};

const URL_GROUP: &str = "url";
const BARE_URL_GROUP: &str = "bare";

/// Build the regex matching links to `title` in `dialect`'s syntax.
///
/// The link tokens are escaped so brackets and every other metacharacter in
/// them match literally. The first `%URL%` becomes the named `url` group and
/// the first `%LINKTEXT%` the named `text` group; further occurrences match
/// the same way without capturing. A dialect with a bare link form also
/// matches that form, its target captured as `bare`.
///
/// # Errors
///
/// Returns an error if the resulting regex does not compile.
pub fn page_link_regex(
  dialect: &dyn DialectParser,
  title: &str,
) -> Result<Regex, regex::Error> {
  let title = regex::escape(title);
  let full = link_pattern(
    &format!("{}{}", dialect.link_start(), dialect.link_end()),
    &title,
    URL_GROUP,
  );

  let pattern = match dialect.bare_link() {
    Some(bare) => {
      format!("{full}|{}", link_pattern(bare, &title, BARE_URL_GROUP))
    },
    None => full,
  };

  RegexBuilder::new(&pattern).case_insensitive(true).build()
}

fn link_pattern(template: &str, title: &str, group: &str) -> String {
  // Escaping leaves the `%NAME%` placeholders untouched
  regex::escape(template)
    .replacen(LINK_TEXT_PLACEHOLDER, "(?P<text>.*?)", 1)
    .replace(LINK_TEXT_PLACEHOLDER, "(?:.*?)")
    .replacen(URL_PLACEHOLDER, &format!("(?P<{group}>{title})"), 1)
    .replace(URL_PLACEHOLDER, &format!("(?:{title})"))
}

/// Whether `text` contains a link to the page titled `title`.
#[must_use]
pub fn contains_page_link(
  dialect: &dyn DialectParser,
  text: &str,
  title: &str,
) -> bool {
  if title.is_empty() {
    return false;
  }

  match page_link_regex(dialect, title) {
    Ok(re) => re.is_match(text),
    Err(e) => {
      warn!("Could not build link pattern for '{title}': {e}");
      false
    },
  }
}

/// Point every link to `old_title` at `new_title`.
///
/// Only the title inside each link is replaced; link text and all surrounding
/// markup are preserved byte for byte.
#[must_use]
pub fn replace_page_links(
  dialect: &dyn DialectParser,
  text: &str,
  old_title: &str,
  new_title: &str,
) -> String {
  if old_title.is_empty() {
    return text.to_string();
  }

  let re = match page_link_regex(dialect, old_title) {
    Ok(re) => re,
    Err(e) => {
      warn!("Could not build link pattern for '{old_title}': {e}");
      return text.to_string();
    },
  };

  let mut output = String::with_capacity(text.len());
  let mut last = 0;
  let mut replaced = 0;

  for caps in re.captures_iter(text) {
    let Some(url) = caps.name(URL_GROUP).or_else(|| caps.name(BARE_URL_GROUP))
    else {
      continue;
    };
    output.push_str(&text[last..url.start()]);
    output.push_str(new_title);
    last = url.end();
    replaced += 1;
  }
  output.push_str(&text[last..]);

  debug!("Rewrote {replaced} link(s) from '{old_title}' to '{new_title}'");
  output
}
