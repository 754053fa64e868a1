//! Attribute value cleaning.
//!
//! Keyword stripping is a best-effort blacklist layered on top of the element
//! and attribute allowlist and the blanket character encoding below. It makes
//! no claim of catching every obfuscation; the allowlist is what keeps output
//! safe.
use std::{fmt::Write, sync::LazyLock};

use log::error;
use regex::Regex;

use crate::utils::never_matching_regex;

/// Case-insensitive pattern for `word` allowing any whitespace between its
/// letters, so `jav\tas\ncript` still matches `javascript`.
fn spaced_keyword(word: &str) -> Regex {
  let letters: Vec<String> = word
    .chars()
    .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
    .collect();
  let pattern = format!(r"(?i){}", letters.join(r"\s*"));

  Regex::new(&pattern).unwrap_or_else(|e| {
    error!("Failed to compile keyword regex for '{word}': {e}");
    never_matching_regex()
  })
}

static JAVASCRIPT: LazyLock<Regex> = LazyLock::new(|| spaced_keyword("javascript"));
static SCRIPT: LazyLock<Regex> = LazyLock::new(|| spaced_keyword("script"));
static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| spaced_keyword("expression"));
static BEHAVIOR: LazyLock<Regex> = LazyLock::new(|| spaced_keyword("behavior"));
static MOCHA: LazyLock<Regex> = LazyLock::new(|| spaced_keyword("mocha"));

/// Remove script-bearing keywords from an attribute value.
///
/// `javascript` and `script` are removed everywhere; `style` also loses
/// `expression` and `behavior`, `href` and `src` lose `mocha`. Stripping is
/// repeated until the value stops changing so removed keywords cannot
/// reassemble (`javajavascriptscript`).
#[must_use]
pub fn strip_dangerous_keywords(attribute: &str, value: &str) -> String {
  let mut keywords: Vec<&Regex> = vec![&*JAVASCRIPT, &*SCRIPT];
  match attribute.to_ascii_lowercase().as_str() {
    "style" => keywords.extend([&*EXPRESSION, &*BEHAVIOR]),
    "href" | "src" => keywords.push(&*MOCHA),
    _ => {},
  }

  let mut current = value.to_string();
  loop {
    let mut next = current.clone();
    for keyword in &keywords {
      if keyword.is_match(&next) {
        next = keyword.replace_all(&next, "").into_owned();
      }
    }
    if next == current {
      return current;
    }
    current = next;
  }
}

/// Encode an attribute value for output.
///
/// ASCII letters and digits are written as is; every other character becomes
/// a hexadecimal character reference, two digits up to U+00FF and at least
/// four above. Control characters other than tab, LF and CR are replaced by
/// U+FFFD.
#[must_use]
pub fn encode_attribute_value(value: &str) -> String {
  let mut out = String::with_capacity(value.len() * 2);
  for c in value.chars() {
    if c.is_ascii_alphanumeric() {
      out.push(c);
    } else if c.is_control() && !matches!(c, '\t' | '\n' | '\r') {
      out.push_str("&#xFFFD;");
    } else {
      let code = u32::from(c);
      let _ = if code <= 0xFF {
        write!(out, "&#x{code:02X};")
      } else {
        write!(out, "&#x{code:04X};")
      };
    }
  }
  out
}

/// Strip keywords from a decoded attribute value and encode the result.
#[must_use]
pub fn clean_attribute_value(attribute: &str, value: &str) -> String {
  encode_attribute_value(&strip_dangerous_keywords(attribute, value))
}
