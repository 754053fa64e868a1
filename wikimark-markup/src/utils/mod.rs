pub mod dom;

use std::any::Any;

use regex::Regex;

/// Slugify a string for use as an anchor ID.
/// Converts to lowercase, replaces non-alphanumeric characters with dashes,
/// collapses dash runs and trims leading/trailing dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
  let replaced = text
    .to_lowercase()
    .replace(|c: char| !c.is_alphanumeric() && c != '-' && c != '_', "-");

  let mut slug = String::with_capacity(replaced.len());
  for c in replaced.chars() {
    if c == '-' && slug.ends_with('-') {
      continue;
    }
    slug.push(c);
  }
  slug.trim_matches('-').to_string()
}

/// Case-insensitive ASCII prefix check.
#[must_use]
pub fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
  text
    .get(..prefix.len())
    .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Strip `prefix` from `text` ignoring ASCII case.
#[must_use]
pub fn strip_prefix_ignore_case<'a>(
  text: &'a str,
  prefix: &str,
) -> Option<&'a str> {
  if starts_with_ignore_case(text, prefix) {
    text.get(prefix.len()..)
  } else {
    None
  }
}

/// Create a regex that never matches anything.
///
/// This is used as a fallback pattern when a regex fails to compile.
/// It will never match any input, which is safer than using a trivial regex
/// like `^$` which would match empty strings.
///
/// # Panics
///
/// Panics if the fallback regex pattern `r"^\b$"` fails to compile, which
/// should never happen.
#[must_use]
pub fn never_matching_regex() -> Regex {
  #[allow(clippy::unwrap_used, reason = "This pattern is guaranteed to be valid")]
  let fallback = || Regex::new(r"^\b$").unwrap();
  Regex::new(r"[^\s\S]").unwrap_or_else(|_| fallback())
}

/// Best-effort message of a caught panic payload.
#[must_use]
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else {
    "unknown panic payload".to_string()
  }
}
