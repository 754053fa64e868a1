//! Error boundary around rendering.
use std::panic::{AssertUnwindSafe, catch_unwind};

use log::error;

use crate::utils::panic_message;

/// Safely process markup content, failing closed.
///
/// Runs `processor_fn` and, should it panic, logs the failure and returns
/// `fallback(content)` instead. The fallback must produce output that is safe
/// to show as is; partially processed content is never returned.
///
/// # Arguments
///
/// * `content` - The content to process
/// * `processor_fn` - The processing function to apply
/// * `fallback` - Builds the replacement output from the original content
///
/// # Returns
///
/// The processed content or the fallback output on error
pub fn process_safe<F, G>(content: &str, processor_fn: F, fallback: G) -> String
where
  F: FnOnce(&str) -> String,
  G: FnOnce(&str) -> String,
{
  // Avoid processing empty strings
  if content.is_empty() {
    return String::new();
  }

  match catch_unwind(AssertUnwindSafe(|| processor_fn(content))) {
    Ok(processed) => processed,
    Err(payload) => {
      error!(
        "Error rendering markup, falling back to escaped text: {}",
        panic_message(&*payload)
      );
      fallback(content)
    },
  }
}

/// Escape raw markup so it displays as text.
#[must_use]
pub fn escape_markup(markup: &str) -> String {
  html_escape::encode_safe(markup).into_owned()
}
