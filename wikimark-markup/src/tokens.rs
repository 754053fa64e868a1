//! Custom token replacement applied to raw markup before dialect parsing.
//!
//! Tokens are operator-configured `regex -> HTML` substitutions. They are
//! compiled once per configuration snapshot and applied in load order, each
//! rule seeing the output of the previous one.
use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use crate::{error::MarkupResult, types::TextToken};

/// Somewhere custom token definitions can be read from.
pub trait TokenSource: Send + Sync {
  /// Load token definitions in the order they should be applied.
  ///
  /// # Errors
  ///
  /// Returns an error if the source is missing or cannot be parsed.
  fn load_tokens(&self) -> MarkupResult<Vec<TextToken>>;
}

impl TokenSource for Vec<TextToken> {
  fn load_tokens(&self) -> MarkupResult<Vec<TextToken>> {
    Ok(self.clone())
  }
}

/// A token whose regex compiled successfully.
#[derive(Debug, Clone)]
pub struct CompiledTokenRule {
  pub name:        String,
  pub pattern:     Regex,
  pub replacement: String,
}

impl CompiledTokenRule {
  /// Compile a token definition.
  ///
  /// Patterns are case-sensitive and `.` matches newlines.
  ///
  /// # Errors
  ///
  /// Returns an error if the regex does not compile.
  pub fn compile(token: &TextToken) -> Result<Self, regex::Error> {
    let pattern = RegexBuilder::new(&token.search_regex)
      .case_insensitive(false)
      .dot_matches_new_line(true)
      .build()?;

    Ok(Self {
      name: token.name.clone(),
      pattern,
      replacement: token.html_replacement.clone(),
    })
  }
}

/// Applies compiled custom tokens to markup.
#[derive(Debug, Clone, Default)]
pub struct TokenReplacer {
  rules: Vec<CompiledTokenRule>,
}

impl TokenReplacer {
  /// A replacer with no rules; `replace_tokens` returns its input unchanged.
  #[must_use]
  pub fn empty() -> Self {
    Self::default()
  }

  /// Load and compile tokens from `source`.
  ///
  /// A missing source or a source that fails to load yields an empty rule set
  /// with a warning. Rendering never fails because of token configuration.
  #[must_use]
  pub fn load(source: Option<&dyn TokenSource>) -> Self {
    let Some(source) = source else {
      warn!("No custom token source configured, token replacement disabled");
      return Self::empty();
    };

    match source.load_tokens() {
      Ok(tokens) => Self::from_tokens(&tokens),
      Err(e) => {
        warn!("{e}; custom tokens will not be applied");
        Self::empty()
      },
    }
  }

  /// Compile `tokens`, skipping (and logging) any that are invalid.
  #[must_use]
  pub fn from_tokens(tokens: &[TextToken]) -> Self {
    let mut rules = Vec::with_capacity(tokens.len());

    for token in tokens {
      if token.search_regex.is_empty() {
        warn!("Custom token '{}' has an empty search regex, skipping", token.name);
        continue;
      }

      match CompiledTokenRule::compile(token) {
        Ok(rule) => rules.push(rule),
        Err(e) => {
          warn!(
            "Custom token '{}' has an invalid search regex ({}): {e}",
            token.name, token.search_regex
          );
        },
      }
    }

    debug!("Loaded {} of {} custom tokens", rules.len(), tokens.len());
    Self { rules }
  }

  /// Compiled rules, in application order.
  #[must_use]
  pub fn rules(&self) -> &[CompiledTokenRule] {
    &self.rules
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.rules.is_empty()
  }

  /// Apply every rule, in load order, to the whole text.
  #[must_use]
  pub fn replace_tokens(&self, text: &str) -> String {
    let mut output = text.to_string();
    for rule in &self.rules {
      output = rule
        .pattern
        .replace_all(&output, rule.replacement.as_str())
        .into_owned();
    }
    output
  }
}
