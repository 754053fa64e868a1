use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format is not supported. Contains the name
  /// of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so a fresh file explains
/// itself.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# wikimark configuration file

# Base URL of uploaded attachments. `attachment:` and `~/` links and relative
# image sources are resolved against it.
attachments_url = "/attachments"

# Prefix of internal page URLs, rendered as {page_url_base}/{id}/{slug}
page_url_base = "/wiki"

# Text replaced by the table of contents
toc_placeholder = "{TOC}"

# Enable GitHub flavoured extensions (tables, footnotes, strikethrough, task
# lists, autolinks)
gfm = true

# Custom token definitions, applied in order before parsing (TOML or JSON)
# tokens_path = "tokens.toml"
#
# [[token]]
# name = "warning"
# search_regex = "\\{warn\\}"
# html_replacement = "<span class=\"warning\">!</span>"

# HTML whitelist replacing the built-in one (TOML or JSON)
# whitelist_path = "whitelist.toml"
#
# [[element]]
# tag = "a"
# attributes = ["href", "title"]

[plugins]
# Show [nowiki]...[/nowiki] blocks literally
nowiki = true

# Open links to other sites in a new tab with rel="nofollow noopener"
external_links = false
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "attachments_url": "/attachments",
  "page_url_base": "/wiki",
  "toc_placeholder": "{TOC}",
  "gfm": true,
  "plugins": {
    "nowiki": true,
    "external_links": false
  }
}
"#;

/// Default configuration content for `format` (`toml` or `json`).
///
/// # Errors
///
/// Returns [`TemplateError::UnsupportedFormat`] for any other format.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;
  use crate::Config;

  #[test]
  fn test_templates_parse_to_defaults() {
    let from_toml: Config = toml::from_str(DEFAULT_TOML_TEMPLATE).unwrap();
    let from_json: Config = serde_json::from_str(DEFAULT_JSON_TEMPLATE).unwrap();

    assert_eq!(from_toml, Config::default());
    assert_eq!(from_json, Config::default());
  }

  #[test]
  fn test_unsupported_format() {
    assert!(get_template("yaml").is_err());
    assert_eq!(get_template("TOML").unwrap(), DEFAULT_TOML_TEMPLATE);
  }
}
