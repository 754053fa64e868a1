//! File-backed token and whitelist sources.
//!
//! Both accept TOML or JSON, picked by file extension:
//!
//! ```toml
//! [[token]]
//! name = "warning"
//! search_regex = "\\{warn\\}"
//! html_replacement = "<span class=\"warning\">!</span>"
//!
//! [[element]]
//! tag = "a"
//! attributes = ["href", "title"]
//! ```
//!
//! JSON files hold either a bare array of records or an object with the same
//! `token` / `element` key.
use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};
use wikimark_markup::{
  HtmlElementRule,
  MarkupError,
  MarkupResult,
  TextToken,
  TokenSource,
  WhitelistSource,
};

#[derive(Debug, Deserialize)]
struct TokenFile {
  #[serde(default)]
  token: Vec<TextToken>,
}

#[derive(Debug, Deserialize)]
struct WhitelistFile {
  #[serde(default)]
  element: Vec<HtmlElementRule>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonRecords<T, F> {
  List(Vec<T>),
  Table(F),
}

/// Read `path` and parse it by extension. `map_err` wraps error text in the
/// caller's error variant.
fn read_records<T, F, R, E>(
  path: &Path,
  records_of: R,
  map_err: E,
) -> MarkupResult<Vec<T>>
where
  T: DeserializeOwned,
  F: DeserializeOwned,
  R: Fn(F) -> Vec<T>,
  E: Fn(String) -> MarkupError,
{
  let content = fs::read_to_string(path)
    .map_err(|e| map_err(format!("{}: {e}", path.display())))?;

  let extension = path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(str::to_lowercase);

  match extension.as_deref() {
    Some("toml") => {
      toml::from_str::<F>(&content)
        .map(&records_of)
        .map_err(|e| map_err(format!("{}: {e}", path.display())))
    },
    Some("json") => {
      match serde_json::from_str::<JsonRecords<T, F>>(&content) {
        Ok(JsonRecords::List(records)) => Ok(records),
        Ok(JsonRecords::Table(file)) => Ok(records_of(file)),
        Err(e) => Err(map_err(format!("{}: {e}", path.display()))),
      }
    },
    _ => {
      Err(map_err(format!(
        "unsupported file format: {}",
        path.display()
      )))
    },
  }
}

/// Custom tokens read from a TOML or JSON file on every load.
#[derive(Debug, Clone)]
pub struct FileTokenSource {
  path: PathBuf,
}

impl FileTokenSource {
  #[must_use]
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  #[must_use]
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl TokenSource for FileTokenSource {
  fn load_tokens(&self) -> MarkupResult<Vec<TextToken>> {
    let tokens = read_records(
      &self.path,
      |file: TokenFile| file.token,
      MarkupError::TokenSource,
    )?;
    log::debug!(
      "Loaded {} token definition(s) from {}",
      tokens.len(),
      self.path.display()
    );
    Ok(tokens)
  }
}

/// Whitelist rules read from a TOML or JSON file on every load.
#[derive(Debug, Clone)]
pub struct FileWhitelistSource {
  path: PathBuf,
}

impl FileWhitelistSource {
  #[must_use]
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  #[must_use]
  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl WhitelistSource for FileWhitelistSource {
  fn load_rules(&self) -> MarkupResult<Vec<HtmlElementRule>> {
    let rules = read_records(
      &self.path,
      |file: WhitelistFile| file.element,
      MarkupError::WhitelistSource,
    )?;
    log::debug!(
      "Loaded {} whitelist rule(s) from {}",
      rules.len(),
      self.path.display()
    );
    Ok(rules)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use tempfile::TempDir;

  use super::*;

  fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
  }

  #[test]
  fn test_tokens_from_toml() {
    let dir = TempDir::new().unwrap();
    let path = write(
      &dir,
      "tokens.toml",
      r#"
        [[token]]
        name = "first"
        search_regex = "a"
        html_replacement = "b"

        [[token]]
        name = "second"
        search_regex = "b"
        html_replacement = "c"
      "#,
    );

    let tokens = FileTokenSource::new(path).load_tokens().unwrap();
    let names: Vec<_> = tokens.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["first", "second"]);
  }

  #[test]
  fn test_tokens_from_json_list_and_table() {
    let dir = TempDir::new().unwrap();
    let list = write(
      &dir,
      "list.json",
      r#"[{"name": "t", "searchRegex": "x", "htmlReplacement": "y"}]"#,
    );
    let table = write(
      &dir,
      "table.json",
      r#"{"token": [{"name": "t", "search_regex": "x", "html_replacement": "y"}]}"#,
    );

    for path in [list, table] {
      let tokens = FileTokenSource::new(path).load_tokens().unwrap();
      assert_eq!(tokens.len(), 1);
      assert_eq!(tokens[0].search_regex, "x");
      assert_eq!(tokens[0].html_replacement, "y");
    }
  }

  #[test]
  fn test_missing_token_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = FileTokenSource::new(dir.path().join("absent.toml"))
      .load_tokens()
      .unwrap_err();
    assert!(matches!(err, MarkupError::TokenSource(_)));
  }

  #[test]
  fn test_whitelist_from_toml() {
    let dir = TempDir::new().unwrap();
    let path = write(
      &dir,
      "whitelist.toml",
      r#"
        [[element]]
        tag = "p"

        [[element]]
        tag = "a"
        attributes = ["href"]
      "#,
    );

    let rules = FileWhitelistSource::new(path).load_rules().unwrap();
    assert_eq!(rules.len(), 2);
    assert!(rules[0].attributes.is_empty());
    assert_eq!(rules[1].attributes, ["href"]);
  }

  #[test]
  fn test_malformed_whitelist_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "whitelist.json", "{ not json");
    let err = FileWhitelistSource::new(path).load_rules().unwrap_err();
    assert!(matches!(err, MarkupError::WhitelistSource(_)));
  }

  #[test]
  fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "tokens.yaml", "token: []");
    assert!(FileTokenSource::new(path).load_tokens().is_err());
  }
}
