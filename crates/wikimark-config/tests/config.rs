#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::field_reassign_with_default,
  reason = "Fine in tests"
)]
use std::{
  fs,
  path::{Path, PathBuf},
  sync::Arc,
};

use tempfile::TempDir;
use wikimark_config::{Config, ConfigError};
use wikimark_markup::{PageLookupResult, StaticPageCatalog};

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
  let path = dir.join(name);
  fs::write(&path, content).expect("Failed to write fixture");
  path
}

fn catalog() -> Arc<StaticPageCatalog> {
  Arc::new(StaticPageCatalog::new(vec![PageLookupResult {
    id:    3,
    title: "Home".to_string(),
  }]))
}

#[test]
fn test_load_toml_and_json() {
  let dir = TempDir::new().unwrap();
  let toml_path = write(
    dir.path(),
    "wikimark.toml",
    r#"
      attachments_url = "/files"
      tokens_path = "tokens.toml"

      [plugins]
      nowiki = false
    "#,
  );
  let json_path = write(
    dir.path(),
    "wikimark.json",
    r#"{"page_url_base": "/pages", "gfm": false}"#,
  );

  let from_toml = Config::from_file(&toml_path).unwrap();
  assert_eq!(from_toml.attachments_url, "/files");
  assert_eq!(from_toml.tokens_path, Some(dir.path().join("tokens.toml")));
  assert!(!from_toml.plugins.nowiki);

  let from_json = Config::from_file(&json_path).unwrap();
  assert_eq!(from_json.page_url_base, "/pages");
  assert!(!from_json.gfm);
  assert_eq!(from_json.attachments_url, "/attachments");
}

#[test]
fn test_invalid_files_are_errors() {
  let dir = TempDir::new().unwrap();
  let broken_toml = write(dir.path(), "broken.toml", "gfm = ");
  let broken_json = write(dir.path(), "broken.json", "{\"gfm\": ");
  let unknown = write(dir.path(), "wikimark.yaml", "gfm: true");
  let bare = write(dir.path(), "wikimark", "");

  assert!(matches!(
    Config::from_file(&broken_toml),
    Err(ConfigError::Toml(_))
  ));
  assert!(matches!(
    Config::from_file(&broken_json),
    Err(ConfigError::Serde(_))
  ));
  assert!(matches!(
    Config::from_file(dir.path().join("absent.json")),
    Err(ConfigError::Io(_))
  ));
  for path in [unknown, bare] {
    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Config(_)), "{}: {err}", path.display());
  }
}

#[test]
fn test_discovery_order() {
  let dir = TempDir::new().unwrap();
  assert_eq!(Config::find_config_file_in(dir.path()), None);

  write(dir.path(), ".wikimark.toml", "");
  let json = write(dir.path(), "wikimark.json", "{}");
  assert_eq!(Config::find_config_file_in(dir.path()), Some(json));

  let toml = write(dir.path(), "wikimark.toml", "");
  assert_eq!(Config::find_config_file_in(dir.path()), Some(toml));
}

#[test]
fn test_generate_default_config() {
  let dir = TempDir::new().unwrap();

  for format in ["toml", "json"] {
    let path = dir.path().join(format!("wikimark.{format}"));
    Config::generate_default_config(format, &path).unwrap();
    assert_eq!(Config::from_file(&path).unwrap(), Config::default());
  }

  let err = Config::generate_default_config("yaml", &dir.path().join("x.yaml"))
    .unwrap_err();
  assert!(err.to_string().contains("yaml"));
}

#[test]
fn test_pipeline_from_config_files() {
  let dir = TempDir::new().unwrap();
  write(
    dir.path(),
    "tokens.toml",
    r#"
      [[token]]
      name = "warning"
      search_regex = "\\{warn\\}"
      html_replacement = "<span class=\"warn\">!</span>"
    "#,
  );
  write(
    dir.path(),
    "whitelist.json",
    r#"[{"tag": "p"}, {"tag": "a", "attributes": ["href"]}]"#,
  );
  let config_path = write(
    dir.path(),
    "wikimark.toml",
    r#"
      attachments_url = "/files"
      tokens_path = "tokens.toml"
      whitelist_path = "whitelist.json"
    "#,
  );

  let config = Config::load(Some(config_path.as_path())).unwrap();
  let pipeline = config.build_pipeline(catalog()).unwrap();

  let html = pipeline.render("{warn} [[home|Home]] [doc](attachment:a.pdf) **b**");
  assert!(html.starts_with("<p>"), "{html}");
  // span and strong are not in the file whitelist
  assert!(!html.contains("<span"), "{html}");
  assert!(!html.contains("<strong"), "{html}");
  assert!(!html.contains("{warn}"), "{html}");
  assert!(
    html.contains("href=\"&#x2F;wiki&#x2F;3&#x2F;home\""),
    "{html}"
  );
  assert!(
    html.contains("href=\"&#x2F;files&#x2F;a&#x2E;pdf\""),
    "{html}"
  );
}

#[test]
fn test_missing_sources_degrade_to_defaults() {
  let dir = TempDir::new().unwrap();
  let config = Config {
    tokens_path: Some(dir.path().join("absent.toml")),
    whitelist_path: Some(dir.path().join("absent.json")),
    ..Default::default()
  };

  let pipeline = config.build_pipeline(catalog()).unwrap();
  let html = pipeline.render("{warn} **bold**");
  assert!(html.contains("{warn}"), "{html}");
  assert!(html.contains("<strong>bold</strong>"), "{html}");
}

#[test]
fn test_plugins_follow_config() {
  let config = Config::default();
  let pipeline = config.build_pipeline(catalog()).unwrap();
  assert_eq!(pipeline.plugins().ids().collect::<Vec<_>>(), ["nowiki"]);

  let mut config = Config::default();
  config.plugins.nowiki = false;
  config.plugins.external_links = true;
  let pipeline = config.build_pipeline(catalog()).unwrap();
  assert_eq!(pipeline.plugins().ids().collect::<Vec<_>>(), [
    "external-links"
  ]);

  let html = pipeline.render("[x](https://example.com) [nowiki]*a*[/nowiki]");
  assert!(html.contains("nofollow"), "{html}");
  assert!(html.contains("<em>a</em>"), "{html}");
}
