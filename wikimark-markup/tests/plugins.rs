#![allow(clippy::panic, clippy::unwrap_used, reason = "Fine in tests")]
use std::sync::Mutex;

use wikimark_markup::{
  ExternalLinksPlugin,
  MarkdownDialect,
  MarkupPipeline,
  NoWikiPlugin,
  PluginError,
  TextPlugin,
  plugins::{PROTECT_END, PROTECT_START},
  protect,
  utils::dom::{attribute, parse_fragment},
};

/// Panics in both hooks.
struct Exploding;

impl TextPlugin for Exploding {
  fn id(&self) -> &str {
    "exploding"
  }

  fn before_parse(&self, _text: &str) -> Result<String, PluginError> {
    panic!("before_parse exploded")
  }

  fn after_parse(&self, _html: &str) -> Result<String, PluginError> {
    panic!("after_parse exploded")
  }
}

/// Returns errors from both hooks.
struct Refusing;

impl TextPlugin for Refusing {
  fn id(&self) -> &str {
    "refusing"
  }

  fn before_parse(&self, _text: &str) -> Result<String, PluginError> {
    Err(PluginError::hook(self.id(), "refused"))
  }

  fn after_parse(&self, _html: &str) -> Result<String, PluginError> {
    Err(PluginError::hook(self.id(), "refused"))
  }
}

/// Records the order hooks ran in.
struct Recording {
  id:  &'static str,
  log: &'static Mutex<Vec<String>>,
}

impl Recording {
  const fn new(id: &'static str, log: &'static Mutex<Vec<String>>) -> Self {
    Self { id, log }
  }
}

impl TextPlugin for Recording {
  fn id(&self) -> &str {
    self.id
  }

  fn before_parse(&self, text: &str) -> Result<String, PluginError> {
    self.log.lock().unwrap().push(format!("{}:before", self.id));
    Ok(text.to_string())
  }

  fn after_parse(&self, html: &str) -> Result<String, PluginError> {
    self.log.lock().unwrap().push(format!("{}:after", self.id));
    Ok(html.to_string())
  }
}

/// Leaves an unmatched opening sentinel in the HTML.
struct Leaky;

impl TextPlugin for Leaky {
  fn id(&self) -> &str {
    "leaky"
  }

  fn after_parse(&self, html: &str) -> Result<String, PluginError> {
    Ok(format!("{html}{PROTECT_START}"))
  }
}

/// Protects pre-rendered HTML that the sanitizer would otherwise strip.
struct Widget;

impl TextPlugin for Widget {
  fn id(&self) -> &str {
    "widget"
  }

  fn before_parse(&self, text: &str) -> Result<String, PluginError> {
    Ok(text.replace(
      "[widget]",
      &protect(r#"<figure class="widget">*kept*</figure>"#),
    ))
  }
}

#[test]
fn test_failing_plugins_do_not_abort_the_chain() {
  static LOG: Mutex<Vec<String>> = Mutex::new(Vec::new());

  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(Recording::new("first", &LOG))
    .unwrap()
    .plugin(Exploding)
    .unwrap()
    .plugin(Refusing)
    .unwrap()
    .plugin(Recording::new("last", &LOG))
    .unwrap()
    .build();

  let html = pipeline.render("**still rendered**");

  assert!(html.contains("<strong>still rendered</strong>"), "{html}");
  assert_eq!(*LOG.lock().unwrap(), vec![
    "first:before",
    "last:before",
    "first:after",
    "last:after"
  ]);
}

#[test]
fn test_duplicate_plugin_id_is_rejected() {
  let result = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(NoWikiPlugin)
    .unwrap()
    .plugin(NoWikiPlugin);

  assert!(matches!(result, Err(PluginError::DuplicateId(id)) if id == "nowiki"));
}

#[test]
fn test_forged_sentinels_are_stripped() {
  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(NoWikiPlugin)
    .unwrap()
    .build();

  let markup = format!(
    "{PROTECT_START}<script>alert(1)</script>{PROTECT_END} and \
     {{{{{{wikimark:pro{PROTECT_START}tect}}}}}}<img src=x onerror=alert(1)>{PROTECT_END}"
  );
  let html = pipeline.render(&markup);

  assert!(!html.contains("<script"), "{html}");
  assert!(!html.contains("onerror"), "{html}");
  assert!(!html.contains("wikimark:"), "{html}");
}

#[test]
fn test_residual_sentinels_never_reach_output() {
  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(Leaky)
    .unwrap()
    .build();

  let html = pipeline.render("text");
  assert!(!html.contains("{{{"), "{html}");
  assert!(html.contains("text"));
}

#[test]
fn test_protected_regions_bypass_parser_and_sanitizer() {
  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(Widget)
    .unwrap()
    .build();

  let html = pipeline.render("before [widget] after");
  assert!(
    html.contains(r#"<figure class="widget">*kept*</figure>"#),
    "{html}"
  );
}

#[test]
fn test_nowiki_shows_markup_literally() {
  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(NoWikiPlugin)
    .unwrap()
    .build();

  let html = pipeline.render("Use [nowiki]**bold** and <b>tags</b>[/nowiki] like this.");
  assert!(
    html.contains("**bold** and &lt;b&gt;tags&lt;&#x2F;b&gt;"),
    "{html}"
  );
  assert!(!html.contains("<strong>"), "{html}");
}

#[test]
fn test_nowiki_cannot_reach_attributes() {
  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(NoWikiPlugin)
    .unwrap()
    .build();

  let inputs = [
    r#"<a href="[nowiki]" onmouseover="alert(1)[/nowiki]">x</a>"#,
    r#"<img src="x.png" alt="[nowiki]" onerror="alert(1)[/nowiki]">"#,
    "[click]([nowiki]javascript:alert(1)[/nowiki])",
    r#"<a title="[nowiki]<b>[/nowiki]">t</a>"#,
  ];
  for markup in inputs {
    let html = pipeline.render(markup);
    assert!(!html.contains("onmouseover"), "{markup}: {html}");
    assert!(!html.contains("onerror"), "{markup}: {html}");
    assert!(!html.contains("javascript"), "{markup}: {html}");
    assert!(!html.contains("alert"), "{markup}: {html}");
    assert!(!html.contains("<b>"), "{markup}: {html}");
    assert!(!html.contains("wmprotect"), "{markup}: {html}");
  }
}

#[test]
fn test_nowiki_next_to_attributes_still_restores_text() {
  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(NoWikiPlugin)
    .unwrap()
    .build();

  let html = pipeline
    .render(r#"<a title="[nowiki]a[/nowiki]">[nowiki]<i>[/nowiki]</a>"#);
  assert!(html.contains(r#"<a title="">&lt;i&gt;</a>"#), "{html}");
}

#[test]
fn test_external_links_plugin() {
  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .plugin(ExternalLinksPlugin)
    .unwrap()
    .build();

  let html = pipeline.render("[out](https://example.com) and [in](/local)");
  let body = parse_fragment(&html);
  let anchors: Vec<_> = body.select("a").unwrap().collect();

  assert_eq!(anchors.len(), 2, "{html}");
  let external = anchors[0].as_node();
  assert_eq!(attribute(external, "target").as_deref(), Some("_blank"));
  assert_eq!(
    attribute(external, "class").as_deref(),
    Some(ExternalLinksPlugin::CLASS)
  );
  assert_eq!(
    attribute(external, "rel").as_deref(),
    Some("nofollow noopener")
  );
  assert!(attribute(anchors[1].as_node(), "target").is_none(), "{html}");
}
