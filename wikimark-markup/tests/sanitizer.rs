#![allow(clippy::expect_used, clippy::unwrap_used, reason = "Fine in tests")]
use std::sync::Arc;

use wikimark_markup::{
  HtmlElementRule,
  HtmlSanitizer,
  Whitelist,
  utils::dom::{attribute, parse_fragment},
};

/// Decoded values of `name` on every element matching `selector`.
fn attribute_values(html: &str, selector: &str, name: &str) -> Vec<String> {
  let body = parse_fragment(html);
  body
    .select(selector)
    .map(|nodes| {
      nodes
        .filter_map(|node| attribute(node.as_node(), name))
        .collect()
    })
    .unwrap_or_default()
}

fn sanitize(html: &str) -> String {
  HtmlSanitizer::default().sanitize(html)
}

#[test]
fn test_disallowed_tags_never_appear() {
  let disallowed = [
    "script", "style", "iframe", "object", "embed", "form", "input",
    "textarea", "button", "select", "svg", "math", "link", "meta", "base",
    "frameset", "applet", "marquee", "template",
  ];

  for tag in disallowed {
    let inputs = [
      format!("<{tag}>payload</{tag}>"),
      format!("<p>before<{tag} src=x onload=alert(1)>inside</{tag}>after</p>"),
      format!("<div><span><{TAG}>nested</{TAG}></span></div>", TAG = tag.to_uppercase()),
      format!("<{tag}"),
    ];
    for input in &inputs {
      let output = sanitize(input).to_lowercase();
      assert!(
        !output.contains(&format!("<{tag}")),
        "<{tag} survived sanitizing {input:?}: {output}"
      );
    }
  }
}

#[test]
fn test_disallowed_content_is_removed_with_the_element() {
  let output = sanitize("<p>keep</p><form><p>drop <b>me</b></p></form>");
  assert_eq!(output, "<p>keep</p>");
}

#[test]
fn test_disallowed_attributes_never_appear() {
  let output = sanitize(
    r#"<img src="a.png" onerror="alert(1)" onload="x" data-x="1" STYLE="y">
       <a href="/x" onclick="alert(1)" formaction="z">x</a>"#,
  );

  let body = parse_fragment(&output);
  for node in body.descendants() {
    if let Some(element) = node.as_element() {
      let tag = element.name.local.to_string();
      for (name, _) in &element.attributes.borrow().map {
        assert!(
          Whitelist::default().allows_attribute(&tag, &name.local),
          "attribute {} survived on <{tag}>: {output}",
          name.local
        );
      }
    }
  }
  assert_eq!(attribute_values(&output, "img", "src"), vec!["a.png"]);
}

#[test]
fn test_obfuscated_javascript_is_neutralized() {
  let inputs = [
    "<a href=\"jav\tas\ncript:alert(1)\">x</a>",
    "<a href=\"JaVaScRiPt:alert(1)\">x</a>",
    "<a href=\"&#106;&#97;vascript:alert(1)\">x</a>",
    "<a href=\"javajavascriptscript:alert(1)\">x</a>",
    "<a href=\"java&#x09;script:alert(1)\">x</a>",
    "<img src=\"  javascript:alert(1)\">",
  ];

  for input in inputs {
    let output = sanitize(input);
    let values = [
      attribute_values(&output, "a", "href"),
      attribute_values(&output, "img", "src"),
    ]
    .concat();

    assert!(!values.is_empty(), "{input}");
    for value in values {
      let squashed: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
      assert!(!squashed.contains("javascript"), "{input} -> {value}");
    }
  }
}

#[test]
fn test_style_and_mocha_vectors() {
  let output = sanitize(
    r#"<p style="width: expr ession(alert(1)); -moz-binding: behavior">x</p><img src="mocha:x">"#,
  );
  let style = attribute_values(&output, "p", "style").concat();
  assert!(!style.contains("expression"), "{style}");
  assert!(!style.contains("behavior"), "{style}");
  assert_eq!(attribute_values(&output, "img", "src"), vec![":x"]);
}

#[test]
fn test_attribute_values_are_fully_encoded() {
  let output = sanitize(r#"<a href="/wiki/5/home?x=1&y=&quot;2&quot;" title="a'b">x</a>"#);
  assert_eq!(
    output,
    "<a href=\"&#x2F;wiki&#x2F;5&#x2F;home&#x3F;x&#x3D;1&#x26;y&#x3D;&#x22;2&#x22;\" \
     title=\"a&#x27;b\">x</a>"
  );
}

#[test]
fn test_sanitize_is_idempotent() {
  let inputs = [
    "<p>plain</p>",
    "<b><p>misnested</b></p>",
    "<p><div>block in paragraph</div></p>",
    "<table>stray<tr><td>cell</td></tr></table>",
    "<a href=x><a href=y>nested anchors</a></a>",
    "<ul><li>one<li>two</ul>",
    "<pre>\nleading newline</pre>",
    "<p>&amp;&lt;&gt;&quot;&#39; entities</p>",
    "<p title=\"\u{0}null\u{1}\">controls</p>",
    "<img src=\"x\" alt=\"\u{2603} snow\">",
    "<!-- comment --><p>after comment</p>",
    "<p>unclosed <em>emphasis",
    "<script>alert(1)</script><p>after</p>",
    "<a href=\"jav\tascript:x\">x</a>",
    "<h1 id=\"x y\">Title</h1><h2>sub</h2>",
  ];

  for input in inputs {
    let once = sanitize(input);
    let twice = sanitize(&once);
    assert_eq!(once, twice, "not idempotent for {input:?}");
  }
}

#[test]
fn test_custom_whitelist_is_case_insensitive() {
  let sanitizer = HtmlSanitizer::new(Arc::new(Whitelist::new(vec![
    HtmlElementRule::new("P", &["CLASS"]),
  ])));
  assert_eq!(
    sanitizer.sanitize(r#"<p class="c" id="i">x</p><span>y</span>"#),
    r#"<p class="c">x</p>"#
  );
}

#[test]
fn test_malformed_input_never_panics() {
  let inputs = [
    "<",
    "</p>",
    "<<<>>>",
    "<p <b>",
    "<a href='unterminated>x",
    "&#xFFFFFFFF; &#0;",
    "\u{0}\u{FEFF}",
  ];
  for input in inputs {
    let _ = sanitize(input);
  }
}
