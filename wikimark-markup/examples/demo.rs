use std::sync::Arc;

use wikimark_markup::{
  ExternalLinksPlugin,
  MarkdownDialect,
  MarkupPipeline,
  NoWikiPlugin,
  PageLookupResult,
  StaticPageCatalog,
  TextToken,
};

const DEMO_CONTENT: &str = r#"{TOC}

# Release Process

See [[Home|the home page]] and [[Missing Page|a page nobody wrote]].

{warn} Attach the changelog: [changelog](attachment:CHANGELOG.txt)

![logo](logo.png)

## Raw HTML

<p onclick="steal()">Clicks are not handled.</p>
<script>alert("never rendered")</script>

## Literal markup

[nowiki]**not bold** and <b>not a tag</b>[/nowiki]

Read more on [the project site](https://example.com).
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  println!("Testing wikimark render pipeline");
  println!("================================\n");

  let catalog = StaticPageCatalog::new(vec![PageLookupResult {
    id:    1,
    title: "Home".to_string(),
  }]);
  let tokens = vec![TextToken::new(
    "warning",
    r"\{warn\}",
    r#"<span class="warning">Warning:</span>"#,
  )];

  let pipeline = MarkupPipeline::builder(MarkdownDialect::default())
    .catalog(Arc::new(catalog))
    .attachments_url("/files")
    .token_source(Arc::new(tokens))
    .plugin(NoWikiPlugin)?
    .plugin(ExternalLinksPlugin)?
    .build();

  let result = pipeline.render_result(DEMO_CONTENT);

  println!("Results:");
  println!("  - Title: {:?}", result.title);
  println!("  - Top-level headings: {}", result.headings.len());
  println!("  - HTML output length: {} characters", result.html.len());

  if !result.headings.is_empty() {
    println!("\nHeadings extracted:");
    let mut stack: Vec<_> = result.headings.iter().rev().collect();
    while let Some(entry) = stack.pop() {
      println!(
        "  {}{} (level {}) -> #{}",
        "  ".repeat(usize::from(entry.level.saturating_sub(1))),
        entry.text,
        entry.level,
        entry.id
      );
      stack.extend(entry.children.iter().rev());
    }
  }

  println!("\nRendered HTML:\n{}", result.html);

  let renamed = pipeline.replace_page_links(DEMO_CONTENT, "home", "Start");
  println!(
    "\nAfter renaming 'Home' to 'Start', links to Start: {}",
    pipeline.contains_page_link(&renamed, "Start")
  );

  Ok(())
}
