//! Subcommand implementations.
use std::{
  fs,
  io::{self, Write},
  path::Path,
  sync::Arc,
};

use color_eyre::eyre::{Context, Result, bail};
use log::info;
use wikimark_config::Config;
use wikimark_markup::StaticPageCatalog;

/// Render `input` (or standard input) and write the HTML, or the full render
/// result as JSON, to `output` or standard output.
///
/// # Errors
///
/// Returns an error if a file cannot be read or written, or the page list is
/// malformed.
pub fn render(
  config: &Config,
  input: Option<&Path>,
  pages: Option<&Path>,
  output: Option<&Path>,
  json: bool,
) -> Result<()> {
  let catalog = match pages {
    Some(path) => {
      StaticPageCatalog::from_json_file(path).wrap_err_with(|| {
        format!("Failed to load page list: {}", path.display())
      })?
    },
    None => StaticPageCatalog::default(),
  };
  info!("Known pages: {}", catalog.pages().len());

  let markup = read_input(input)?;
  let pipeline = config
    .build_pipeline(Arc::new(catalog))
    .wrap_err("Failed to assemble render pipeline")?;

  let rendered = if json {
    let result = pipeline.render_result(&markup);
    serde_json::to_string_pretty(&result)
      .wrap_err("Failed to serialize render result")?
  } else {
    pipeline.render(&markup)
  };

  write_output(output, &rendered)
}

/// Rewrite links to the page `from` so they point at `to`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn rename(
  config: &Config,
  input: &Path,
  from: &str,
  to: &str,
  in_place: bool,
) -> Result<()> {
  let text = fs::read_to_string(input)
    .wrap_err_with(|| format!("Failed to read {}", input.display()))?;
  let pipeline = config
    .build_pipeline(Arc::new(StaticPageCatalog::default()))
    .wrap_err("Failed to assemble render pipeline")?;

  if !pipeline.contains_page_link(&text, from) {
    info!("No links to '{from}' in {}", input.display());
    if in_place {
      return Ok(());
    }
    return write_output(None, &text);
  }

  let updated = pipeline.replace_page_links(&text, from, to);
  if in_place {
    fs::write(input, &updated)
      .wrap_err_with(|| format!("Failed to write {}", input.display()))?;
    info!("Updated links to '{from}' in {}", input.display());
    Ok(())
  } else {
    write_output(None, &updated)
  }
}

/// Write a default configuration file.
///
/// # Errors
///
/// Returns an error if the file exists and `force` is not set, or it cannot be
/// written.
pub fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  // Check if file already exists and that we're not forcing overwrite
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!("Failed to generate configuration file: {}", output.display())
  })?;

  info!("Configuration file created successfully.");
  Ok(())
}

fn read_input(input: Option<&Path>) -> Result<String> {
  match input {
    Some(path) => {
      fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))
    },
    None => io::read_to_string(io::stdin()).wrap_err("Failed to read stdin"),
  }
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
  if let Some(path) = output {
    fs::write(path, content)
      .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    return Ok(());
  }

  let mut stdout = io::stdout().lock();
  stdout
    .write_all(content.as_bytes())
    .and_then(|()| stdout.flush())
    .wrap_err("Failed to write to stdout")
}
