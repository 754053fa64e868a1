use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for wikimark
#[derive(Parser, Debug)]
#[command(
  author,
  version,
  about = "wikimark: wiki markup to sanitized HTML"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to the configuration file (TOML or JSON). Defaults to
  /// `wikimark.toml` or `wikimark.json` in the working directory.
  #[arg(short = 'c', long = "config-file", global = true)]
  pub config_file: Option<PathBuf>,
}

/// All supported subcommands for the wikimark CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Render a markup file to sanitized HTML.
  Render {
    /// Markup file to render. Reads standard input when omitted.
    input: Option<PathBuf>,

    /// JSON file of known pages (`[{"id": 1, "title": "Home"}]`) used to
    /// resolve internal links.
    #[arg(short, long)]
    pages: Option<PathBuf>,

    /// Write the HTML to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit the HTML together with the heading tree and title as JSON.
    #[arg(long)]
    json: bool,
  },

  /// Rewrite links to a renamed page.
  Rename {
    /// Markup file containing the links.
    input: PathBuf,

    /// Current page title.
    #[arg(long)]
    from: String,

    /// New page title.
    #[arg(long)]
    to: String,

    /// Update the file instead of printing the result.
    #[arg(short, long)]
    in_place: bool,
  },

  /// Initialize a new wikimark configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "wikimark.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
