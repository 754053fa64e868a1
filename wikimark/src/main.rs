use color_eyre::eyre::Result;
use log::LevelFilter;
use wikimark::{
  cli::{Cli, Commands},
  commands,
};
use wikimark_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Commands::Init {
      output,
      format,
      force,
    } => commands::init(output, format, *force),

    Commands::Render {
      input,
      pages,
      output,
      json,
    } => {
      let config = Config::load(cli.config_file.as_deref())?;
      commands::render(
        &config,
        input.as_deref(),
        pages.as_deref(),
        output.as_deref(),
        *json,
      )
    },

    Commands::Rename {
      input,
      from,
      to,
      in_place,
    } => {
      let config = Config::load(cli.config_file.as_deref())?;
      commands::rename(&config, input, from, to, *in_place)
    },
  }
}
