mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use output::{OutputFormat, print_error};

/// objar - incremental static archive builder
#[derive(Parser)]
#[command(name = "objar")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

/// Where build properties come from.
#[derive(Args)]
pub struct PropertyArgs {
  /// Properties file in key=value format
  #[arg(short, long)]
  pub properties: Option<PathBuf>,

  /// Override a property (repeatable)
  #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
  pub overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
  /// Create or update a static archive from object files
  Archive {
    /// Directory the archive is written to
    #[arg(short, long)]
    build_path: PathBuf,

    /// Archive file name, relative to the build path
    #[arg(short, long)]
    archive: PathBuf,

    /// Property holding the archive command template
    #[arg(long, default_value = objar_lib::archive::DEFAULT_ARCHIVE_RECIPE)]
    recipe: String,

    /// Only compute the archive path; do not create it
    #[arg(long)]
    only_compilation_database: bool,

    #[command(flatten)]
    props: PropertyArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Object files to archive, in order
    objects: Vec<PathBuf>,
  },

  /// Print the command a recipe renders to
  Render {
    /// Recipe property to render
    #[arg(short, long)]
    recipe: String,

    #[command(flatten)]
    props: PropertyArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    output: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  if let Err(err) = run(cli) {
    print_error(&format!("{err:#}"));
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Archive {
      build_path,
      archive,
      recipe,
      only_compilation_database,
      props,
      output,
      objects,
    } => cmd::cmd_archive(cmd::ArchiveArgs {
      build_path,
      archive,
      recipe,
      only_compilation_database,
      props,
      output,
      objects,
    }),
    Commands::Render { recipe, props, output } => cmd::cmd_render(&recipe, &props, output),
  }
}
