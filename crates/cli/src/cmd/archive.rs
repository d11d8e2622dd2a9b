//! Implementation of the `objar archive` command.
//!
//! Builds (or reuses) a static archive from the given object files by running
//! the archive recipe once per object.

use std::path::PathBuf;

use anyhow::{Context, Result};

use objar_lib::{ArchiveStatus, Archiver, ArchiverConfig, ProcessRunner};

use super::load_properties;
use crate::PropertyArgs;
use crate::output::{OutputFormat, print_info, print_json, print_stat, print_success};

pub struct ArchiveArgs {
  pub build_path: PathBuf,
  pub archive: PathBuf,
  pub recipe: String,
  pub only_compilation_database: bool,
  pub props: PropertyArgs,
  pub output: OutputFormat,
  pub objects: Vec<PathBuf>,
}

pub fn cmd_archive(args: ArchiveArgs) -> Result<()> {
  let properties = load_properties(&args.props)?;

  let config = ArchiverConfig::default()
    .with_recipe(args.recipe)
    .only_update_compilation_database(args.only_compilation_database);
  let archiver = Archiver::with_config(properties, ProcessRunner::new(), config);

  let result = archiver
    .build(&args.build_path, &args.archive, &args.objects)
    .with_context(|| format!("Failed to build archive: {}", args.archive.display()))?;

  if args.output.is_json() {
    return print_json(&result);
  }

  match result.status {
    ArchiveStatus::Skipped => print_info("Skipped archive creation"),
    ArchiveStatus::Cached => print_info("Archive up to date"),
    ArchiveStatus::Rebuilt { objects } => print_success(&format!("Archived {} object file(s)", objects)),
  }
  print_stat("Path", &result.path.display().to_string());

  Ok(())
}
