//! Incremental static-archive creation.
//!
//! [`Archiver::build`] decides whether an archive in the build directory is
//! still valid for a set of object files and, if not, regenerates it by
//! running the archiving recipe once per object file.
//!
//! # Staleness
//!
//! An archive is reused only if it exists and no object file is newer than
//! it. An object file that cannot be stat'ed counts as newer: the check is
//! biased towards rebuilding. A stale archive is deleted before the first
//! object is appended, because archiving tools update an existing archive
//! in place.
//!
//! # Partial Rebuilds
//!
//! If the tool fails for one object file the call returns an error and the
//! remaining objects are not processed. Objects appended before the failure
//! stay in the archive on disk. The next call sees an archive newer than its
//! inputs, so callers must not treat a failed call's archive as valid.

use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::exec::{CommandRunner, ExecError};
use crate::properties::PropertyMap;
use crate::recipe::{self, RecipeError};

/// Recipe used to append one object file to an archive.
pub const DEFAULT_ARCHIVE_RECIPE: &str = "recipe.ar.pattern";

/// Property bound to the archive's file name.
pub const ARCHIVE_FILE_KEY: &str = "archive_file";

/// Property bound to the archive's full path.
pub const ARCHIVE_FILE_PATH_KEY: &str = "archive_file_path";

/// Property bound to the object file being appended.
pub const OBJECT_FILE_KEY: &str = "object_file";

/// Errors that can occur while building an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
  /// A stale archive could not be removed.
  #[error("failed to remove stale archive {path}: {source}")]
  Invalidate {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The archiving recipe could not be rendered.
  #[error("failed to prepare archive command for {object}: {source}")]
  Recipe {
    object: PathBuf,
    #[source]
    source: RecipeError,
  },

  /// The archiving tool failed.
  #[error("failed to archive {object}: {source}")]
  Tool {
    object: PathBuf,
    #[source]
    source: ExecError,
  },
}

/// Result of comparing an archive against its object files.
#[derive(Debug)]
pub enum Staleness {
  /// The archive does not exist.
  Missing,

  /// The archive exists and no object file is newer.
  Fresh,

  /// An object file is newer than the archive.
  Stale { object: PathBuf },

  /// An object file could not be stat'ed.
  Unknown { object: PathBuf, error: io::Error },
}

impl Staleness {
  /// Whether the archive must be regenerated.
  ///
  /// `Unknown` counts as stale.
  pub fn needs_rebuild(&self) -> bool {
    !matches!(self, Staleness::Fresh)
  }
}

/// Which path a build call took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArchiveStatus {
  /// Metadata-only mode; nothing was inspected or run.
  Skipped,

  /// The existing archive is up to date.
  Cached,

  /// The archive was regenerated from `objects` object files.
  Rebuilt { objects: usize },
}

/// Successful result of [`Archiver::build`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveOutput {
  pub path: PathBuf,
  #[serde(flatten)]
  pub status: ArchiveStatus,
}

/// Archiver settings.
#[derive(Debug, Clone)]
pub struct ArchiverConfig {
  /// Name of the property holding the archive command template.
  pub recipe: String,

  /// Only compute output paths (e.g. when just a compilation database is
  /// being produced). No files are touched and no tools run.
  pub only_update_compilation_database: bool,
}

impl Default for ArchiverConfig {
  fn default() -> Self {
    Self {
      recipe: DEFAULT_ARCHIVE_RECIPE.to_string(),
      only_update_compilation_database: false,
    }
  }
}

impl ArchiverConfig {
  pub fn with_recipe(mut self, recipe: impl Into<String>) -> Self {
    self.recipe = recipe.into();
    self
  }

  pub fn only_update_compilation_database(mut self, enabled: bool) -> Self {
    self.only_update_compilation_database = enabled;
    self
  }
}

/// Builds static archives from object files.
///
/// Holds the base build properties; each tool invocation renders against its
/// own clone of them, so a single `Archiver` can serve calls for different
/// archives concurrently. Calls for the same archive path must be serialized
/// by the caller.
pub struct Archiver<R> {
  properties: PropertyMap,
  runner: R,
  config: ArchiverConfig,
}

impl<R: CommandRunner> Archiver<R> {
  pub fn new(properties: PropertyMap, runner: R) -> Self {
    Self::with_config(properties, runner, ArchiverConfig::default())
  }

  pub fn with_config(properties: PropertyMap, runner: R, config: ArchiverConfig) -> Self {
    Self {
      properties,
      runner,
      config,
    }
  }

  pub fn config(&self) -> &ArchiverConfig {
    &self.config
  }

  pub fn properties(&self) -> &PropertyMap {
    &self.properties
  }

  /// Produce `build_root/archive_file` from `objects`, reusing it if valid.
  ///
  /// # Errors
  ///
  /// Returns an error if a stale archive cannot be removed, if the recipe
  /// cannot be rendered, or if the tool fails for any object file. Processing
  /// stops at the first failure.
  pub fn build(
    &self,
    build_root: impl AsRef<Path>,
    archive_file: impl AsRef<Path>,
    objects: &[PathBuf],
  ) -> Result<ArchiveOutput, ArchiveError> {
    let archive_path = build_root.as_ref().join(archive_file);

    if self.config.only_update_compilation_database {
      info!(path = ?archive_path, "skipping archive creation");
      return Ok(ArchiveOutput {
        path: archive_path,
        status: ArchiveStatus::Skipped,
      });
    }

    match check_staleness(&archive_path, objects) {
      Staleness::Fresh => {
        info!(path = ?archive_path, "using previously compiled file");
        return Ok(ArchiveOutput {
          path: archive_path,
          status: ArchiveStatus::Cached,
        });
      }
      Staleness::Missing => {
        debug!(path = ?archive_path, "archive missing, building");
      }
      Staleness::Stale { object } => {
        debug!(path = ?archive_path, object = ?object, "object newer than archive, rebuilding");
        invalidate(&archive_path)?;
      }
      Staleness::Unknown { object, error } => {
        debug!(path = ?archive_path, object = ?object, error = %error, "cannot stat object, rebuilding");
        invalidate(&archive_path)?;
      }
    }

    for object in objects {
      self.append(&archive_path, object)?;
    }

    Ok(ArchiveOutput {
      path: archive_path,
      status: ArchiveStatus::Rebuilt { objects: objects.len() },
    })
  }

  /// Run the archive recipe for a single object file.
  fn append(&self, archive_path: &Path, object: &Path) -> Result<(), ArchiveError> {
    let mut properties = self.properties.clone();
    if let Some(name) = archive_path.file_name() {
      properties.set(ARCHIVE_FILE_KEY, name.to_string_lossy());
    }
    properties.set_path(ARCHIVE_FILE_PATH_KEY, archive_path);
    properties.set_path(OBJECT_FILE_KEY, object);

    let command = recipe::render(&properties, &self.config.recipe).map_err(|source| ArchiveError::Recipe {
      object: object.to_path_buf(),
      source,
    })?;

    debug!(object = ?object, "appending to archive");

    self.runner.run(&command).map_err(|source| ArchiveError::Tool {
      object: object.to_path_buf(),
      source,
    })
  }
}

/// Compare the archive's modification time against each object file.
///
/// Scanning stops at the first object that is newer or cannot be stat'ed.
/// An empty object list leaves an existing archive `Fresh`.
pub fn check_staleness(archive_path: &Path, objects: &[PathBuf]) -> Staleness {
  let Ok(archive_mtime) = modified(archive_path) else {
    return Staleness::Missing;
  };

  for object in objects {
    match modified(object) {
      Ok(mtime) if mtime > archive_mtime => {
        return Staleness::Stale { object: object.clone() };
      }
      Ok(_) => {}
      Err(error) => {
        return Staleness::Unknown {
          object: object.clone(),
          error,
        };
      }
    }
  }

  Staleness::Fresh
}

fn modified(path: &Path) -> io::Result<SystemTime> {
  std::fs::metadata(path)?.modified()
}

fn invalidate(archive_path: &Path) -> Result<(), ArchiveError> {
  std::fs::remove_file(archive_path).map_err(|source| ArchiveError::Invalidate {
    path: archive_path.to_path_buf(),
    source,
  })
}
