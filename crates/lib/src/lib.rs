//! objar-lib: incremental static-archive building
//!
//! This crate provides the pieces a toolchain driver needs to keep a static
//! archive in sync with its object files:
//! - `properties`: build properties loaded from `key=value` files
//! - `recipe`: `{key}` command templates rendered into tool invocations
//! - `exec`: running external tools
//! - `archive`: the timestamp-based rebuild decision and archiving loop

pub mod archive;
pub mod exec;
pub mod properties;
pub mod recipe;
mod util;

pub use archive::{ArchiveError, ArchiveOutput, ArchiveStatus, Archiver, ArchiverConfig, Staleness};
pub use exec::{CommandRunner, ExecError, ProcessRunner};
pub use properties::{PropertiesError, PropertyMap};
pub use recipe::{RecipeError, ToolCommand};
