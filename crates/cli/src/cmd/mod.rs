mod archive;
mod render;

pub use archive::{ArchiveArgs, cmd_archive};
pub use render::cmd_render;

use anyhow::{Context, Result};
use objar_lib::PropertyMap;
use tracing::debug;

use crate::PropertyArgs;

/// Load the properties file (if any) and apply `--set` overrides on top.
pub fn load_properties(args: &PropertyArgs) -> Result<PropertyMap> {
  let mut props = match &args.properties {
    Some(path) => {
      PropertyMap::load(path).with_context(|| format!("Failed to load properties: {}", path.display()))?
    }
    None => PropertyMap::new(),
  };

  let mut overrides = PropertyMap::new();
  for pair in &args.overrides {
    overrides.set_from_pair(pair).context("Invalid --set value")?;
  }
  props.merge(&overrides);

  debug!(count = props.len(), overrides = args.overrides.len(), "build properties ready");
  Ok(props)
}
