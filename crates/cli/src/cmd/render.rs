//! Implementation of the `objar render` command.

use anyhow::{Context, Result};

use objar_lib::recipe;

use super::load_properties;
use crate::PropertyArgs;
use crate::output::{OutputFormat, print_json};

pub fn cmd_render(recipe_name: &str, props: &PropertyArgs, output: OutputFormat) -> Result<()> {
  let properties = load_properties(props)?;

  let command =
    recipe::render(&properties, recipe_name).with_context(|| format!("Failed to render recipe: {}", recipe_name))?;

  if output.is_json() {
    print_json(&command)
  } else {
    println!("{}", command);
    Ok(())
  }
}
