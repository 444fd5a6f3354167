//! Implementation of the `luamap inspect` command.
//!
//! Prints the tree a global normalizes to, after key translation and zero
//! suppression, without decoding it into any record.

use std::path::Path;

use anyhow::{Context, Result};
use luamap_lib::{Mapper, Options};
use mlua::Lua;

use super::load_global;

/// Execute the inspect command.
pub fn cmd_inspect(file: &Path, global: &str, options: Options) -> Result<()> {
  let lua = Lua::new();
  let value = load_global(&lua, file, global)?;

  let tree = Mapper::new(options)
    .normalize(&value)
    .with_context(|| format!("Failed to normalize '{}'", global))?;
  let json = serde_json::to_string_pretty(&tree).context("Failed to serialize value")?;
  println!("{}", json);
  Ok(())
}
