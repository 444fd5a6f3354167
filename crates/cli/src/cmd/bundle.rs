//! Implementation of the `luamap bundle` command.
//!
//! Decodes a bundle definition (name, invocation image, mixins and the
//! install/uninstall actions) and prints it as YAML or JSON.

use std::path::Path;

use anyhow::{Context, Result};
use luamap_lib::{Mapper, Options};
use mlua::Lua;
use serde::{Deserialize, Serialize};

use super::load_global;
use crate::Format;

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ExecMixin {
  pub command: String,
  pub arguments: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Action {
  pub description: String,
  pub exec: ExecMixin,
}

#[derive(Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Bundle {
  pub name: String,
  pub version: String,
  pub description: String,
  pub invocation_image: String,
  pub mixins: Vec<String>,
  pub install: Vec<Action>,
  pub uninstall: Vec<Action>,
}

/// Execute the bundle command.
pub fn cmd_bundle(file: &Path, global: &str, format: Format, options: Options) -> Result<()> {
  let lua = Lua::new();
  let value = load_global(&lua, file, global)?;

  let mut bundle = Bundle::default();
  Mapper::new(options)
    .map(&value, &mut bundle)
    .with_context(|| format!("Failed to decode '{}' as a bundle", global))?;

  print!("{}", render(&bundle, format)?);
  Ok(())
}

fn render(bundle: &Bundle, format: Format) -> Result<String> {
  match format {
    Format::Yaml => serde_yaml::to_string(bundle).context("Failed to serialize bundle as YAML"),
    Format::Json => {
      let json = serde_json::to_string_pretty(bundle).context("Failed to serialize bundle as JSON")?;
      Ok(format!("{}\n", json))
    }
  }
}
