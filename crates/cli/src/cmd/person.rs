//! Implementation of the `luamap person` command.

use std::path::Path;

use anyhow::{Context, Result};
use luamap_lib::{Mapper, Options};
use mlua::Lua;
use serde::Deserialize;

use super::load_global;

#[derive(Debug, Default, Deserialize)]
struct Person {
  name: String,
  age: i64,
}

/// Execute the person command, printing `<name> <age>`.
pub fn cmd_person(file: &Path, global: &str, options: Options) -> Result<()> {
  let lua = Lua::new();
  let value = load_global(&lua, file, global)?;

  let mut person = Person::default();
  Mapper::new(options)
    .map(&value, &mut person)
    .with_context(|| format!("Failed to decode '{}' as a person", global))?;

  println!("{} {}", person.name, person.age);
  Ok(())
}
