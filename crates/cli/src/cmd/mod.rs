mod bundle;
mod inspect;
mod person;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use mlua::prelude::{Lua, LuaValue};
use tracing::debug;

pub use bundle::cmd_bundle;
pub use inspect::cmd_inspect;
pub use person::cmd_person;

/// Run the script at `file` and return the value of `global`.
///
/// An undefined (nil) global is an error.
fn load_global(lua: &Lua, file: &Path, global: &str) -> Result<LuaValue> {
  let source = fs::read_to_string(file).with_context(|| format!("Failed to read script: {}", file.display()))?;

  lua
    .load(source.as_str())
    .set_name(format!("@{}", file.display()))
    .exec()
    .with_context(|| format!("Failed to evaluate script: {}", file.display()))?;

  let value: LuaValue = lua
    .globals()
    .get(global)
    .with_context(|| format!("Failed to read global '{}'", global))?;
  if value.is_nil() {
    bail!("global '{}' is not defined in {}", global, file.display());
  }

  debug!(global, kind = value.type_name(), "loaded global");
  Ok(value)
}
