//! Conversion from Lua values to [`GenericValue`] trees.

use std::collections::BTreeMap;

use mlua::prelude::*;
use tracing::{debug, trace};

use super::types::{GenericValue, Kind};
use crate::error::{DecodeError, ErrorKind, FieldPath, Result};
use crate::mapper::{Options, ZeroValues};

/// Report the kind of a Lua value.
pub fn classify(value: &LuaValue) -> Kind {
  match value {
    LuaValue::Nil => Kind::Nil,
    LuaValue::Boolean(_) => Kind::Boolean,
    LuaValue::Integer(_) => Kind::Integer,
    LuaValue::Number(_) => Kind::Float,
    LuaValue::String(_) => Kind::String,
    LuaValue::Table(_) => Kind::Table,
    other => Kind::Other(other.type_name()),
  }
}

/// Deepest table nesting a value may have.
pub const MAX_DEPTH: usize = 256;

/// Builds [`GenericValue`] trees using a mapper's [`Options`].
pub(crate) struct Normalizer<'a> {
  options: &'a Options,
  /// Addresses of the tables currently being walked, outermost first.
  active: Vec<usize>,
}

impl<'a> Normalizer<'a> {
  pub(crate) fn new(options: &'a Options) -> Self {
    Self {
      options,
      active: Vec::new(),
    }
  }

  pub(crate) fn normalize(&mut self, value: &LuaValue) -> Result<GenericValue> {
    self.normalize_at(value, &FieldPath::root())
  }

  fn normalize_at(&mut self, value: &LuaValue, path: &FieldPath) -> Result<GenericValue> {
    match value {
      LuaValue::Nil => Ok(GenericValue::Nil),
      LuaValue::Boolean(b) => Ok(GenericValue::Bool(*b)),
      LuaValue::Integer(i) => Ok(GenericValue::Int(*i)),
      LuaValue::Number(n) => Ok(GenericValue::Float(*n)),
      LuaValue::String(s) => Ok(GenericValue::String(s.to_string_lossy())),
      LuaValue::Table(table) => {
        let address = table.to_pointer() as usize;
        if self.active.contains(&address) {
          return Err(DecodeError::new(ErrorKind::CyclicTable).at(path));
        }
        if self.active.len() >= MAX_DEPTH {
          return Err(DecodeError::new(ErrorKind::TooDeep { limit: MAX_DEPTH }).at(path));
        }

        self.active.push(address);
        let normalized = self.normalize_table(table, path);
        self.active.pop();
        normalized
      }
      other => {
        let kind = other.type_name();
        if self.options.error_on_unsupported_values {
          return Err(DecodeError::new(ErrorKind::UnsupportedFieldType { kind }).at(path));
        }
        trace!(%path, kind, "unsupported lua value treated as nil");
        Ok(GenericValue::Nil)
      }
    }
  }

  fn normalize_table(&mut self, table: &LuaTable, path: &FieldPath) -> Result<GenericValue> {
    let len = table.raw_len();
    if len > 0 {
      let mut items = Vec::with_capacity(len);
      for i in 1..=len {
        let item: LuaValue = table.raw_get(i)?;
        items.push(self.normalize_at(&item, &path.index(i))?);
      }
      return Ok(GenericValue::Sequence(items));
    }

    let mut entries = BTreeMap::new();
    for pair in table.clone().pairs::<LuaValue, LuaValue>() {
      let (key, value) = pair?;
      let Some(raw_key) = key_name(&key) else {
        trace!(%path, kind = %classify(&key), "skipping table entry with unsupported key");
        continue;
      };

      let value = self.normalize_at(&value, &path.key(raw_key.as_str()))?;
      if matches!(value, GenericValue::Nil) {
        continue;
      }
      if self.options.zero_values == ZeroValues::Suppress && value.is_zero() {
        trace!(%path, key = %raw_key, "dropping zero value");
        continue;
      }

      let name = self.options.name_translator.translate(&raw_key);
      if entries.insert(name.clone(), value).is_some() {
        debug!(%path, key = %name, "duplicate key after translation, keeping the last one");
      }
    }
    Ok(GenericValue::Mapping(entries))
  }
}

/// String form of a table key, or `None` for keys that cannot name a field.
fn key_name(key: &LuaValue) -> Option<String> {
  match key {
    LuaValue::String(s) => Some(s.to_string_lossy()),
    LuaValue::Integer(i) => Some(i.to_string()),
    LuaValue::Number(n) => Some(n.to_string()),
    LuaValue::Boolean(b) => Some(b.to_string()),
    _ => None,
  }
}
