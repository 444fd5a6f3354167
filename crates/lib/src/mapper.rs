//! The [`Mapper`] facade and its [`Options`].

use mlua::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::decode::{Decoder, FieldCache};
use crate::error::{FieldPath, Result};
use crate::names::NameTranslator;
use crate::value::{GenericValue, Normalizer, classify};

/// What happens to table entries holding the zero value of their kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroValues {
  /// Every entry is kept, so a present `0` differs from an absent key.
  #[default]
  Keep,
  /// Entries whose value is `false`, `""`, `0` or `0.0` are dropped before
  /// decoding. Tables are never dropped, and neither are array elements.
  Suppress,
}

/// Settings for a [`Mapper`].
#[derive(Debug, Clone, Default)]
pub struct Options {
  /// Applied to table keys and to record field names before they are compared.
  pub name_translator: NameTranslator,
  /// Fail when a table has keys that no record field claims.
  pub error_on_unused_keys: bool,
  /// Fail on functions, threads and userdata instead of skipping them.
  pub error_on_unsupported_values: bool,
  pub zero_values: ZeroValues,
}

impl Options {
  pub fn with_name_translator(mut self, translator: NameTranslator) -> Self {
    self.name_translator = translator;
    self
  }

  pub fn with_error_on_unused_keys(mut self, enabled: bool) -> Self {
    self.error_on_unused_keys = enabled;
    self
  }

  pub fn with_error_on_unsupported_values(mut self, enabled: bool) -> Self {
    self.error_on_unsupported_values = enabled;
    self
  }

  pub fn with_zero_values(mut self, zero_values: ZeroValues) -> Self {
    self.zero_values = zero_values;
    self
  }
}

/// Maps Lua values onto records.
///
/// A mapper owns its [`Options`] and a cache of record field descriptors, and
/// can be shared between threads.
///
/// ```
/// use luamap_lib::Mapper;
/// use mlua::Lua;
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, Deserialize)]
/// struct Person {
///   name: String,
///   age: u32,
/// }
///
/// let lua = Lua::new();
/// let value = lua.load("{ name = 'Michel', age = '31' }").eval().unwrap();
///
/// let mut person = Person::default();
/// Mapper::default().map(&value, &mut person).unwrap();
/// assert_eq!(person.name, "Michel");
/// assert_eq!(person.age, 31);
/// ```
///
/// The target has to be passed by mutable reference:
///
/// ```compile_fail
/// use luamap_lib::Mapper;
/// use mlua::{Lua, Value};
///
/// let lua = Lua::new();
/// let value: Value = lua.load("{ name = 'Michel' }").eval().unwrap();
/// let person = String::new();
/// Mapper::default().map(&value, person).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct Mapper {
  pub(crate) options: Options,
  pub(crate) fields: FieldCache,
}

impl Mapper {
  pub fn new(options: Options) -> Self {
    Self {
      options,
      fields: FieldCache::default(),
    }
  }

  pub fn options(&self) -> &Options {
    &self.options
  }

  /// Convert a Lua value into a [`GenericValue`] tree.
  pub fn normalize(&self, value: &LuaValue) -> Result<GenericValue> {
    debug!(kind = %classify(value), "normalizing lua value");
    Normalizer::new(&self.options).normalize(value)
  }

  /// Decode an already normalized tree.
  pub fn decode_value<'de, T: Deserialize<'de>>(&self, value: &'de GenericValue) -> Result<T> {
    T::deserialize(Decoder::new(self, value, FieldPath::root()))
  }

  /// Normalize and decode a Lua value, returning the record.
  pub fn decode<T: DeserializeOwned>(&self, value: &LuaValue) -> Result<T> {
    let tree = self.normalize(value)?;
    self.decode_value(&tree)
  }

  /// Normalize and decode a Lua value into `target`.
  ///
  /// `target` is only written once the whole value decoded; on error it is
  /// left as it was.
  pub fn map<T: DeserializeOwned>(&self, value: &LuaValue, target: &mut T) -> Result<()> {
    *target = self.decode(value)?;
    Ok(())
  }
}

/// [`Mapper::map`] with default [`Options`].
pub fn map<T: DeserializeOwned>(value: &LuaValue, target: &mut T) -> Result<()> {
  Mapper::default().map(value, target)
}
