//! The intermediate value tree.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Serialize;

/// The shape of a single Lua value, without looking inside tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
  Nil,
  Boolean,
  String,
  Integer,
  Float,
  Table,
  /// Functions, threads, userdata and anything else the runtime produces,
  /// labelled with the runtime's type name.
  Other(&'static str),
}

impl Kind {
  pub fn name(self) -> &'static str {
    match self {
      Kind::Nil => "nil",
      Kind::Boolean => "boolean",
      Kind::String => "string",
      Kind::Integer => "integer",
      Kind::Float => "number",
      Kind::Table => "table",
      Kind::Other(name) => name,
    }
  }
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// A normalized Lua value.
///
/// Tables become either a [`Sequence`](GenericValue::Sequence) (they have a
/// positive border) or a [`Mapping`](GenericValue::Mapping) whose keys have
/// already been passed through the mapper's name translator.
///
/// Serializes untagged, so a tree prints as plain JSON:
///
/// ```json
/// { "Name": "Michel", "Role": [{ "Name": "Administrator" }] }
/// ```
///
/// It also implements `Deserialize`, so a record field of this type captures
/// the subtree under its key unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GenericValue {
  #[default]
  Nil,
  Bool(bool),
  String(String),
  Int(i64),
  Float(f64),
  Sequence(Vec<GenericValue>),
  Mapping(BTreeMap<String, GenericValue>),
}

impl GenericValue {
  /// Whether this is the zero value of its own kind.
  ///
  /// Containers are never zero, even when empty.
  pub fn is_zero(&self) -> bool {
    match self {
      GenericValue::Nil => true,
      GenericValue::Bool(b) => !b,
      GenericValue::String(s) => s.is_empty(),
      GenericValue::Int(i) => *i == 0,
      GenericValue::Float(f) => *f == 0.0,
      GenericValue::Sequence(_) | GenericValue::Mapping(_) => false,
    }
  }

  /// Noun phrase for this value's kind, as used in error messages.
  pub fn kind_phrase(&self) -> &'static str {
    match self {
      GenericValue::Nil => "nil",
      GenericValue::Bool(_) => "a boolean",
      GenericValue::String(_) => "a string",
      GenericValue::Int(_) => "an integer",
      GenericValue::Float(_) => "a number",
      GenericValue::Sequence(_) => "an array",
      GenericValue::Mapping(_) => "a table",
    }
  }

  /// Short description including scalar contents.
  pub fn describe(&self) -> String {
    match self {
      GenericValue::Nil => "nil".to_string(),
      GenericValue::Bool(b) => format!("boolean `{}`", b),
      GenericValue::String(s) => format!("string {:?}", s),
      GenericValue::Int(i) => format!("integer `{}`", i),
      GenericValue::Float(f) => format!("number `{}`", f),
      GenericValue::Sequence(items) => format!("an array of {} element(s)", items.len()),
      GenericValue::Mapping(_) => "a table".to_string(),
    }
  }

  pub fn as_mapping(&self) -> Option<&BTreeMap<String, GenericValue>> {
    match self {
      GenericValue::Mapping(entries) => Some(entries),
      _ => None,
    }
  }

  pub fn as_sequence(&self) -> Option<&[GenericValue]> {
    match self {
      GenericValue::Sequence(items) => Some(items),
      _ => None,
    }
  }
}

impl From<bool> for GenericValue {
  fn from(b: bool) -> Self {
    GenericValue::Bool(b)
  }
}

impl From<i64> for GenericValue {
  fn from(i: i64) -> Self {
    GenericValue::Int(i)
  }
}

impl From<f64> for GenericValue {
  fn from(f: f64) -> Self {
    GenericValue::Float(f)
  }
}

impl From<&str> for GenericValue {
  fn from(s: &str) -> Self {
    GenericValue::String(s.to_string())
  }
}

impl From<String> for GenericValue {
  fn from(s: String) -> Self {
    GenericValue::String(s)
  }
}

impl From<Vec<GenericValue>> for GenericValue {
  fn from(items: Vec<GenericValue>) -> Self {
    GenericValue::Sequence(items)
  }
}

impl From<BTreeMap<String, GenericValue>> for GenericValue {
  fn from(entries: BTreeMap<String, GenericValue>) -> Self {
    GenericValue::Mapping(entries)
  }
}

impl<K: Into<String>, V: Into<GenericValue>> FromIterator<(K, V)> for GenericValue {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    GenericValue::Mapping(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
  }
}

impl<'de> Deserialize<'de> for GenericValue {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_any(GenericValueVisitor)
  }
}

struct GenericValueVisitor;

impl<'de> Visitor<'de> for GenericValueVisitor {
  type Value = GenericValue;

  fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("any lua value")
  }

  fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
    Ok(GenericValue::Nil)
  }

  fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
    Ok(GenericValue::Nil)
  }

  fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
    GenericValue::deserialize(deserializer)
  }

  fn visit_bool<E: de::Error>(self, b: bool) -> Result<Self::Value, E> {
    Ok(GenericValue::Bool(b))
  }

  fn visit_i64<E: de::Error>(self, i: i64) -> Result<Self::Value, E> {
    Ok(GenericValue::Int(i))
  }

  fn visit_u64<E: de::Error>(self, u: u64) -> Result<Self::Value, E> {
    Ok(i64::try_from(u).map_or(GenericValue::Float(u as f64), GenericValue::Int))
  }

  fn visit_f64<E: de::Error>(self, f: f64) -> Result<Self::Value, E> {
    Ok(GenericValue::Float(f))
  }

  fn visit_str<E: de::Error>(self, s: &str) -> Result<Self::Value, E> {
    Ok(GenericValue::String(s.to_string()))
  }

  fn visit_string<E: de::Error>(self, s: String) -> Result<Self::Value, E> {
    Ok(GenericValue::String(s))
  }

  fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
    let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
    while let Some(item) = seq.next_element()? {
      items.push(item);
    }
    Ok(GenericValue::Sequence(items))
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
    let mut entries = BTreeMap::new();
    while let Some((key, value)) = map.next_entry::<String, GenericValue>()? {
      entries.insert(key, value);
    }
    Ok(GenericValue::Mapping(entries))
  }
}
