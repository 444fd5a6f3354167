//! A weakly typed serde [`Deserializer`](de::Deserializer) over [`GenericValue`].
//!
//! Scalars are coerced between kinds when their textual or numeric form is
//! compatible (`"31"` fills an integer, `1` fills a bool), records are matched
//! against tables key by key through the mapper's [`FieldCache`], and every
//! error is tagged with the path of the value that caused it.
//!
//! [`FieldCache`]: super::fields::FieldCache

use std::collections::{BTreeMap, btree_map};
use std::iter::Enumerate;
use std::slice;
use std::vec;

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeSeed, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use tracing::debug;

use super::fields::FieldMatch;
use super::zero::ZeroDecoder;
use crate::error::{DecodeError, ErrorKind, FieldPath, Result};
use crate::mapper::Mapper;
use crate::value::GenericValue;

pub(crate) struct Decoder<'a, 'de> {
  mapper: &'a Mapper,
  value: &'de GenericValue,
  path: FieldPath,
}

impl<'a, 'de> Decoder<'a, 'de> {
  pub(crate) fn new(mapper: &'a Mapper, value: &'de GenericValue, path: FieldPath) -> Self {
    Self { mapper, value, path }
  }

  fn mismatch(&self, expected: &str) -> DecodeError {
    DecodeError::new(ErrorKind::TypeMismatch {
      expected: expected.to_string(),
      got: self.value.describe(),
    })
    .at(&self.path)
  }

  fn expected_mapping(&self) -> DecodeError {
    DecodeError::new(ErrorKind::ExpectedMapping {
      got: self.value.kind_phrase(),
    })
    .at(&self.path)
  }

  fn expected_sequence(&self) -> DecodeError {
    DecodeError::new(ErrorKind::ExpectedSequence {
      got: self.value.kind_phrase(),
    })
    .at(&self.path)
  }

  fn visit_integer<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.value {
      GenericValue::Int(i) => visitor.visit_i64(*i),
      GenericValue::Float(f) if is_integral(*f) => visitor.visit_i64(*f as i64),
      GenericValue::Bool(b) => visitor.visit_i64(i64::from(*b)),
      GenericValue::String(s) => match parse_integer(s) {
        Some(Integer::Signed(i)) => visitor.visit_i64(i),
        Some(Integer::Unsigned(u)) => visitor.visit_u64(u),
        None => Err(self.mismatch("an integer")),
      },
      _ => Err(self.mismatch("an integer")),
    }
  }

  fn visit_float<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.value {
      GenericValue::Float(f) => visitor.visit_f64(*f),
      GenericValue::Int(i) => visitor.visit_f64(*i as f64),
      GenericValue::Bool(b) => visitor.visit_f64(if *b { 1.0 } else { 0.0 }),
      GenericValue::String(s) if s.is_empty() => visitor.visit_f64(0.0),
      GenericValue::String(s) => match s.parse::<f64>() {
        Ok(f) => visitor.visit_f64(f),
        Err(_) => Err(self.mismatch("a number")),
      },
      _ => Err(self.mismatch("a number")),
    }
  }

  fn visit_sequence<V: Visitor<'de>>(self, items: &'de [GenericValue], visitor: V) -> Result<V::Value> {
    let mut seq = SeqDecoder {
      mapper: self.mapper,
      items: items.iter().enumerate(),
      path: self.path.clone(),
    };
    let value = visitor.visit_seq(&mut seq)?;

    let remaining = seq.items.len();
    if remaining > 0 {
      let expected = format!("{} element(s)", items.len() - remaining);
      return Err(<DecodeError as de::Error>::invalid_length(items.len(), &expected.as_str()).at(&self.path));
    }
    Ok(value)
  }

  fn visit_record<V: Visitor<'de>>(
    self,
    name: &'static str,
    fields: &'static [&'static str],
    entries: &'de BTreeMap<String, GenericValue>,
    visitor: V,
  ) -> Result<V::Value> {
    let options = &self.mapper.options;
    let shape = self.mapper.fields.shape(name, fields, &options.name_translator);
    let FieldMatch {
      matched,
      missing,
      unused,
    } = shape.match_entries(entries);
    if !unused.is_empty() {
      debug!(record = name, path = %self.path, keys = ?unused, "table has unused keys");
    }

    let fields: Vec<_> = matched
      .into_iter()
      .map(|(field, value)| (field, Some(value)))
      .chain(missing.into_iter().map(|field| (field, None)))
      .collect();
    let value = visitor.visit_map(RecordDecoder {
      mapper: self.mapper,
      fields: fields.into_iter(),
      pending: None,
      path: self.path.clone(),
    })?;

    if options.error_on_unused_keys && !unused.is_empty() {
      return Err(DecodeError::new(ErrorKind::UnusedKeys { keys: unused }).at(&self.path));
    }
    Ok(value)
  }

  /// Find the declared variant a key or string names, falling back to the
  /// raw text so serde can report it as unknown.
  fn resolve_variant(&self, raw: &'de str, variants: &'static [&'static str]) -> &'de str {
    let translator = &self.mapper.options.name_translator;
    let found: Option<&'de str> = variants
      .iter()
      .copied()
      .find(|variant| *variant == raw)
      .or_else(|| variants.iter().copied().find(|variant| translator.translate(variant) == raw))
      .or_else(|| {
        variants
          .iter()
          .copied()
          .find(|variant| variant.eq_ignore_ascii_case(raw) || translator.translate(variant).eq_ignore_ascii_case(raw))
      });
    found.unwrap_or(raw)
  }
}

macro_rules! deserialize_integers {
  ($($method:ident)*) => {$(
    fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
      self.visit_integer(visitor)
    }
  )*};
}

impl<'de> de::Deserializer<'de> for Decoder<'_, 'de> {
  type Error = DecodeError;

  fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    let value = self.value;
    match value {
      GenericValue::Nil => visitor.visit_unit(),
      GenericValue::Bool(b) => visitor.visit_bool(*b),
      GenericValue::String(s) => visitor.visit_borrowed_str(s),
      GenericValue::Int(i) => visitor.visit_i64(*i),
      GenericValue::Float(f) => visitor.visit_f64(*f),
      GenericValue::Sequence(items) => self.visit_sequence(items, visitor),
      GenericValue::Mapping(entries) => visitor.visit_map(MapDecoder {
        mapper: self.mapper,
        entries: entries.iter(),
        pending: None,
        path: self.path,
      }),
    }
  }

  fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.value {
      GenericValue::Bool(b) => visitor.visit_bool(*b),
      GenericValue::Int(i) => visitor.visit_bool(*i != 0),
      GenericValue::Float(f) => visitor.visit_bool(*f != 0.0),
      GenericValue::String(s) => match parse_bool(s) {
        Some(b) => visitor.visit_bool(b),
        None => Err(self.mismatch("a boolean")),
      },
      _ => Err(self.mismatch("a boolean")),
    }
  }

  deserialize_integers! {
    deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
    deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
  }

  fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.visit_float(visitor)
  }

  fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.visit_float(visitor)
  }

  fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.deserialize_str(visitor)
  }

  fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.value {
      GenericValue::String(s) => visitor.visit_borrowed_str(s),
      GenericValue::Int(i) => visitor.visit_string(i.to_string()),
      GenericValue::Float(f) => visitor.visit_string(f.to_string()),
      GenericValue::Bool(b) => visitor.visit_borrowed_str(if *b { "1" } else { "0" }),
      _ => Err(self.mismatch("a string")),
    }
  }

  fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.deserialize_str(visitor)
  }

  fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.value {
      GenericValue::String(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
      _ => self.deserialize_any(visitor),
    }
  }

  fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.deserialize_bytes(visitor)
  }

  fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.value {
      GenericValue::Nil => visitor.visit_none(),
      _ => visitor.visit_some(self),
    }
  }

  fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.value {
      GenericValue::Nil => visitor.visit_unit(),
      _ => Err(self.mismatch("nil")),
    }
  }

  fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
    self.deserialize_unit(visitor)
  }

  fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
    visitor.visit_newtype_struct(self)
  }

  fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    let value = self.value;
    match value {
      GenericValue::Sequence(items) => self.visit_sequence(items, visitor),
      // `{}` in Lua is both an empty table and an empty array.
      GenericValue::Mapping(entries) if entries.is_empty() => self.visit_sequence(&[], visitor),
      _ => Err(self.expected_sequence()),
    }
  }

  fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
    self.deserialize_seq(visitor)
  }

  fn deserialize_tuple_struct<V: Visitor<'de>>(
    self,
    _name: &'static str,
    _len: usize,
    visitor: V,
  ) -> Result<V::Value> {
    self.deserialize_seq(visitor)
  }

  fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    let value = self.value;
    match value {
      GenericValue::Mapping(entries) => visitor.visit_map(MapDecoder {
        mapper: self.mapper,
        entries: entries.iter(),
        pending: None,
        path: self.path,
      }),
      _ => Err(self.expected_mapping()),
    }
  }

  fn deserialize_struct<V: Visitor<'de>>(
    self,
    name: &'static str,
    fields: &'static [&'static str],
    visitor: V,
  ) -> Result<V::Value> {
    let value = self.value;
    match value {
      GenericValue::Mapping(entries) => self.visit_record(name, fields, entries, visitor),
      _ => Err(self.expected_mapping()),
    }
  }

  fn deserialize_enum<V: Visitor<'de>>(
    self,
    _name: &'static str,
    variants: &'static [&'static str],
    visitor: V,
  ) -> Result<V::Value> {
    match self.value {
      GenericValue::String(s) => visitor.visit_enum(EnumDecoder {
        mapper: self.mapper,
        variant: self.resolve_variant(s, variants),
        value: None,
        path: self.path.clone(),
      }),
      GenericValue::Mapping(entries) if entries.len() == 1 => {
        let Some((key, value)) = entries.iter().next() else {
          return Err(self.mismatch("an enum variant"));
        };
        visitor.visit_enum(EnumDecoder {
          mapper: self.mapper,
          variant: self.resolve_variant(key, variants),
          value: Some(value),
          path: self.path.key(key.as_str()),
        })
      }
      _ => Err(self.mismatch("a string or a single-entry table naming an enum variant")),
    }
  }

  fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.deserialize_str(visitor)
  }

  fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_unit()
  }
}

/// Feeds every declared field to a derived struct visitor. Fields without a
/// matching key get their zero value.
struct RecordDecoder<'a, 'de> {
  mapper: &'a Mapper,
  fields: vec::IntoIter<(&'static str, Option<&'de GenericValue>)>,
  pending: Option<(&'static str, Option<&'de GenericValue>)>,
  path: FieldPath,
}

impl<'de> MapAccess<'de> for RecordDecoder<'_, 'de> {
  type Error = DecodeError;

  fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
    match self.fields.next() {
      Some((name, value)) => {
        self.pending = Some((name, value));
        seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(name)).map(Some)
      }
      None => Ok(None),
    }
  }

  fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<S::Value> {
    let Some((name, value)) = self.pending.take() else {
      return Err(de::Error::custom("record value requested before its key"));
    };
    let path = self.path.key(name);
    let decoded = match value {
      Some(value) => seed.deserialize(Decoder::new(self.mapper, value, path.clone())),
      None => seed.deserialize(ZeroDecoder::new(name, path.clone())),
    };
    decoded.map_err(|err| err.or_at(&path))
  }

  fn size_hint(&self) -> Option<usize> {
    Some(self.fields.len())
  }
}

/// Feeds every entry of a table to a map visitor.
struct MapDecoder<'a, 'de> {
  mapper: &'a Mapper,
  entries: btree_map::Iter<'de, String, GenericValue>,
  pending: Option<(&'de str, &'de GenericValue)>,
  path: FieldPath,
}

impl<'de> MapAccess<'de> for MapDecoder<'_, 'de> {
  type Error = DecodeError;

  fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
    match self.entries.next() {
      Some((key, value)) => {
        self.pending = Some((key.as_str(), value));
        let path = self.path.key(key.as_str());
        seed.deserialize(KeyDecoder { key, path: &path }).map(Some)
      }
      None => Ok(None),
    }
  }

  fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<S::Value> {
    let Some((key, value)) = self.pending.take() else {
      return Err(de::Error::custom("table value requested before its key"));
    };
    let path = self.path.key(key);
    seed
      .deserialize(Decoder::new(self.mapper, value, path.clone()))
      .map_err(|err| err.or_at(&path))
  }

  fn size_hint(&self) -> Option<usize> {
    Some(self.entries.len())
  }
}

struct SeqDecoder<'a, 'de> {
  mapper: &'a Mapper,
  items: Enumerate<slice::Iter<'de, GenericValue>>,
  path: FieldPath,
}

impl<'de> SeqAccess<'de> for SeqDecoder<'_, 'de> {
  type Error = DecodeError;

  fn next_element_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<Option<S::Value>> {
    match self.items.next() {
      Some((i, item)) => {
        let path = self.path.index(i + 1);
        seed
          .deserialize(Decoder::new(self.mapper, item, path.clone()))
          .map(Some)
          .map_err(|err| err.or_at(&path))
      }
      None => Ok(None),
    }
  }

  fn size_hint(&self) -> Option<usize> {
    Some(self.items.len())
  }
}

/// Table keys as map keys. Keys are always strings, so numeric and boolean
/// key types parse them the same way scalar values are parsed.
struct KeyDecoder<'p, 'de> {
  key: &'de str,
  path: &'p FieldPath,
}

impl KeyDecoder<'_, '_> {
  fn mismatch(&self, expected: &str) -> DecodeError {
    DecodeError::new(ErrorKind::TypeMismatch {
      expected: format!("a table key that is {}", expected),
      got: format!("{:?}", self.key),
    })
    .at(self.path)
  }
}

macro_rules! deserialize_integer_keys {
  ($($method:ident)*) => {$(
    fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
      match parse_integer(self.key) {
        Some(Integer::Signed(i)) => visitor.visit_i64(i),
        Some(Integer::Unsigned(u)) => visitor.visit_u64(u),
        None => Err(self.mismatch("an integer")),
      }
    }
  )*};
}

impl<'de> de::Deserializer<'de> for KeyDecoder<'_, 'de> {
  type Error = DecodeError;

  fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_borrowed_str(self.key)
  }

  fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match parse_bool(self.key) {
      Some(b) => visitor.visit_bool(b),
      None => Err(self.mismatch("a boolean")),
    }
  }

  deserialize_integer_keys! {
    deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
    deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
  }

  fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.deserialize_f64(visitor)
  }

  fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    match self.key.parse::<f64>() {
      Ok(f) => visitor.visit_f64(f),
      Err(_) => Err(self.mismatch("a number")),
    }
  }

  fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_some(self)
  }

  fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
    visitor.visit_newtype_struct(self)
  }

  fn deserialize_enum<V: Visitor<'de>>(
    self,
    _name: &'static str,
    _variants: &'static [&'static str],
    visitor: V,
  ) -> Result<V::Value> {
    visitor.visit_enum(BorrowedStrDeserializer::<DecodeError>::new(self.key))
  }

  serde::forward_to_deserialize_any! {
    char str string bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
  }
}

/// Selects an enum variant from a string or a single-entry table.
struct EnumDecoder<'a, 'de> {
  mapper: &'a Mapper,
  variant: &'de str,
  value: Option<&'de GenericValue>,
  path: FieldPath,
}

impl<'a, 'de> EnumAccess<'de> for EnumDecoder<'a, 'de> {
  type Error = DecodeError;
  type Variant = VariantDecoder<'a, 'de>;

  fn variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<(S::Value, Self::Variant)> {
    let variant = seed
      .deserialize(BorrowedStrDeserializer::<DecodeError>::new(self.variant))
      .map_err(|err| err.or_at(&self.path))?;
    Ok((
      variant,
      VariantDecoder {
        mapper: self.mapper,
        value: self.value,
        path: self.path,
      },
    ))
  }
}

struct VariantDecoder<'a, 'de> {
  mapper: &'a Mapper,
  value: Option<&'de GenericValue>,
  path: FieldPath,
}

impl<'a, 'de> VariantDecoder<'a, 'de> {
  fn content(&self, expected: &str) -> Result<Decoder<'a, 'de>> {
    match self.value {
      Some(value) => Ok(Decoder::new(self.mapper, value, self.path.clone())),
      None => Err(
        DecodeError::new(ErrorKind::TypeMismatch {
          expected: expected.to_string(),
          got: "a bare variant name".to_string(),
        })
        .at(&self.path),
      ),
    }
  }
}

impl<'de> VariantAccess<'de> for VariantDecoder<'_, 'de> {
  type Error = DecodeError;

  fn unit_variant(self) -> Result<()> {
    match self.value {
      None | Some(GenericValue::Nil) => Ok(()),
      Some(value) => Err(Decoder::new(self.mapper, value, self.path).mismatch("a unit variant")),
    }
  }

  fn newtype_variant_seed<S: DeserializeSeed<'de>>(self, seed: S) -> Result<S::Value> {
    let content = self.content("a table holding the variant's value")?;
    seed.deserialize(content).map_err(|err| err.or_at(&self.path))
  }

  fn tuple_variant<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
    let content = self.content("a table holding the variant's elements")?;
    de::Deserializer::deserialize_tuple(content, len, visitor).map_err(|err| err.or_at(&self.path))
  }

  fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
    let content = self.content("a table holding the variant's fields")?;
    de::Deserializer::deserialize_struct(content, "", fields, visitor).map_err(|err| err.or_at(&self.path))
  }
}

enum Integer {
  Signed(i64),
  Unsigned(u64),
}

/// Parse an integer the way weakly typed input is read: optional sign,
/// optional `0x`/`0o`/`0b` prefix, and `""` as zero.
fn parse_integer(s: &str) -> Option<Integer> {
  if s.is_empty() {
    return Some(Integer::Signed(0));
  }

  let (negative, unsigned) = match s.as_bytes()[0] {
    b'-' => (true, &s[1..]),
    b'+' => (false, &s[1..]),
    _ => (false, s),
  };
  let (radix, digits) = match unsigned.get(..2) {
    Some("0x" | "0X") => (16, &unsigned[2..]),
    Some("0o" | "0O") => (8, &unsigned[2..]),
    Some("0b" | "0B") => (2, &unsigned[2..]),
    _ => (10, unsigned),
  };
  if digits.is_empty() || digits.starts_with(['+', '-']) {
    return None;
  }

  let magnitude = u64::from_str_radix(digits, radix).ok()?;
  if negative {
    if magnitude > i64::MIN.unsigned_abs() {
      return None;
    }
    return Some(Integer::Signed((magnitude as i64).wrapping_neg()));
  }
  match i64::try_from(magnitude) {
    Ok(i) => Some(Integer::Signed(i)),
    Err(_) => Some(Integer::Unsigned(magnitude)),
  }
}

/// `1 t T true TRUE True` and `0 f F false FALSE False`, with `""` as false.
fn parse_bool(s: &str) -> Option<bool> {
  match s {
    "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
    "" | "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
    _ => None,
  }
}

fn is_integral(f: f64) -> bool {
  f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}
