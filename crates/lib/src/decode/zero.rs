//! Zero values for record fields that no table key fills.
//!
//! A field without a key is left at the zero value of its type: `false`, `0`,
//! `0.0`, `""`, an empty list or map, `None`, or a record whose fields are all
//! zero. Only enums have no zero value and fail with
//! [`ErrorKind::MissingField`].

use std::ops::Range;
use std::slice;

use serde::de::value::BorrowedStrDeserializer;
use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};

use crate::error::{DecodeError, ErrorKind, FieldPath, Result};

const NO_FIELDS: &[&str] = &[];

pub(crate) struct ZeroDecoder {
  field: &'static str,
  path: FieldPath,
}

impl ZeroDecoder {
  pub(crate) fn new(field: &'static str, path: FieldPath) -> Self {
    Self { field, path }
  }
}

macro_rules! zero_integers {
  ($($method:ident)*) => {$(
    fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
      visitor.visit_i64(0)
    }
  )*};
}

impl<'de> de::Deserializer<'de> for ZeroDecoder {
  type Error = DecodeError;

  fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_unit()
  }

  fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_bool(false)
  }

  zero_integers! {
    deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
    deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
  }

  fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_f64(0.0)
  }

  fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_f64(0.0)
  }

  fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_char('\0')
  }

  fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_borrowed_str("")
  }

  fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_borrowed_str("")
  }

  fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_borrowed_bytes(&[])
  }

  fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_borrowed_bytes(&[])
  }

  fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_none()
  }

  fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_unit()
  }

  fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
    visitor.visit_unit()
  }

  fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
    visitor.visit_newtype_struct(self)
  }

  fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    self.deserialize_tuple(0, visitor)
  }

  fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, visitor: V) -> Result<V::Value> {
    visitor.visit_seq(ZeroElements {
      field: self.field,
      path: self.path,
      indices: 0..len,
    })
  }

  fn deserialize_tuple_struct<V: Visitor<'de>>(
    self,
    _name: &'static str,
    len: usize,
    visitor: V,
  ) -> Result<V::Value> {
    self.deserialize_tuple(len, visitor)
  }

  fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_map(ZeroFields {
      path: self.path,
      fields: NO_FIELDS.iter(),
      pending: None,
    })
  }

  fn deserialize_struct<V: Visitor<'de>>(
    self,
    _name: &'static str,
    fields: &'static [&'static str],
    visitor: V,
  ) -> Result<V::Value> {
    visitor.visit_map(ZeroFields {
      path: self.path,
      fields: fields.iter(),
      pending: None,
    })
  }

  fn deserialize_enum<V: Visitor<'de>>(
    self,
    _name: &'static str,
    _variants: &'static [&'static str],
    _visitor: V,
  ) -> Result<V::Value> {
    Err(
      DecodeError::new(ErrorKind::MissingField {
        field: self.field.to_string(),
      })
      .at(&self.path),
    )
  }

  fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_borrowed_str(self.field)
  }

  fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
    visitor.visit_unit()
  }
}

/// The elements of a zero tuple, or none for a list.
struct ZeroElements {
  field: &'static str,
  path: FieldPath,
  indices: Range<usize>,
}

impl<'de> SeqAccess<'de> for ZeroElements {
  type Error = DecodeError;

  fn next_element_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<Option<S::Value>> {
    match self.indices.next() {
      Some(i) => seed
        .deserialize(ZeroDecoder::new(self.field, self.path.index(i + 1)))
        .map(Some),
      None => Ok(None),
    }
  }

  fn size_hint(&self) -> Option<usize> {
    Some(self.indices.len())
  }
}

/// The fields of a zero record, each holding its own zero value.
struct ZeroFields {
  path: FieldPath,
  fields: slice::Iter<'static, &'static str>,
  pending: Option<&'static str>,
}

impl<'de> MapAccess<'de> for ZeroFields {
  type Error = DecodeError;

  fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
    match self.fields.next() {
      Some(&field) => {
        self.pending = Some(field);
        seed.deserialize(BorrowedStrDeserializer::<DecodeError>::new(field)).map(Some)
      }
      None => Ok(None),
    }
  }

  fn next_value_seed<S: DeserializeSeed<'de>>(&mut self, seed: S) -> Result<S::Value> {
    let Some(field) = self.pending.take() else {
      return Err(de::Error::custom("record value requested before its key"));
    };
    seed.deserialize(ZeroDecoder::new(field, self.path.key(field)))
  }

  fn size_hint(&self) -> Option<usize> {
    Some(self.fields.len())
  }
}
