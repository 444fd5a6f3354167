//! Field descriptors for record types.
//!
//! serde hands `deserialize_struct` the record's declared field names, after
//! any `#[serde(rename = "...")]`. From those we derive, once per record type,
//! the key each field is matched against.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use crate::names::NameTranslator;
use crate::value::GenericValue;

/// A declared record field and the key it is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
  /// Name as declared (or renamed) on the record.
  pub name: &'static str,
  /// The declared name passed through the translator.
  pub key: String,
}

/// All field descriptors of one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
  pub name: &'static str,
  pub fields: Vec<FieldDescriptor>,
}

/// Mapping entries split into the fields they populate and the leftovers.
pub(crate) struct FieldMatch<'de> {
  pub(crate) matched: Vec<(&'static str, &'de GenericValue)>,
  /// Declared fields no key claimed.
  pub(crate) missing: Vec<&'static str>,
  pub(crate) unused: Vec<String>,
}

impl RecordShape {
  pub fn new(name: &'static str, fields: &'static [&'static str], translator: &NameTranslator) -> Self {
    let fields = fields
      .iter()
      .map(|&field| FieldDescriptor {
        name: field,
        key: translator.translate(field),
      })
      .collect();
    Self { name, fields }
  }

  /// Assign mapping entries to fields.
  ///
  /// Exact key matches are resolved first; remaining keys then try an ASCII
  /// case-insensitive match against fields nothing has claimed yet.
  pub(crate) fn match_entries<'de>(&self, entries: &'de BTreeMap<String, GenericValue>) -> FieldMatch<'de> {
    let mut claimed = vec![false; self.fields.len()];
    let mut matched = Vec::with_capacity(entries.len());
    let mut pending = Vec::new();

    for (key, value) in entries {
      match self.fields.iter().position(|field| field.key == *key) {
        Some(i) if !claimed[i] => {
          claimed[i] = true;
          matched.push((self.fields[i].name, value));
        }
        _ => pending.push((key, value)),
      }
    }

    let mut unused = Vec::new();
    for (key, value) in pending {
      let found = (0..self.fields.len()).find(|&i| !claimed[i] && self.fields[i].key.eq_ignore_ascii_case(key));
      match found {
        Some(i) => {
          claimed[i] = true;
          matched.push((self.fields[i].name, value));
        }
        None => unused.push(key.clone()),
      }
    }

    let missing = self
      .fields
      .iter()
      .zip(&claimed)
      .filter(|(_, claimed)| !**claimed)
      .map(|(field, _)| field.name)
      .collect();

    FieldMatch {
      matched,
      missing,
      unused,
    }
  }
}

type ShapeKey = (&'static str, usize, usize);

/// Memoized [`RecordShape`]s, keyed by record type.
///
/// Racing first computations produce equal shapes, so whichever insert wins
/// is as good as the other.
#[derive(Debug, Default)]
pub(crate) struct FieldCache {
  shapes: RwLock<HashMap<ShapeKey, Arc<RecordShape>>>,
}

impl FieldCache {
  pub(crate) fn shape(
    &self,
    name: &'static str,
    fields: &'static [&'static str],
    translator: &NameTranslator,
  ) -> Arc<RecordShape> {
    let key = (name, fields.as_ptr() as usize, fields.len());

    let cached = self
      .shapes
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(&key)
      .cloned();
    if let Some(shape) = cached {
      return shape;
    }

    let shape = Arc::new(RecordShape::new(name, fields, translator));
    self
      .shapes
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(key)
      .or_insert(shape)
      .clone()
  }

  #[cfg(test)]
  pub(crate) fn len(&self) -> usize {
    self.shapes.read().unwrap_or_else(PoisonError::into_inner).len()
  }
}
