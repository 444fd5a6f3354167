//! Key name translation.
//!
//! Table keys and record field names are both passed through a
//! [`NameTranslator`] before they are compared, so `work_place` in Lua finds a
//! `work_place` field even though both are matched as `WorkPlace`.

use std::fmt;
use std::sync::Arc;

/// Maps a raw key to the name used for field matching.
#[derive(Clone)]
pub struct NameTranslator {
  name: &'static str,
  translate: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl NameTranslator {
  /// Wrap a custom translation function.
  pub fn new(translate: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
    Self {
      name: "custom",
      translate: Arc::new(translate),
    }
  }

  /// `snake_case` to `UpperCamelCase`. See [`to_upper_camel_case`].
  pub fn upper_camel_case() -> Self {
    Self {
      name: "upper_camel_case",
      translate: Arc::new(to_upper_camel_case),
    }
  }

  /// Keys are matched exactly as written.
  pub fn identity() -> Self {
    Self {
      name: "identity",
      translate: Arc::new(str::to_string),
    }
  }

  pub fn translate(&self, raw: &str) -> String {
    (self.translate)(raw)
  }
}

impl Default for NameTranslator {
  fn default() -> Self {
    Self::upper_camel_case()
  }
}

impl fmt::Debug for NameTranslator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("NameTranslator").field(&self.name).finish()
  }
}

/// Convert `snake_case` to `UpperCamelCase`.
///
/// The first character is upper-cased, then every `_` followed by an ASCII
/// lowercase letter is replaced by that letter upper-cased. Only ASCII is
/// transformed; everything else passes through.
///
/// ```
/// use luamap_lib::names::to_upper_camel_case;
///
/// assert_eq!(to_upper_camel_case("work_place"), "WorkPlace");
/// assert_eq!(to_upper_camel_case("name"), "Name");
/// assert_eq!(to_upper_camel_case("__private"), "_Private");
/// ```
pub fn to_upper_camel_case(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut chars = raw.chars();

  match chars.next() {
    Some(first) => out.push(first.to_ascii_uppercase()),
    None => return out,
  }

  let mut chars = chars.peekable();
  while let Some(c) = chars.next() {
    match chars.peek().copied() {
      Some(next) if c == '_' && next.is_ascii_lowercase() => {
        out.push(next.to_ascii_uppercase());
        chars.next();
      }
      _ => out.push(c),
    }
  }
  out
}
