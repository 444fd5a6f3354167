//! Error types for mapping Lua values onto records.
//!
//! Every failure is a [`DecodeError`]: an [`ErrorKind`] plus the [`FieldPath`]
//! of the value that could not be decoded. The path is rendered Lua-style,
//! with 1-based sequence indices, e.g. `role[2].name`.

use std::fmt;

use serde::de;
use thiserror::Error;

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// What went wrong while normalizing or decoding a value.
#[derive(Debug, Error)]
pub enum ErrorKind {
  /// A record or map was requested but the value is not a table.
  #[error("expected a table, but got {got}")]
  ExpectedMapping { got: &'static str },

  /// A sequence was requested but the value is not an array.
  #[error("expected an array, but got {got}")]
  ExpectedSequence { got: &'static str },

  /// A scalar could not be coerced into the requested type.
  #[error("expected {expected}, but got {got}")]
  TypeMismatch { expected: String, got: String },

  /// The table holds keys that no field of the record claims.
  #[error("unused keys: {}", keys.join(", "))]
  UnusedKeys { keys: Vec<String> },

  /// A field whose type has no zero value, such as an enum, has no matching key.
  #[error("missing field `{field}`")]
  MissingField { field: String },

  /// A table entry holds a Lua value with no decodable representation.
  #[error("cannot decode a lua {kind} value")]
  UnsupportedFieldType { kind: &'static str },

  /// A table holds a reference to itself or to one of its ancestors.
  #[error("table contains a reference to itself")]
  CyclicTable,

  /// Tables are nested deeper than the normalizer follows.
  #[error("tables are nested more than {limit} levels deep")]
  TooDeep { limit: usize },

  /// Free-form error raised by a serde visitor.
  #[error("{0}")]
  Message(String),

  #[error("lua error: {0}")]
  Lua(#[from] mlua::Error),
}

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// A record field or table key.
  Key(String),
  /// A position in a sequence, 1-based.
  Index(usize),
}

/// Location of a value inside the decoded tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
  /// The path of the root value.
  pub fn root() -> Self {
    Self::default()
  }

  pub fn is_root(&self) -> bool {
    self.0.is_empty()
  }

  pub fn segments(&self) -> &[Segment] {
    &self.0
  }

  /// Path of a field or key below this one.
  pub fn key(&self, key: impl Into<String>) -> Self {
    let mut path = self.clone();
    path.0.push(Segment::Key(key.into()));
    path
  }

  /// Path of a sequence element below this one. `index` is 1-based.
  pub fn index(&self, index: usize) -> Self {
    let mut path = self.clone();
    path.0.push(Segment::Index(index));
    path
  }
}

impl fmt::Display for FieldPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.is_empty() {
      return f.write_str("<root>");
    }
    for (i, segment) in self.0.iter().enumerate() {
      match segment {
        Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
        Segment::Key(key) => write!(f, ".{}", key)?,
        Segment::Index(index) => write!(f, "[{}]", index)?,
      }
    }
    Ok(())
  }
}

/// An error raised while mapping a Lua value, located by its [`FieldPath`].
#[derive(Debug)]
pub struct DecodeError {
  kind: ErrorKind,
  path: FieldPath,
}

impl DecodeError {
  pub fn new(kind: ErrorKind) -> Self {
    Self {
      kind,
      path: FieldPath::root(),
    }
  }

  pub(crate) fn at(mut self, path: &FieldPath) -> Self {
    self.path = path.clone();
    self
  }

  /// Attach `path` unless a deeper path was already recorded.
  pub(crate) fn or_at(self, path: &FieldPath) -> Self {
    if self.path.is_root() { self.at(path) } else { self }
  }

  pub fn kind(&self) -> &ErrorKind {
    &self.kind
  }

  pub fn into_kind(self) -> ErrorKind {
    self.kind
  }

  /// Where in the tree the error happened.
  pub fn path(&self) -> &FieldPath {
    &self.path
  }
}

impl fmt::Display for DecodeError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.path.is_root() {
      write!(f, "{}", self.kind)
    } else {
      write!(f, "{}: {}", self.path, self.kind)
    }
  }
}

impl std::error::Error for DecodeError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    std::error::Error::source(&self.kind)
  }
}

impl From<ErrorKind> for DecodeError {
  fn from(kind: ErrorKind) -> Self {
    Self::new(kind)
  }
}

impl From<mlua::Error> for DecodeError {
  fn from(err: mlua::Error) -> Self {
    Self::new(ErrorKind::Lua(err))
  }
}

impl de::Error for DecodeError {
  fn custom<T: fmt::Display>(msg: T) -> Self {
    Self::new(ErrorKind::Message(msg.to_string()))
  }

  fn invalid_type(unexp: de::Unexpected<'_>, exp: &dyn de::Expected) -> Self {
    Self::new(ErrorKind::TypeMismatch {
      expected: exp.to_string(),
      got: unexp.to_string(),
    })
  }

  fn missing_field(field: &'static str) -> Self {
    Self::new(ErrorKind::MissingField {
      field: field.to_string(),
    })
  }
}
