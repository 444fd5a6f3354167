//! Structural decoding of [`GenericValue`](crate::value::GenericValue) trees
//! into serde records.

mod de;
mod fields;
mod zero;

pub(crate) use de::Decoder;
pub(crate) use fields::FieldCache;
pub use fields::{FieldDescriptor, RecordShape};
