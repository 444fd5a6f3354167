//! Lua value classification and normalization.

mod lua;
mod types;

pub(crate) use lua::Normalizer;
pub use lua::{MAX_DEPTH, classify};
pub use types::{GenericValue, Kind};
