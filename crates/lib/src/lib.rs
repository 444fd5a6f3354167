//! Map Lua tables onto statically typed records.
//!
//! A Lua value is first normalized into a [`GenericValue`] tree: tables with a
//! positive border become sequences, all others become mappings whose keys
//! are passed through a [`NameTranslator`]. The tree is then decoded into any
//! `serde::Deserialize` type, coercing scalars weakly (`"31"` fills an `i32`).
//!
//! ```
//! use mlua::Lua;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Role {
//!   name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct Person {
//!   name: String,
//!   age: i32,
//!   work_place: String,
//!   role: Vec<Role>,
//! }
//!
//! let lua = Lua::new();
//! let value = lua
//!   .load(
//!     r#"{
//!       name = "Michel",
//!       age = "31",
//!       work_place = "San Jose",
//!       role = { { name = "Administrator" }, { name = "Operator" } },
//!     }"#,
//!   )
//!   .eval()?;
//!
//! let person: Person = luamap_lib::Mapper::default().decode(&value)?;
//! assert_eq!(person.age, 31);
//! assert_eq!(person.work_place, "San Jose");
//! assert_eq!(person.role[1].name, "Operator");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod decode;
pub mod error;
pub mod mapper;
pub mod names;
pub mod value;

pub use error::{DecodeError, ErrorKind, FieldPath, Result, Segment};
pub use mapper::{Mapper, Options, ZeroValues, map};
pub use names::NameTranslator;
pub use value::{GenericValue, Kind, classify};
