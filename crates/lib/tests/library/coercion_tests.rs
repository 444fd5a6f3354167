//! Weak scalar coercion.

use luamap_lib::{ErrorKind, Mapper};
use mlua::prelude::*;
use serde::Deserialize;

use super::common::eval;

#[derive(Debug, Deserialize)]
struct Flags {
  a: bool,
  b: bool,
  c: bool,
  d: bool,
}

#[derive(Debug, Deserialize)]
struct Numbers {
  int: i64,
  small: u8,
  float: f64,
  text: String,
}

fn decode<T: serde::de::DeserializeOwned>(source: &str) -> luamap_lib::Result<T> {
  let lua = Lua::new();
  let value = eval(&lua, source).map_err(luamap_lib::DecodeError::from)?;
  Mapper::default().decode(&value)
}

#[test]
fn booleans_from_numbers_and_strings() {
  let flags: Flags = decode("{ a = 1, b = 'true', c = '0', d = 0.5 }").unwrap();
  assert!(flags.a);
  assert!(flags.b);
  assert!(!flags.c);
  assert!(flags.d);
}

#[test]
fn empty_string_is_false() {
  let flags: Flags = decode("{ a = '', b = 'F', c = 'T', d = false }").unwrap();
  assert!(!flags.a);
  assert!(!flags.b);
  assert!(flags.c);
  assert!(!flags.d);
}

#[test]
fn unrecognized_boolean_spelling_fails() {
  let err = decode::<Flags>("{ a = 'yes', b = true, c = true, d = true }").unwrap_err();
  assert_eq!(err.path().to_string(), "a");
  assert_eq!(err.to_string(), "a: expected a boolean, but got string \"yes\"");
}

#[test]
fn integers_from_strings_floats_and_booleans() {
  let numbers: Numbers = decode("{ int = '-0x10', small = 7.0, float = 1, text = 'x' }").unwrap();
  assert_eq!(numbers.int, -16);
  assert_eq!(numbers.small, 7);
  assert_eq!(numbers.float, 1.0);

  let numbers: Numbers = decode("{ int = true, small = '', float = '2.5', text = 'x' }").unwrap();
  assert_eq!(numbers.int, 1);
  assert_eq!(numbers.small, 0);
  assert_eq!(numbers.float, 2.5);
}

#[test]
fn strings_from_numbers_and_booleans() {
  let numbers: Numbers = decode("{ int = 0, small = 0, float = 0, text = 42 }").unwrap();
  assert_eq!(numbers.text, "42");
  let numbers: Numbers = decode("{ int = 0, small = 0, float = 0, text = 2.5 }").unwrap();
  assert_eq!(numbers.text, "2.5");
  let numbers: Numbers = decode("{ int = 0, small = 0, float = 0, text = true }").unwrap();
  assert_eq!(numbers.text, "1");
}

#[test]
fn fractional_float_is_not_an_integer() {
  let err = decode::<Numbers>("{ int = 1.5, small = 0, float = 0, text = '' }").unwrap_err();
  assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
  assert_eq!(err.to_string(), "int: expected an integer, but got number `1.5`");
}

#[test]
fn non_numeric_string_is_not_an_integer() {
  let err = decode::<Numbers>("{ int = 'thirty', small = 0, float = 0, text = '' }").unwrap_err();
  match err.kind() {
    ErrorKind::TypeMismatch { expected, got } => {
      assert_eq!(expected, "an integer");
      assert_eq!(got, "string \"thirty\"");
    }
    other => panic!("unexpected error {:?}", other),
  }
}

#[test]
fn out_of_range_integer_reports_its_field() {
  let err = decode::<Numbers>("{ int = 0, small = 300, float = 0, text = '' }").unwrap_err();
  assert_eq!(err.path().to_string(), "small");
  assert!(err.to_string().contains("300"), "{}", err);
}

#[test]
fn strings_do_not_accept_tables() {
  let err = decode::<Numbers>("{ int = 0, small = 0, float = 0, text = { 1 } }").unwrap_err();
  assert_eq!(err.path().to_string(), "text");
  assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
}
