//! Shape errors, unused keys and unsupported values.

use luamap_lib::{ErrorKind, Mapper, Options, map};
use mlua::prelude::*;

use super::common::{PERSON_SCRIPT, Person, eval, global};

fn strict() -> Mapper {
  Mapper::new(Options::default().with_error_on_unused_keys(true))
}

#[test]
fn array_root_is_not_a_record() -> LuaResult<()> {
  let lua = Lua::new();
  let value = eval(&lua, "{ 'hello' }")?;

  let mut person = Person::default();
  let err = map(&value, &mut person).unwrap_err();
  assert!(matches!(err.kind(), ErrorKind::ExpectedMapping { .. }));
  assert!(err.path().is_root());
  assert_eq!(err.to_string(), "expected a table, but got an array");
  Ok(())
}

#[test]
fn scalar_root_is_not_a_record() -> LuaResult<()> {
  let lua = Lua::new();
  let err = Mapper::default().decode::<Person>(&eval(&lua, "'Michel'")?).unwrap_err();
  assert_eq!(err.to_string(), "expected a table, but got a string");
  Ok(())
}

#[test]
fn record_where_list_expected() -> LuaResult<()> {
  let lua = Lua::new();
  let value = eval(&lua, "{ name = 'Michel', age = 31, x = 1, w = '', role = { name = 'Operator' } }")?;
  let err = Mapper::default().decode::<Person>(&value).unwrap_err();
  assert!(matches!(err.kind(), ErrorKind::ExpectedSequence { got: "a table" }));
  assert_eq!(err.to_string(), "role: expected an array, but got a table");
  Ok(())
}

#[test]
fn errors_carry_the_nested_path() -> LuaResult<()> {
  let lua = Lua::new();
  let value = eval(
    &lua,
    "{ name = 'Michel', age = 31, x = 1, w = '', role = { { name = 'a' }, { name = { 'b' } } } }",
  )?;
  let err = Mapper::default().decode::<Person>(&value).unwrap_err();
  assert_eq!(err.path().to_string(), "role[2].name");
  assert_eq!(
    err.to_string(),
    "role[2].name: expected a string, but got an array of 1 element(s)"
  );
  Ok(())
}

#[test]
fn absent_fields_take_zero_values() -> LuaResult<()> {
  let lua = Lua::new();
  let person: Person = Mapper::default().decode(&eval(&lua, "{ name = 'Michel' }")?).unwrap();
  assert_eq!(
    person,
    Person {
      name: "Michel".into(),
      ..Person::default()
    }
  );
  Ok(())
}

#[test]
fn absent_enum_field_is_missing() -> LuaResult<()> {
  #[derive(Debug, serde::Deserialize)]
  #[serde(rename_all = "snake_case")]
  enum Mode {
    Fast,
  }

  #[derive(Debug, serde::Deserialize)]
  struct Job {
    #[allow(dead_code)]
    name: String,
    mode: Mode,
  }

  let lua = Lua::new();
  let err = Mapper::default()
    .decode::<Job>(&eval(&lua, "{ name = 'build' }")?)
    .unwrap_err();
  assert!(matches!(err.kind(), ErrorKind::MissingField { field } if field == "mode"));
  assert_eq!(err.to_string(), "mode: missing field `mode`");

  let job: Job = Mapper::default().decode(&eval(&lua, "{ name = 'build', mode = 'fast' }")?).unwrap();
  assert!(matches!(job.mode, Mode::Fast));
  Ok(())
}

#[test]
fn cyclic_tables_are_errors() -> LuaResult<()> {
  let lua = Lua::new();
  let value = eval(
    &lua,
    "local p = { name = 'Michel', role = { { name = 'a' } } } p.role[1].owner = p return p",
  )?;
  let err = Mapper::default().decode::<Person>(&value).unwrap_err();
  assert!(matches!(err.kind(), ErrorKind::CyclicTable));
  assert_eq!(err.to_string(), "role[1].owner: table contains a reference to itself");
  Ok(())
}

#[test]
fn unused_keys_are_ignored_by_default() -> LuaResult<()> {
  let lua = Lua::new();
  let source = format!("{}\nperson.nickname = 'M'", PERSON_SCRIPT);
  let value = global(&lua, &source, "person")?;

  let person: Person = Mapper::default().decode(&value).unwrap();
  assert_eq!(person.name, "Michel");
  Ok(())
}

#[test]
fn unused_keys_fail_in_strict_mode() -> LuaResult<()> {
  let lua = Lua::new();
  let source = format!("{}\nperson.nickname = 'M'\nperson.team = 'ops'", PERSON_SCRIPT);
  let value = global(&lua, &source, "person")?;

  let mut person = Person::default();
  let err = strict().map(&value, &mut person).unwrap_err();
  match err.kind() {
    ErrorKind::UnusedKeys { keys } => assert_eq!(keys, &vec!["Nickname".to_string(), "Team".to_string()]),
    other => panic!("unexpected error {:?}", other),
  }
  assert_eq!(err.to_string(), "unused keys: Nickname, Team");
  assert_eq!(person, Person::default());
  Ok(())
}

#[test]
fn strict_mode_accepts_exact_tables() -> LuaResult<()> {
  let lua = Lua::new();
  let value = global(&lua, PERSON_SCRIPT, "person")?;
  let person: Person = strict().decode(&value).unwrap();
  assert_eq!(person.age, 31);
  Ok(())
}

#[test]
fn nested_unused_keys_report_their_record() -> LuaResult<()> {
  let lua = Lua::new();
  let value = eval(
    &lua,
    "{ name = 'Michel', age = 31, x = 1, w = '', role = { { name = 'a' }, { name = 'b', level = 3 } } }",
  )?;
  let err = strict().decode::<Person>(&value).unwrap_err();
  assert_eq!(err.to_string(), "role[2]: unused keys: Level");
  Ok(())
}

#[test]
fn type_errors_win_over_unused_keys() -> LuaResult<()> {
  let lua = Lua::new();
  let value = eval(&lua, "{ name = 'Michel', age = 'old', x = 1, w = '', role = {}, extra = 1 }")?;
  let err = strict().decode::<Person>(&value).unwrap_err();
  assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
  assert_eq!(err.path().to_string(), "age");
  Ok(())
}

#[test]
fn unsupported_values_fail_when_requested() -> LuaResult<()> {
  let lua = Lua::new();
  let value = eval(&lua, "{ name = 'Michel', callback = function() end }")?;

  let mapper = Mapper::new(Options::default().with_error_on_unsupported_values(true));
  let err = mapper.normalize(&value).unwrap_err();
  assert!(matches!(err.kind(), ErrorKind::UnsupportedFieldType { kind: "function" }));
  assert_eq!(err.to_string(), "callback: cannot decode a lua function value");

  let tree = Mapper::default().normalize(&value).unwrap();
  assert_eq!(tree.as_mapping().map(|entries| entries.len()), Some(1));
  Ok(())
}
