//! End-to-end mapping of Lua tables onto records.

use std::collections::HashMap;

use luamap_lib::{GenericValue, Mapper, NameTranslator, Options, map};
use mlua::prelude::*;
use serde::Deserialize;

use super::common::{PERSON_SCRIPT, Person, Role, eval, global};

fn assert_michel(person: &Person) {
  assert_eq!(person.name, "Michel");
  assert_eq!(person.age, 31);
  assert_eq!(person.x, 100);
  assert_eq!(person.work_place, "San Jose");
  assert_eq!(
    person.role,
    vec![
      Role {
        name: "Administrator".into()
      },
      Role {
        name: "Operator".into()
      },
    ]
  );
}

#[test]
fn maps_person() -> LuaResult<()> {
  let lua = Lua::new();
  let value = global(&lua, PERSON_SCRIPT, "person")?;

  let mut person = Person::default();
  map(&value, &mut person).unwrap();
  assert_michel(&person);
  Ok(())
}

#[test]
fn maps_person_with_exact_keys() -> LuaResult<()> {
  let lua = Lua::new();
  let value = global(&lua, PERSON_SCRIPT, "person")?;

  let mapper = Mapper::new(Options::default().with_name_translator(NameTranslator::identity()));
  let mut person = Person::default();
  mapper.map(&value, &mut person).unwrap();
  assert_michel(&person);
  Ok(())
}

#[test]
fn snake_case_keys_find_snake_case_fields() -> LuaResult<()> {
  #[derive(Debug, Deserialize)]
  struct Employee {
    name: String,
    age: i32,
    work_place: String,
    role: Vec<Role>,
  }

  let lua = Lua::new();
  let value = eval(
    &lua,
    r#"{
      name = "Michel",
      age = "31",
      work_place = "San Jose",
      role = { { name = "Administrator" }, { name = "Operator" } },
    }"#,
  )?;

  let employee: Employee = Mapper::default().decode(&value).unwrap();
  assert_eq!(format!("{} {}", employee.name, employee.age), "Michel 31");
  assert_eq!(employee.work_place, "San Jose");
  assert_eq!(employee.role.len(), 2);
  Ok(())
}

#[derive(Debug, Deserialize)]
struct Types {
  nil: Option<GenericValue>,
  bool: bool,
  string: String,
  #[serde(rename = "number_value")]
  number: i64,
  func: Option<GenericValue>,
}

#[test]
fn maps_scalar_types_with_exact_keys() -> LuaResult<()> {
  let lua = Lua::new();
  let value = global(
    &lua,
    r#"
      tbl = {
        ["Nil"] = nil,
        ["Bool"] = true,
        ["String"] = "string",
        ["Number_value"] = 10,
        ["Func"] = function() end,
      }
    "#,
    "tbl",
  )?;

  let mapper = Mapper::new(Options::default().with_name_translator(NameTranslator::identity()));
  let types: Types = mapper.decode(&value).unwrap();
  assert_eq!(types.nil, None);
  assert!(types.bool);
  assert_eq!(types.string, "string");
  assert_eq!(types.number, 10);
  assert_eq!(types.func, None);
  Ok(())
}

#[test]
fn optional_and_defaulted_fields_may_be_absent() -> LuaResult<()> {
  #[derive(Debug, Deserialize)]
  struct Profile {
    name: String,
    nickname: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
  }

  let lua = Lua::new();
  let profile: Profile = Mapper::default().decode(&eval(&lua, "{ name = 'Michel' }")?).unwrap();
  assert_eq!(profile.name, "Michel");
  assert_eq!(profile.nickname, None);
  assert!(profile.tags.is_empty());
  Ok(())
}

#[test]
fn empty_table_decodes_as_empty_list() -> LuaResult<()> {
  #[derive(Debug, Deserialize)]
  struct Tagged {
    tags: Vec<String>,
  }

  let lua = Lua::new();
  let tagged: Tagged = Mapper::default().decode(&eval(&lua, "{ tags = {} }")?).unwrap();
  assert!(tagged.tags.is_empty());
  Ok(())
}

#[test]
fn nested_maps_keep_translated_keys() -> LuaResult<()> {
  #[derive(Debug, Deserialize)]
  struct Scores {
    scores: HashMap<String, i32>,
  }

  let lua = Lua::new();
  let value = eval(&lua, "{ scores = { first_player = 3, second = '4' } }")?;
  let decoded: Scores = Mapper::default().decode(&value).unwrap();
  assert_eq!(decoded.scores.get("FirstPlayer"), Some(&3));
  assert_eq!(decoded.scores.get("Second"), Some(&4));
  Ok(())
}

#[test]
fn integer_keyed_tables_without_border_decode_as_maps() -> LuaResult<()> {
  let lua = Lua::new();
  let by_id: HashMap<u32, String> = Mapper::default()
    .decode(&eval(&lua, "{ [2] = 'two', [10] = 'ten' }")?)
    .unwrap();
  assert_eq!(by_id.get(&2).map(String::as_str), Some("two"));
  assert_eq!(by_id.get(&10).map(String::as_str), Some("ten"));
  Ok(())
}

#[test]
fn enums_select_variants_by_name() -> LuaResult<()> {
  #[derive(Debug, Deserialize, PartialEq)]
  #[serde(rename_all = "snake_case")]
  enum Level {
    Low,
    High,
  }

  #[derive(Debug, Deserialize, PartialEq)]
  enum Shape {
    Circle { radius: f64 },
    Square(f64),
  }

  #[derive(Debug, Deserialize)]
  struct Drawing {
    level: Level,
    shapes: Vec<Shape>,
  }

  let lua = Lua::new();
  let value = eval(
    &lua,
    "{ level = 'high', shapes = { { circle = { radius = 2 } }, { square = '1.5' } } }",
  )?;
  let drawing: Drawing = Mapper::default().decode(&value).unwrap();
  assert_eq!(drawing.level, Level::High);
  assert_eq!(drawing.shapes, vec![Shape::Circle { radius: 2.0 }, Shape::Square(1.5)]);
  Ok(())
}

#[test]
fn tuples_decode_positionally() -> LuaResult<()> {
  #[derive(Debug, Deserialize)]
  struct Line {
    from: (i32, i32),
    to: (i32, i32),
  }

  let lua = Lua::new();
  let line: Line = Mapper::default()
    .decode(&eval(&lua, "{ from = { 1, 2 }, to = { '3', 4.0 } }")?)
    .unwrap();
  assert_eq!(line.from, (1, 2));
  assert_eq!(line.to, (3, 4));
  Ok(())
}

#[test]
fn generic_value_fields_capture_subtrees() -> LuaResult<()> {
  #[derive(Debug, Deserialize)]
  struct Plugin {
    name: String,
    settings: GenericValue,
  }

  let lua = Lua::new();
  let plugin: Plugin = Mapper::default()
    .decode(&eval(&lua, "{ name = 'fmt', settings = { line_width = 80, tabs = { 2, 4 } } }")?)
    .unwrap();
  assert_eq!(plugin.name, "fmt");
  let expected: GenericValue = [
    ("LineWidth", GenericValue::Int(80)),
    ("Tabs", GenericValue::Sequence(vec![GenericValue::Int(2), GenericValue::Int(4)])),
  ]
  .into_iter()
  .collect();
  assert_eq!(plugin.settings, expected);
  Ok(())
}

#[test]
fn mapper_serves_concurrent_decodes() {
  let mapper = Mapper::default();
  let tree: GenericValue = [
    ("Name", GenericValue::from("Michel")),
    ("Age", GenericValue::from("31")),
    ("W", GenericValue::from("San Jose")),
    ("X", GenericValue::Int(100)),
    (
      "Role",
      GenericValue::Sequence(vec![[("Name", "Administrator")].into_iter().collect()]),
    ),
  ]
  .into_iter()
  .collect();

  std::thread::scope(|scope| {
    let handles: Vec<_> = (0..4)
      .map(|_| scope.spawn(|| mapper.decode_value::<Person>(&tree)))
      .collect();
    for handle in handles {
      let person = handle.join().unwrap().unwrap();
      assert_eq!(person.age, 31);
      assert_eq!(person.role[0].name, "Administrator");
    }
  });
}
