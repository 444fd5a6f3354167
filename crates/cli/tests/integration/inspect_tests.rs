//! Inspect command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn inspect_prints_translated_keys() {
  let env = TestEnv::with_script("config = { work_place = 'San Jose', ports = { 80, 443 } }");

  let output = env
    .luamap_cmd()
    .args(["inspect", "script.lua", "config"])
    .output()
    .expect("Failed to run luamap");
  assert!(output.status.success());

  let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("stdout is not JSON");
  assert_eq!(json, serde_json::json!({ "WorkPlace": "San Jose", "Ports": [80, 443] }));
}

#[test]
fn inspect_suppresses_zero_values_on_request() {
  let env = TestEnv::with_script("config = { retries = 0, name = '', enabled = false, port = 8080 }");

  env
    .luamap_cmd()
    .args(["--suppress-zero", "inspect", "script.lua", "config"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"Port\": 8080"))
    .stdout(predicate::str::contains("Retries").not());

  env
    .luamap_cmd()
    .args(["inspect", "script.lua", "config"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"Retries\": 0"));
}

#[test]
fn inspect_strict_values_rejects_functions() {
  let env = TestEnv::with_script("config = { on_start = function() end }");

  env
    .luamap_cmd()
    .args(["--strict-values", "inspect", "script.lua", "config"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("cannot decode a lua function value"));

  env
    .luamap_cmd()
    .args(["inspect", "script.lua", "config"])
    .assert()
    .success()
    .stdout(predicate::str::contains("{}"));
}
