//! Archive command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

#[cfg(unix)]
use super::common::APPEND_PLATFORM;

#[test]
#[cfg(unix)]
fn archive_builds_from_objects() {
  let env = TestEnv::with_properties(APPEND_PLATFORM);
  let a = env.write_object("a.o", "A\n");
  let b = env.write_object("b.o", "B\n");

  env
    .archive_cmd("core.a")
    .arg(&a)
    .arg(&b)
    .assert()
    .success()
    .stdout(predicate::str::contains("Archived 2 object file(s)"));

  assert_eq!(env.read_build_file("core.a"), "A\nB\n");
}

#[test]
#[cfg(unix)]
fn archive_is_cached_on_second_run() {
  let env = TestEnv::with_properties(APPEND_PLATFORM);
  let a = env.write_object("a.o", "A\n");

  env.archive_cmd("core.a").arg(&a).assert().success();

  env
    .archive_cmd("core.a")
    .arg(&a)
    .assert()
    .success()
    .stdout(predicate::str::contains("Archive up to date"));

  assert_eq!(env.read_build_file("core.a"), "A\n");
}

#[test]
#[cfg(unix)]
fn archive_json_output() {
  let env = TestEnv::with_properties(APPEND_PLATFORM);
  let a = env.write_object("a.o", "A\n");

  let output = env
    .archive_cmd("core.a")
    .args(["--output", "json"])
    .arg(&a)
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["status"], "rebuilt");
  assert_eq!(json["objects"], 1);
  assert_eq!(
    json["path"].as_str().unwrap(),
    env.build_path().join("core.a").to_string_lossy()
  );
}

#[test]
#[cfg(unix)]
fn archive_tool_failure_exits_nonzero() {
  let env = TestEnv::with_properties(APPEND_PLATFORM);
  let missing = env.build_path().join("missing.o");

  env
    .archive_cmd("core.a")
    .arg(&missing)
    .assert()
    .failure()
    .stderr(predicate::str::contains("failed to archive"));
}

#[test]
fn archive_only_compilation_database_skips() {
  let env = TestEnv::with_properties("");

  env
    .archive_cmd("core.a")
    .arg("--only-compilation-database")
    .arg("a.o")
    .assert()
    .success()
    .stdout(predicate::str::contains("Skipped archive creation"));

  assert!(!env.build_path().join("core.a").exists());
}

#[test]
fn archive_missing_recipe_fails() {
  let env = TestEnv::with_properties("compiler.path=/usr/bin/\n");

  env
    .archive_cmd("core.a")
    .arg("a.o")
    .assert()
    .failure()
    .stderr(predicate::str::contains("recipe 'recipe.ar.pattern' is missing or empty"));
}

#[test]
fn archive_custom_recipe_name() {
  let env = TestEnv::with_properties("recipe.custom={missing.tool} {object_file}\n");

  env
    .archive_cmd("core.a")
    .args(["--recipe", "recipe.custom"])
    .arg("a.o")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unresolved property: missing.tool"));
}
