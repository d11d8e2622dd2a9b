//! Render command integration tests.

use predicates::prelude::*;

use super::common::TestEnv;

const PLATFORM: &str = r#"
compiler.path=/opt/avr/bin/
compiler.ar.cmd=avr-gcc-ar
compiler.ar.flags=rcs
recipe.ar.pattern="{compiler.path}{compiler.ar.cmd}" {compiler.ar.flags} "{archive_file_path}" "{object_file}"
"#;

#[test]
fn render_prints_expanded_command() {
  let env = TestEnv::with_properties(PLATFORM);

  env
    .render_cmd("recipe.ar.pattern")
    .args(["--set", "archive_file_path=/build/core a.a", "--set", "object_file=/build/x.o"])
    .assert()
    .success()
    .stdout(predicate::str::contains(
      r#"/opt/avr/bin/avr-gcc-ar rcs "/build/core a.a" /build/x.o"#,
    ));
}

#[test]
fn render_overrides_win_over_file() {
  let env = TestEnv::with_properties(PLATFORM);

  env
    .render_cmd("recipe.ar.pattern")
    .args(["--set", "compiler.ar.flags=rc", "--set", "archive_file_path=a", "--set", "object_file=b"])
    .assert()
    .success()
    .stdout(predicate::str::contains("avr-gcc-ar rc a b"));
}

#[test]
fn render_json_output() {
  let env = TestEnv::with_properties(PLATFORM);

  let output = env
    .render_cmd("recipe.ar.pattern")
    .args(["--output", "json", "--set", "archive_file_path=a", "--set", "object_file=b"])
    .output()
    .unwrap();

  assert!(output.status.success());
  let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(json["program"], "/opt/avr/bin/avr-gcc-ar");
  assert_eq!(json["args"], serde_json::json!(["rcs", "a", "b"]));
}

#[test]
fn render_unresolved_property_fails() {
  let env = TestEnv::with_properties(PLATFORM);

  env
    .render_cmd("recipe.ar.pattern")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unresolved property: archive_file_path"));
}
