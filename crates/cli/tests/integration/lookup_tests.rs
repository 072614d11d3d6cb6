use predicates::prelude::*;

use super::common::TestEnv;

fn setup() -> (TestEnv, std::path::PathBuf) {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "overlay.json");
  let idmap_path = env.create(&overlay, "overlay");
  (env, idmap_path)
}

#[test]
fn lookup_default_configuration() {
  let (env, idmap_path) = setup();

  env
    .idmap_cmd()
    .arg("lookup")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .args(["--resid", "0x7f020003"])
    .assert()
    .success()
    .stdout("overlay-1\n");
}

#[test]
fn lookup_with_configuration() {
  let (env, idmap_path) = setup();

  env
    .idmap_cmd()
    .arg("lookup")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .args(["--resid", "0x7f020003", "--config", "sv"])
    .assert()
    .success()
    .stdout("overlay-1-sv\n");
}

#[test]
fn lookup_by_qualified_name() {
  let (env, idmap_path) = setup();

  env
    .idmap_cmd()
    .arg("lookup")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .args(["--resid", "test.target:integer/int2"])
    .assert()
    .success()
    .stdout("7\n");
}

#[test]
fn lookup_json_output() {
  let (env, idmap_path) = setup();

  env
    .idmap_cmd()
    .arg("lookup")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .args(["--resid", "0x7f020003", "--config", "sv", "-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""overlay_id": "0x7f020000""#))
    .stdout(predicate::str::contains(r#""config": "sv""#))
    .stdout(predicate::str::contains("overlay-1-sv"));
}

#[test]
fn lookup_unmapped_resource_fails_with_not_found() {
  let (env, idmap_path) = setup();

  env
    .idmap_cmd()
    .arg("lookup")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .args(["--resid", "0x7f020004"])
    .assert()
    .code(7)
    .stdout(predicate::str::is_empty());
}

#[test]
fn lookup_unknown_name_fails_with_unresolvable() {
  let (env, idmap_path) = setup();

  env
    .idmap_cmd()
    .arg("lookup")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .args(["--resid", "test.target:string/nope"])
    .assert()
    .code(8);
}

#[test]
fn lookup_with_bad_configuration_fails() {
  let (env, idmap_path) = setup();

  env
    .idmap_cmd()
    .arg("lookup")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .args(["--resid", "0x7f020003", "--config", "not-a-config"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Invalid configuration"));
}
