use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn create_writes_idmap() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "overlay.json");
  let idmap_path = env.dir("out").join("overlay.idmap");

  env
    .idmap_cmd()
    .arg("create")
    .arg("--target-path")
    .arg(env.target_path())
    .arg("--overlay-path")
    .arg(&overlay)
    .arg("--idmap-path")
    .arg(&idmap_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("Wrote"))
    .stderr(predicate::str::is_empty());

  let bytes = std::fs::read(&idmap_path).unwrap();
  assert_eq!(&bytes[..4], b"IDMP");
}

#[test]
fn create_with_missing_target_fails_with_load_error() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "overlay.json");
  let idmap_path = env.dir("out").join("overlay.idmap");

  env
    .idmap_cmd()
    .arg("create")
    .arg("--target-path")
    .arg(env.temp.path().join("DOES-NOT-EXIST.json"))
    .arg("--overlay-path")
    .arg(&overlay)
    .arg("--idmap-path")
    .arg(&idmap_path)
    .assert()
    .code(2)
    .stderr(predicate::str::contains("DOES-NOT-EXIST"));

  assert!(!idmap_path.exists());
}

#[test]
fn create_with_other_target_fails_with_package_mismatch() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "other.json");

  env
    .idmap_cmd()
    .arg("create")
    .arg("--target-path")
    .arg(env.target_path())
    .arg("--overlay-path")
    .arg(&overlay)
    .arg("--idmap-path")
    .arg(env.dir("out").join("other.idmap"))
    .assert()
    .code(3)
    .stderr(predicate::str::contains("other.target"));
}

#[test]
fn create_with_nothing_matching_fails_with_no_match() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "empty.json");

  env
    .idmap_cmd()
    .arg("create")
    .arg("--target-path")
    .arg(env.target_path())
    .arg("--overlay-path")
    .arg(&overlay)
    .arg("--idmap-path")
    .arg(env.dir("out").join("empty.idmap"))
    .assert()
    .code(4);
}

#[test]
fn create_into_missing_directory_fails_with_write_error() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "overlay.json");

  env
    .idmap_cmd()
    .arg("create")
    .arg("--target-path")
    .arg(env.target_path())
    .arg("--overlay-path")
    .arg(&overlay)
    .arg("--idmap-path")
    .arg(env.temp.path().join("missing").join("overlay.idmap"))
    .assert()
    .code(6);
}
