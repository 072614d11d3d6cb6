use predicates::prelude::*;

use super::common::TestEnv;

#[test]
fn dump_lists_entries_with_names() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "overlay.json");
  let idmap_path = env.create(&overlay, "overlay");

  env
    .idmap_cmd()
    .arg("dump")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("0x7f020003 -> 0x7f020000 string/str1"))
    .stdout(predicate::str::contains("0x7f010001 -> integer 0x00000007 integer/int2"))
    .stdout(predicate::str::contains(env.target_path().to_str().unwrap()));
}

#[test]
fn dump_verbose_shows_offsets() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "overlay.json");
  let idmap_path = env.create(&overlay, "overlay");

  env
    .idmap_cmd()
    .arg("dump")
    .arg("--verbose")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("00000000: 504d4449  magic"))
    .stdout(predicate::str::contains("00000004: 00000001  version"))
    .stdout(predicate::str::contains("00000220: 00000001  data block count"));
}

#[test]
fn dump_without_target_still_succeeds() {
  let env = TestEnv::new();
  let overlay = env.add_overlay("overlay", "overlay.json");
  let idmap_path = env.create(&overlay, "overlay");
  std::fs::remove_file(env.target_path()).unwrap();

  env
    .idmap_cmd()
    .arg("dump")
    .arg("--idmap-path")
    .arg(&idmap_path)
    .assert()
    .success()
    .stdout(predicate::str::contains("0x7f020003 -> 0x7f020000"))
    .stderr(predicate::str::is_empty());
}

#[test]
fn dump_of_corrupt_file_fails_with_decode_error() {
  let env = TestEnv::new();
  let path = env.write_file("out/bad.idmap", "definitely not an idmap");

  env
    .idmap_cmd()
    .arg("dump")
    .arg("--idmap-path")
    .arg(&path)
    .assert()
    .code(5)
    .stdout(predicate::str::is_empty());
}
