use predicates::prelude::*;

use super::common::TestEnv;

/// overlay/overlay-static-1.json, overlay/overlay-static-2.json and a
/// non-matching overlay/other.json.
fn setup() -> TestEnv {
  let env = TestEnv::new();
  env.add_overlay("overlay", "overlay-static-1.json");
  env.add_overlay("overlay", "overlay-static-2.json");
  env.add_overlay("overlay", "other.json");
  env
}

fn scan_cmd(env: &TestEnv) -> assert_cmd::Command {
  let mut cmd = env.idmap_cmd();
  cmd
    .arg("scan")
    .args(["--target-package-name", "test.target"])
    .arg("--target-path")
    .arg(env.target_path())
    .arg("--output-directory")
    .arg(env.dir("out"));
  cmd
}

fn stdout_lines(output: &std::process::Output) -> Vec<String> {
  String::from_utf8(output.stdout.clone())
    .unwrap()
    .lines()
    .map(str::to_string)
    .collect()
}

#[test]
fn scan_prints_two_sorted_paths() {
  let env = setup();

  let output = scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success()
    .stderr(predicate::str::is_empty())
    .get_output()
    .clone();

  let lines = stdout_lines(&output);
  assert_eq!(lines.len(), 2);
  assert!(lines[0].contains("overlay-static-1-"));
  assert!(lines[1].contains("overlay-static-2-"));
  for line in &lines {
    assert!(line.starts_with(env.dir("out").to_str().unwrap()));
    assert!(std::path::Path::new(line).exists());
  }
}

#[test]
fn scan_with_repeated_directory_prints_each_path_once() {
  let env = setup();

  let once = scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success()
    .get_output()
    .clone();
  let twice = scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success()
    .get_output()
    .clone();

  assert_eq!(stdout_lines(&once), stdout_lines(&twice));
}

#[test]
fn scan_of_empty_directory_prints_nothing() {
  let env = setup();

  scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("empty"))
    .assert()
    .success()
    .stdout(predicate::str::is_empty());
}

#[test]
fn scan_recursive_descends() {
  let env = TestEnv::new();
  env.add_overlay("overlay/nested", "overlay-static-1.json");

  scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .arg("--recursive")
    .assert()
    .success()
    .stdout(predicate::str::contains("overlay-static-1-"));
}

#[test]
fn scan_defaults_to_cache_directory() {
  let env = setup();

  env
    .idmap_cmd()
    .arg("scan")
    .args(["--target-package-name", "test.target"])
    .arg("--target-path")
    .arg(env.target_path())
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success()
    .stdout(predicate::str::contains(env.cache_path().to_str().unwrap()));
}

#[test]
fn scan_json_reports_outcomes() {
  let env = setup();
  scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success();

  scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .args(["-o", "json"])
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""outcome": "fresh""#))
    .stdout(predicate::str::contains(r#""failures": []"#));
}

#[test]
fn scan_rebuilds_corrupt_idmap_quietly() {
  let env = setup();
  let first = scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success()
    .get_output()
    .clone();
  let lines = stdout_lines(&first);
  std::fs::write(&lines[0], "junk").unwrap();

  let second = scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .success()
    .stderr(predicate::str::is_empty())
    .get_output()
    .clone();

  assert_eq!(stdout_lines(&second), lines);
  assert!(std::fs::read(&lines[0]).unwrap().starts_with(&[0x49, 0x44, 0x4d, 0x50]));
}

#[test]
fn scan_reports_failed_overlays() {
  let env = setup();
  env.add_overlay("overlay", "empty.json");

  scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.dir("overlay"))
    .assert()
    .code(4)
    .stdout(predicate::str::contains("overlay-static-1-"))
    .stderr(predicate::str::contains("empty.json"))
    .stderr(predicate::str::contains("\u{1b}[").not());
}

#[test]
fn scan_of_missing_directory_fails() {
  let env = setup();

  scan_cmd(&env)
    .arg("--input-directory")
    .arg(env.temp.path().join("missing"))
    .assert()
    .failure();
}
