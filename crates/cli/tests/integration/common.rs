//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Isolated test environment.
///
/// Each test gets its own temporary directory holding copies of the target
/// package and whichever overlays the test adds, plus an isolated cache.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  /// Create an environment containing `target/target.json`.
  pub fn new() -> Self {
    let env = Self {
      temp: TempDir::new().unwrap(),
    };
    env.write_file("target/target.json", &fixture_content("target/target.json"));
    env
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    dunce::canonicalize(&path).unwrap()
  }

  /// Copy the overlay fixture `name` into `relative_dir`, returning its canonical path.
  pub fn add_overlay(&self, relative_dir: &str, name: &str) -> PathBuf {
    let content = fixture_content(&format!("overlay/{}", name));
    self.write_file(&format!("{}/{}", relative_dir, name), &content)
  }

  /// Canonical path of a directory under the temp root, created if missing.
  pub fn dir(&self, relative_path: &str) -> PathBuf {
    let p = self.temp.path().join(relative_path);
    std::fs::create_dir_all(&p).unwrap();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  pub fn target_path(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path().join("target/target.json")).unwrap()
  }

  /// Cache path used as the default idmap directory.
  pub fn cache_path(&self) -> PathBuf {
    self.dir("cache")
  }

  /// Get a pre-configured Command for the idmap binary.
  ///
  /// Sets environment variables for isolated testing:
  /// - `IDMAP_CACHE_DIR`: Isolated default output directory
  /// - `RUST_LOG`: Cleared so log output does not depend on the caller
  pub fn idmap_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("idmap");
    cmd.env("IDMAP_CACHE_DIR", self.cache_path());
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// Run `idmap create` for `overlay`, writing to `out/<name>.idmap`.
  pub fn create(&self, overlay: &Path, name: &str) -> PathBuf {
    let idmap_path = self.dir("out").join(format!("{}.idmap", name));
    self
      .idmap_cmd()
      .arg("create")
      .arg("--target-path")
      .arg(self.target_path())
      .arg("--overlay-path")
      .arg(overlay)
      .arg("--idmap-path")
      .arg(&idmap_path)
      .assert()
      .success();
    idmap_path
  }
}
