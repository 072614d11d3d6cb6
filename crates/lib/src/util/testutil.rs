//! Test utilities for idmap-lib.
//!
//! Provides an in-memory target/overlay pair and matching JSON package
//! descriptions for tests that go through the manifest provider.

use std::fs;
use std::path::{Path, PathBuf};

use crate::table::{ConfigValue, InlineMapping, OverlayInfo, ResId, ResourceEntry, ResourceTable, Value};

/// Policy bit required by `string/str3` and `string/str4` in the target.
pub const POLICY_A: u32 = 0b01;
pub const POLICY_B: u32 = 0b10;

pub fn entry(id: u32, type_name: &str, name: &str, policies: u32, values: Vec<ConfigValue>) -> ResourceEntry {
  ResourceEntry {
    id: ResId(id),
    type_name: type_name.to_string(),
    name: name.to_string(),
    policies,
    values,
  }
}

/// A `string` resource with `(config, text)` variants.
pub fn string_entry(id: u32, name: &str, variants: &[(&str, &str)]) -> ResourceEntry {
  let values = variants
    .iter()
    .map(|(config, text)| ConfigValue {
      config: config.parse().unwrap(),
      value: Value::String(text.to_string()),
    })
    .collect();
  entry(id, "string", name, 0, values)
}

pub fn int_entry(id: u32, name: &str, value: i32) -> ResourceEntry {
  entry(
    id,
    "integer",
    name,
    0,
    vec![ConfigValue {
      config: Default::default(),
      value: Value::Integer(value),
    }],
  )
}

pub fn target_table() -> ResourceTable {
  let mut str3 = string_entry(0x7f020005, "str3", &[("", "target-3")]);
  str3.policies = POLICY_A;
  let mut str4 = string_entry(0x7f020006, "str4", &[("", "target-4")]);
  str4.policies = POLICY_B;

  ResourceTable::new(
    "test.target",
    0x1111_1111,
    None,
    vec![
      int_entry(0x7f010000, "int1", 1),
      int_entry(0x7f010001, "int2", 2),
      string_entry(0x7f020003, "str1", &[("", "target-1")]),
      string_entry(0x7f020004, "str2", &[("", "target-2")]),
      str3,
      str4,
    ],
  )
  .unwrap()
}

pub fn overlay_info(target_package: &str) -> OverlayInfo {
  OverlayInfo {
    target_package: target_package.to_string(),
    policies: POLICY_A,
    inline: vec![InlineMapping {
      resource: "integer/int2".to_string(),
      value: Value::Integer(7),
    }],
  }
}

pub fn overlay_table() -> ResourceTable {
  ResourceTable::new(
    "test.overlay",
    0x2222_2222,
    Some(overlay_info("test.target")),
    vec![
      int_entry(0x7f010000, "int1", 42),
      string_entry(0x7f020000, "str1", &[("", "overlay-1"), ("sv", "overlay-1-sv")]),
      string_entry(0x7f020001, "str3", &[("", "overlay-3")]),
      string_entry(0x7f020002, "str4", &[("", "overlay-4")]),
    ],
  )
  .unwrap()
}

/// JSON description equivalent to [`target_table`].
pub const TARGET_JSON: &str = r#"{
  "package": "test.target",
  "resources": [
    { "id": "0x7f010000", "type": "integer", "name": "int1", "values": [ { "value": { "integer": 1 } } ] },
    { "id": "0x7f010001", "type": "integer", "name": "int2", "values": [ { "value": { "integer": 2 } } ] },
    { "id": "0x7f020003", "type": "string", "name": "str1", "values": [ { "value": { "string": "target-1" } } ] },
    { "id": "0x7f020004", "type": "string", "name": "str2", "values": [ { "value": { "string": "target-2" } } ] },
    { "id": "0x7f020005", "type": "string", "name": "str3", "policies": 1, "values": [ { "value": { "string": "target-3" } } ] },
    { "id": "0x7f020006", "type": "string", "name": "str4", "policies": 2, "values": [ { "value": { "string": "target-4" } } ] }
  ]
}"#;

/// JSON description of an overlay of `test.target` named `package`.
pub fn overlay_json(package: &str, target_package: &str) -> String {
  format!(
    r#"{{
  "package": "{package}",
  "overlay": {{
    "target_package": "{target_package}",
    "policies": 1,
    "inline": [ {{ "resource": "integer/int2", "value": {{ "integer": 7 }} }} ]
  }},
  "resources": [
    {{ "id": "0x7f010000", "type": "integer", "name": "int1", "values": [ {{ "value": {{ "integer": 42 }} }} ] }},
    {{ "id": "0x7f020000", "type": "string", "name": "str1", "values": [
      {{ "config": "", "value": {{ "string": "overlay-1" }} }},
      {{ "config": "sv", "value": {{ "string": "overlay-1-sv" }} }}
    ] }},
    {{ "id": "0x7f020001", "type": "string", "name": "str3", "values": [ {{ "value": {{ "string": "overlay-3" }} }} ] }},
    {{ "id": "0x7f020002", "type": "string", "name": "str4", "values": [ {{ "value": {{ "string": "overlay-4" }} }} ] }}
  ]
}}"#
  )
}

/// Write a package description into `dir`, creating parents as needed.
pub fn write_package(dir: &Path, relative: &str, content: &str) -> PathBuf {
  let path = dir.join(relative);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(&path, content).unwrap();
  path
}
