//! Value types of a resource table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::config::Configuration;

/// A 32-bit resource identifier in `0xPPTTEEEE` form.
///
/// `PP` is the package id, `TT` the type id and `EEEE` the entry index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResId(pub u32);

impl ResId {
  pub fn package_id(self) -> u8 {
    (self.0 >> 24) as u8
  }

  pub fn type_id(self) -> u8 {
    (self.0 >> 16) as u8
  }

  pub fn entry_id(self) -> u16 {
    self.0 as u16
  }
}

impl fmt::Display for ResId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "0x{:08x}", self.0)
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid resource id '{0}': expected 0x-prefixed hex or a decimal number")]
pub struct ParseResIdError(pub String);

impl FromStr for ResId {
  type Err = ParseResIdError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let parsed = match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
      Some(hex) => u32::from_str_radix(hex, 16),
      None => trimmed.parse::<u32>(),
    };
    parsed.map(ResId).map_err(|_| ParseResIdError(s.to_string()))
  }
}

impl Serialize for ResId {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for ResId {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
      Number(u32),
      Text(String),
    }

    match Repr::deserialize(deserializer)? {
      Repr::Number(n) => Ok(ResId(n)),
      Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
  }
}

/// Kind tag of a literal value stored inline in an idmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum DataType {
  Reference = 1,
  Integer = 2,
  Boolean = 3,
  Color = 4,
}

impl DataType {
  pub fn from_byte(byte: u8) -> Option<Self> {
    match byte {
      1 => Some(DataType::Reference),
      2 => Some(DataType::Integer),
      3 => Some(DataType::Boolean),
      4 => Some(DataType::Color),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      DataType::Reference => "reference",
      DataType::Integer => "integer",
      DataType::Boolean => "boolean",
      DataType::Color => "color",
    }
  }
}

/// A resource value as declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
  String(String),
  Integer(i32),
  Boolean(bool),
  Color(u32),
  Reference(ResId),
}

impl Value {
  /// Encode as an inline `(type, data)` pair.
  ///
  /// Strings have no fixed-width form and return `None`.
  pub fn to_inline(&self) -> Option<(DataType, u32)> {
    match self {
      Value::String(_) => None,
      Value::Integer(n) => Some((DataType::Integer, *n as u32)),
      Value::Boolean(b) => Some((DataType::Boolean, u32::from(*b))),
      Value::Color(argb) => Some((DataType::Color, *argb)),
      Value::Reference(id) => Some((DataType::Reference, id.0)),
    }
  }

  pub fn from_inline(data_type: DataType, data: u32) -> Self {
    match data_type {
      DataType::Reference => Value::Reference(ResId(data)),
      DataType::Integer => Value::Integer(data as i32),
      DataType::Boolean => Value::Boolean(data != 0),
      DataType::Color => Value::Color(data),
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::String(s) => write!(f, "{}", s),
      Value::Integer(n) => write!(f, "{}", n),
      Value::Boolean(b) => write!(f, "{}", b),
      Value::Color(argb) => write!(f, "#{:08x}", argb),
      Value::Reference(id) => write!(f, "@{}", id),
    }
  }
}

/// One configuration-specific value of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigValue {
  #[serde(default)]
  pub config: Configuration,
  pub value: Value,
}

/// A single resource declared by a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
  pub id: ResId,
  #[serde(rename = "type")]
  pub type_name: String,
  pub name: String,
  /// Policy bits an overlay must hold to replace this resource; `0` means none.
  #[serde(default)]
  pub policies: u32,
  #[serde(default)]
  pub values: Vec<ConfigValue>,
}

impl ResourceEntry {
  /// The `type/name` label of this entry.
  pub fn label(&self) -> String {
    format!("{}/{}", self.type_name, self.name)
  }
}

/// A literal value an overlay supplies for a target resource by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineMapping {
  /// Target resource in `type/name` form.
  pub resource: String,
  pub value: Value,
}

impl InlineMapping {
  /// Split `resource` into `(type, name)`.
  pub fn key(&self) -> Option<(&str, &str)> {
    self.resource.split_once('/')
  }
}

/// Overlay declaration carried by overlay packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayInfo {
  pub target_package: String,
  /// Policy bits this overlay is trusted with.
  #[serde(default)]
  pub policies: u32,
  #[serde(default)]
  pub inline: Vec<InlineMapping>,
}

impl OverlayInfo {
  /// Check whether this overlay may replace a resource requiring `required`.
  ///
  /// Returns the policy bits exercised by the replacement, or `None` when the
  /// overlay is not allowed to touch the resource. A resource without
  /// required bits accepts any overlay and exercises nothing.
  pub fn check_policy(&self, required: u32) -> Option<u32> {
    if required == 0 {
      return Some(0);
    }
    let exercised = self.policies & required;
    if exercised != 0 { Some(exercised) } else { None }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resid_parses_hex_and_decimal() {
    assert_eq!("0x7f020003".parse::<ResId>().unwrap(), ResId(0x7f020003));
    assert_eq!("0X7F020003".parse::<ResId>().unwrap(), ResId(0x7f020003));
    assert_eq!("2130837507".parse::<ResId>().unwrap(), ResId(0x7f020003));
    assert!("0xzz".parse::<ResId>().is_err());
    assert!("string/str1".parse::<ResId>().is_err());
  }

  #[test]
  fn resid_components() {
    let id = ResId(0x7f020003);
    assert_eq!(id.package_id(), 0x7f);
    assert_eq!(id.type_id(), 0x02);
    assert_eq!(id.entry_id(), 0x0003);
    assert_eq!(id.to_string(), "0x7f020003");
  }

  #[test]
  fn resid_deserializes_from_string_or_number() {
    let from_str: ResId = serde_json::from_str("\"0x7f010000\"").unwrap();
    let from_num: ResId = serde_json::from_str("2130771968").unwrap();
    assert_eq!(from_str, from_num);
  }

  #[test]
  fn inline_values_round_trip_through_data_words() {
    for value in [
      Value::Integer(-5),
      Value::Boolean(true),
      Value::Color(0xff00ff00),
      Value::Reference(ResId(0x7f010002)),
    ] {
      let (data_type, data) = value.to_inline().unwrap();
      assert_eq!(Value::from_inline(data_type, data), value);
    }
    assert!(Value::String("x".to_string()).to_inline().is_none());
  }

  #[test]
  fn value_display() {
    assert_eq!(Value::String("overlay-1".to_string()).to_string(), "overlay-1");
    assert_eq!(Value::Color(0xff112233).to_string(), "#ff112233");
    assert_eq!(Value::Reference(ResId(0x7f010000)).to_string(), "@0x7f010000");
  }

  #[test]
  fn policy_check_without_requirements_exercises_nothing() {
    let overlay = OverlayInfo {
      target_package: "test.target".to_string(),
      policies: 0,
      inline: Vec::new(),
    };
    assert_eq!(overlay.check_policy(0), Some(0));
    assert_eq!(overlay.check_policy(0b10), None);
  }

  #[test]
  fn policy_check_reports_intersection() {
    let overlay = OverlayInfo {
      target_package: "test.target".to_string(),
      policies: 0b0110,
      inline: Vec::new(),
    };
    assert_eq!(overlay.check_policy(0b0011), Some(0b0010));
    assert_eq!(overlay.check_policy(0b1000), None);
  }
}
