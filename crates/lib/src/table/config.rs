//! Runtime configurations and value ranking.
//!
//! A configuration is written as a dash-separated qualifier string such as
//! `sv`, `sv-rSE` or `sv-rSE-hdpi`. Qualifiers must appear in the order
//! language, region, density. The empty string is the default configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::ConfigValue;

/// Named screen densities and their dots-per-inch.
const DENSITIES: &[(&str, u16)] = &[
  ("ldpi", 120),
  ("mdpi", 160),
  ("tvdpi", 213),
  ("hdpi", 240),
  ("xhdpi", 320),
  ("xxhdpi", 480),
  ("xxxhdpi", 640),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("unknown configuration qualifier '{0}'")]
  Unknown(String),

  #[error("configuration qualifier '{qualifier}' is out of order in '{config}'")]
  OutOfOrder { qualifier: String, config: String },

  #[error("region qualifier '{0}' requires a language")]
  RegionWithoutLanguage(String),
}

/// A set of qualifiers selecting among value variants of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Configuration {
  pub language: Option<String>,
  pub region: Option<String>,
  pub density: Option<u16>,
}

impl Configuration {
  pub fn is_default(&self) -> bool {
    self.language.is_none() && self.region.is_none() && self.density.is_none()
  }

  /// Whether a value declared for `self` may be used under `requested`.
  ///
  /// Locale qualifiers must match exactly when set. Density never excludes a
  /// value; it only affects ranking.
  pub fn is_compatible_with(&self, requested: &Configuration) -> bool {
    if self.language.is_some() && self.language != requested.language {
      return false;
    }
    if self.region.is_some() && self.region != requested.region {
      return false;
    }
    true
  }

  fn rank(&self, requested: &Configuration) -> (bool, bool, (u8, i32)) {
    (
      self.language.is_some(),
      self.region.is_some(),
      density_rank(self.density, requested.density),
    )
  }
}

fn density_rank(candidate: Option<u16>, requested: Option<u16>) -> (u8, i32) {
  match (candidate, requested) {
    (None, None) => (2, 0),
    // Without a requested density, prefer values closest to mdpi.
    (Some(d), None) => (1, -(i32::from(d) - 160).abs()),
    (Some(d), Some(r)) if d == r => (3, 0),
    (Some(d), Some(r)) if d > r => (2, -i32::from(d)),
    (Some(d), Some(_)) => (1, i32::from(d)),
    (None, Some(_)) => (0, 0),
  }
}

/// Pick the best value for `requested` among a resource's variants.
///
/// Returns `None` when no variant is compatible with the configuration.
pub fn best_match<'a>(values: &'a [ConfigValue], requested: &Configuration) -> Option<&'a ConfigValue> {
  values
    .iter()
    .filter(|candidate| candidate.config.is_compatible_with(requested))
    .max_by_key(|candidate| candidate.config.rank(requested))
}

fn parse_density(qualifier: &str) -> Option<u16> {
  if let Some((_, dpi)) = DENSITIES.iter().find(|(name, _)| *name == qualifier) {
    return Some(*dpi);
  }
  qualifier
    .strip_suffix("dpi")
    .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
    .and_then(|digits| digits.parse().ok())
}

fn is_language(qualifier: &str) -> bool {
  (2..=3).contains(&qualifier.len()) && qualifier.bytes().all(|b| b.is_ascii_lowercase())
}

fn parse_region(qualifier: &str) -> Option<&str> {
  qualifier
    .strip_prefix('r')
    .filter(|code| code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase()))
}

impl FromStr for Configuration {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut config = Configuration::default();
    if s.is_empty() {
      return Ok(config);
    }

    // 0 = language, 1 = region, 2 = density
    let mut next_slot = 0;
    for qualifier in s.split('-') {
      let slot = if parse_density(qualifier).is_some() {
        config.density = parse_density(qualifier);
        2
      } else if let Some(region) = parse_region(qualifier) {
        if config.language.is_none() {
          return Err(ConfigError::RegionWithoutLanguage(qualifier.to_string()));
        }
        config.region = Some(region.to_string());
        1
      } else if is_language(qualifier) {
        config.language = Some(qualifier.to_string());
        0
      } else {
        return Err(ConfigError::Unknown(qualifier.to_string()));
      };

      if slot < next_slot {
        return Err(ConfigError::OutOfOrder {
          qualifier: qualifier.to_string(),
          config: s.to_string(),
        });
      }
      next_slot = slot + 1;
    }

    Ok(config)
  }
}

impl TryFrom<String> for Configuration {
  type Error = ConfigError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    value.parse()
  }
}

impl From<Configuration> for String {
  fn from(config: Configuration) -> Self {
    config.to_string()
  }
}

impl fmt::Display for Configuration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut parts: Vec<String> = Vec::new();
    if let Some(language) = &self.language {
      parts.push(language.clone());
    }
    if let Some(region) = &self.region {
      parts.push(format!("r{}", region));
    }
    if let Some(dpi) = self.density {
      match DENSITIES.iter().find(|(_, d)| *d == dpi) {
        Some((name, _)) => parts.push((*name).to_string()),
        None => parts.push(format!("{}dpi", dpi)),
      }
    }
    write!(f, "{}", parts.join("-"))
  }
}
