//! Resolving target resources through a persisted idmap.
//!
//! A reference names a target resource either by raw id or as
//! `package:type/name`. Inline value entries answer directly; redirects are
//! followed into the overlay package, where the value best suited to the
//! requested configuration is selected.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::idmap::Idmap;
use crate::table::{Configuration, LoadError, ResId, TableProvider, Value};

#[derive(Debug, Error)]
pub enum LookupError {
  #[error("resource {id} is not overlaid by this idmap")]
  NotFound { id: ResId },

  #[error("cannot resolve '{reference}': {reason}")]
  Unresolvable { reference: String, reason: String },

  #[error("overlay resource {overlay_id} has no value for configuration '{config}'")]
  NoValue { overlay_id: ResId, config: String },

  #[error(transparent)]
  Load(#[from] LoadError),
}

/// A target resource given by id or by qualified name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
  Id(ResId),
  Name {
    package: Option<String>,
    type_name: String,
    name: String,
  },
}

impl FromStr for ResourceRef {
  type Err = LookupError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let unresolvable = |reason: &str| LookupError::Unresolvable {
      reference: s.to_string(),
      reason: reason.to_string(),
    };

    let qualified = s.contains([':', '/']);
    if !qualified && s.starts_with(|c: char| c.is_ascii_digit()) {
      return s
        .parse::<ResId>()
        .map(ResourceRef::Id)
        .map_err(|e| unresolvable(&e.to_string()));
    }

    let (package, rest) = match s.split_once(':') {
      Some((package, rest)) if !package.is_empty() => (Some(package.to_string()), rest),
      Some(_) => return Err(unresolvable("empty package name")),
      None => (None, s),
    };
    match rest.split_once('/') {
      Some((type_name, name)) if !type_name.is_empty() && !name.is_empty() && !name.contains('/') => {
        Ok(ResourceRef::Name {
          package,
          type_name: type_name.to_string(),
          name: name.to_string(),
        })
      }
      _ => Err(unresolvable("expected a resource id or package:type/name")),
    }
  }
}

impl fmt::Display for ResourceRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ResourceRef::Id(id) => write!(f, "{}", id),
      ResourceRef::Name {
        package: Some(package),
        type_name,
        name,
      } => write!(f, "{}:{}/{}", package, type_name, name),
      ResourceRef::Name {
        package: None,
        type_name,
        name,
      } => write!(f, "{}/{}", type_name, name),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
  pub target_id: ResId,
  /// Overlay resource the value came from; `None` for inline values.
  pub overlay_id: Option<ResId>,
  /// Configuration of the selected variant.
  pub config: Configuration,
  pub value: Value,
}

/// Resolve `reference` through `idmap` for `config`.
pub fn lookup(
  provider: &dyn TableProvider,
  idmap: &Idmap,
  reference: &ResourceRef,
  config: &Configuration,
) -> Result<LookupResult, LookupError> {
  let target_id = resolve_target(provider, idmap, reference)?;

  for block in idmap.data() {
    if let Some(value) = block.find_value(target_id) {
      debug!(target = %target_id, "inline value");
      return Ok(LookupResult {
        target_id,
        overlay_id: None,
        config: Configuration::default(),
        value: value.value(),
      });
    }
  }

  let overlay_id = idmap
    .data()
    .iter()
    .find_map(|block| block.find_entry(target_id))
    .map(|entry| entry.overlay_id)
    .ok_or(LookupError::NotFound { id: target_id })?;

  let overlay = provider.load(Path::new(&idmap.header().overlay_path))?;
  let chosen = overlay
    .best_value(overlay_id, config)
    .ok_or_else(|| LookupError::NoValue {
      overlay_id,
      config: config.to_string(),
    })?;

  debug!(
    target = %target_id,
    overlay = %overlay_id,
    config = %chosen.config,
    "resolved value"
  );
  Ok(LookupResult {
    target_id,
    overlay_id: Some(overlay_id),
    config: chosen.config.clone(),
    value: chosen.value.clone(),
  })
}

fn resolve_target(provider: &dyn TableProvider, idmap: &Idmap, reference: &ResourceRef) -> Result<ResId, LookupError> {
  let (package, type_name, name) = match reference {
    ResourceRef::Id(id) => return Ok(*id),
    ResourceRef::Name {
      package,
      type_name,
      name,
    } => (package, type_name, name),
  };

  let target = provider.load(Path::new(&idmap.header().target_path))?;
  if package.as_deref().is_some_and(|p| p != target.package_name()) {
    return Err(LookupError::Unresolvable {
      reference: reference.to_string(),
      reason: format!("idmap targets package '{}'", target.package_name()),
    });
  }

  target
    .resolve(type_name, name)
    .ok_or_else(|| LookupError::Unresolvable {
      reference: reference.to_string(),
      reason: format!("no such resource in '{}'", target.package_name()),
    })
}
