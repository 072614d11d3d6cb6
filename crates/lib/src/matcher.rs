//! Matching of target resources to overlay resources by name.
//!
//! Every target resource is looked up by `(type, name)` among the overlay's
//! inline mappings and resources. Inline mappings take precedence. A hit is
//! kept only if the overlay's policies allow replacing that resource. The
//! result is sorted by target id, so it does not depend on table order.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, trace};

use crate::idmap::{Entry, ValueEntry};
use crate::table::{ResourceTable, Value};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
  #[error("package '{overlay}' does not declare an overlay")]
  NotAnOverlay { overlay: String },

  #[error("overlay '{overlay}' targets package '{declared}', but the target package is '{actual}'")]
  PackageMismatch {
    overlay: String,
    declared: String,
    actual: String,
  },

  #[error("overlay '{overlay}' does not overlay any resource of '{target}'")]
  NoMatch { overlay: String, target: String },
}

/// Mapping produced by [`match_resources`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
  /// Redirects, ascending by target id.
  pub entries: Vec<Entry>,
  /// Inline values, ascending by target id.
  pub values: Vec<ValueEntry>,
  /// Union of the policy bits exercised by the kept matches.
  pub fulfilled_policies: u32,
}

/// Match the resources of `overlay` against those of `target`.
pub fn match_resources(target: &ResourceTable, overlay: &ResourceTable) -> Result<MatchResult, MatchError> {
  let info = overlay.overlay().ok_or_else(|| MatchError::NotAnOverlay {
    overlay: overlay.package_name().to_string(),
  })?;

  if info.target_package != target.package_name() {
    return Err(MatchError::PackageMismatch {
      overlay: overlay.package_name().to_string(),
      declared: info.target_package.clone(),
      actual: target.package_name().to_string(),
    });
  }

  let inline: HashMap<(&str, &str), &Value> = info
    .inline
    .iter()
    .filter_map(|mapping| mapping.key().map(|key| (key, &mapping.value)))
    .collect();
  let resources: HashMap<(&str, &str), _> = overlay
    .entries()
    .iter()
    .map(|entry| ((entry.type_name.as_str(), entry.name.as_str()), entry))
    .collect();

  let mut result = MatchResult::default();
  for target_entry in target.entries() {
    let key = (target_entry.type_name.as_str(), target_entry.name.as_str());
    let inline_value = inline.get(&key).and_then(|value| value.to_inline());
    let overlay_entry = resources.get(&key);
    if inline_value.is_none() && overlay_entry.is_none() {
      continue;
    }

    let Some(exercised) = info.check_policy(target_entry.policies) else {
      trace!(
        resource = %target_entry.label(),
        required = target_entry.policies,
        declared = info.policies,
        "policy not fulfilled, skipping"
      );
      continue;
    };
    result.fulfilled_policies |= exercised;

    if let Some((data_type, data_value)) = inline_value {
      result.values.push(ValueEntry {
        target_id: target_entry.id,
        data_type,
        data_value,
      });
    } else if let Some(overlay_entry) = overlay_entry {
      result.entries.push(Entry {
        target_id: target_entry.id,
        overlay_id: overlay_entry.id,
      });
    }
  }

  if result.entries.is_empty() && result.values.is_empty() {
    return Err(MatchError::NoMatch {
      overlay: overlay.package_name().to_string(),
      target: target.package_name().to_string(),
    });
  }

  result.entries.sort_by_key(|e| e.target_id);
  result.values.sort_by_key(|v| v.target_id);

  debug!(
    target = target.package_name(),
    overlay = overlay.package_name(),
    entries = result.entries.len(),
    values = result.values.len(),
    policies = result.fulfilled_policies,
    "matched resources"
  );
  Ok(result)
}
