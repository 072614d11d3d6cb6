//! JSON package descriptions.
//!
//! # Format
//!
//! ```json
//! {
//!   "package": "test.overlay",
//!   "overlay": { "target_package": "test.target", "policies": 1, "inline": [] },
//!   "resources": [
//!     { "id": "0x7f020000", "type": "string", "name": "str1",
//!       "values": [ { "config": "sv", "value": { "string": "overlay-1-sv" } } ] }
//!   ]
//! }
//! ```
//!
//! The identity token of a package is derived from the raw file bytes, so any
//! edit to the description invalidates idmaps built from it.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::trace;

use super::{LoadError, OverlayInfo, ResourceEntry, ResourceTable, TableProvider};
use crate::consts::PACKAGE_EXTENSION;
use crate::util::hash::identity_token;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PackageManifest {
  package: String,
  #[serde(default)]
  overlay: Option<OverlayInfo>,
  #[serde(default)]
  resources: Vec<ResourceEntry>,
}

/// Provider reading `*.json` package descriptions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestProvider;

impl ManifestProvider {
  pub fn new() -> Self {
    Self
  }

  /// Parse a package description from memory.
  pub fn parse(path: &Path, bytes: &[u8]) -> Result<ResourceTable, LoadError> {
    let manifest: PackageManifest = serde_json::from_slice(bytes).map_err(|e| LoadError::Parse {
      path: path.to_path_buf(),
      source: e,
    })?;

    ResourceTable::new(
      manifest.package,
      identity_token(bytes),
      manifest.overlay,
      manifest.resources,
    )
    .map_err(|e| LoadError::Invalid {
      path: path.to_path_buf(),
      source: e,
    })
  }
}

impl TableProvider for ManifestProvider {
  fn is_candidate(&self, path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(PACKAGE_EXTENSION) && path.is_file()
  }

  fn load(&self, path: &Path) -> Result<ResourceTable, LoadError> {
    let bytes = fs::read(path).map_err(|e| LoadError::Read {
      path: path.to_path_buf(),
      source: e,
    })?;
    let table = Self::parse(path, &bytes)?;
    trace!(
      path = %path.display(),
      package = table.package_name(),
      resources = table.entries().len(),
      "loaded package"
    );
    Ok(table)
  }
}
