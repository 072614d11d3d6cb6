//! Resource tables of target and overlay packages.
//!
//! The idmap core never parses packages itself. A [`TableProvider`] turns a
//! package path into a [`ResourceTable`]: the package name, a content identity
//! token, the declared resources with their configuration-specific values,
//! and, for overlays, the overlay declaration.

pub mod config;
pub mod manifest;
pub mod types;

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub use config::{ConfigError, Configuration};
pub use manifest::ManifestProvider;
pub use types::{ConfigValue, DataType, InlineMapping, OverlayInfo, ResId, ResourceEntry, Value};

/// Structural problems in a resource table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
  #[error("resource id {0} is declared more than once")]
  DuplicateId(ResId),

  #[error("resource '{0}' is declared more than once")]
  DuplicateName(String),

  #[error("resource {id} declares configuration '{config}' more than once")]
  DuplicateConfig { id: ResId, config: String },

  #[error("inline mapping '{0}' is not of the form type/name")]
  MalformedInline(String),

  #[error("inline mapping '{0}' supplies a string, which cannot be stored inline")]
  StringInline(String),

  #[error("inline mapping '{0}' is declared more than once")]
  DuplicateInline(String),
}

/// Errors raised while loading a package through a provider.
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("failed to read package '{path}': {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse package '{path}': {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid package '{path}': {source}")]
  Invalid {
    path: PathBuf,
    #[source]
    source: TableError,
  },
}

/// Loads resource tables from package files.
///
/// Implementations must be shareable across threads; the scanner loads
/// candidate packages in parallel.
pub trait TableProvider: Sync {
  /// Whether `path` looks like a package this provider can load.
  fn is_candidate(&self, path: &Path) -> bool;

  /// Load the resource table of the package at `path`.
  fn load(&self, path: &Path) -> Result<ResourceTable, LoadError>;
}

/// The resources declared by one package.
#[derive(Debug, Clone)]
pub struct ResourceTable {
  package: String,
  identity: u32,
  overlay: Option<OverlayInfo>,
  entries: Vec<ResourceEntry>,
  by_id: HashMap<ResId, usize>,
  by_name: HashMap<(String, String), usize>,
}

impl ResourceTable {
  /// Assemble a table, rejecting duplicate ids, names, configurations and
  /// inline mappings.
  pub fn new(
    package: impl Into<String>,
    identity: u32,
    overlay: Option<OverlayInfo>,
    entries: Vec<ResourceEntry>,
  ) -> Result<Self, TableError> {
    let mut by_id = HashMap::with_capacity(entries.len());
    let mut by_name = HashMap::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
      if by_id.insert(entry.id, index).is_some() {
        return Err(TableError::DuplicateId(entry.id));
      }
      if by_name
        .insert((entry.type_name.clone(), entry.name.clone()), index)
        .is_some()
      {
        return Err(TableError::DuplicateName(entry.label()));
      }
      let mut seen = HashSet::new();
      for value in &entry.values {
        if !seen.insert(&value.config) {
          return Err(TableError::DuplicateConfig {
            id: entry.id,
            config: value.config.to_string(),
          });
        }
      }
    }

    if let Some(info) = &overlay {
      let mut inline_keys = HashSet::new();
      for mapping in &info.inline {
        let Some(key) = mapping.key() else {
          return Err(TableError::MalformedInline(mapping.resource.clone()));
        };
        if !inline_keys.insert(key) {
          return Err(TableError::DuplicateInline(mapping.resource.clone()));
        }
        if mapping.value.to_inline().is_none() {
          return Err(TableError::StringInline(mapping.resource.clone()));
        }
      }
    }

    Ok(Self {
      package: package.into(),
      identity,
      overlay,
      entries,
      by_id,
      by_name,
    })
  }

  pub fn package_name(&self) -> &str {
    &self.package
  }

  /// Content identity token of the package, stored as the idmap crc.
  pub fn identity(&self) -> u32 {
    self.identity
  }

  /// The overlay declaration, or `None` if this package is not an overlay.
  pub fn overlay(&self) -> Option<&OverlayInfo> {
    self.overlay.as_ref()
  }

  pub fn entries(&self) -> &[ResourceEntry] {
    &self.entries
  }

  pub fn entry(&self, id: ResId) -> Option<&ResourceEntry> {
    self.by_id.get(&id).map(|&index| &self.entries[index])
  }

  /// Find the entry declared as `type_name/name`.
  pub fn find(&self, type_name: &str, name: &str) -> Option<&ResourceEntry> {
    self
      .by_name
      .get(&(type_name.to_string(), name.to_string()))
      .map(|&index| &self.entries[index])
  }

  /// Resolve `type_name/name` to its resource id.
  pub fn resolve(&self, type_name: &str, name: &str) -> Option<ResId> {
    self.find(type_name, name).map(|entry| entry.id)
  }

  /// The `type/name` label of `id`, if declared.
  pub fn label(&self, id: ResId) -> Option<String> {
    self.entry(id).map(ResourceEntry::label)
  }

  /// Select the value of `id` best suited to `config`.
  pub fn best_value(&self, id: ResId, config: &Configuration) -> Option<&ConfigValue> {
    self
      .entry(id)
      .and_then(|entry| config::best_match(&entry.values, config))
  }
}
