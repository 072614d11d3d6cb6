use serde::Serialize;
use thiserror::Error;

use crate::consts::{IDMAP_CURRENT_VERSION, IDMAP_MAGIC, IDMAP_PATH_FIELD_LEN};
use crate::table::{DataType, ResId, Value};

/// Reasons an in-memory idmap is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdmapError {
  #[error("header has magic {magic:#010x} and version {version}, expected {expected_magic:#010x} and version {expected_version}")]
  UnsupportedFormat {
    magic: u32,
    version: u32,
    expected_magic: u32,
    expected_version: u32,
  },

  #[error("an idmap needs at least one data block")]
  NoDataBlocks,

  #[error("{field} is {len} bytes, longer than the {max} byte limit")]
  PathTooLong {
    field: &'static str,
    len: usize,
    max: usize,
  },

  #[error("{field} contains a NUL byte")]
  PathContainsNul { field: &'static str },

  #[error("data block {block}: target id {id} is not strictly ascending")]
  Unordered { block: usize, id: ResId },

  #[error("data block {block}: target id {id} is both redirected and inlined")]
  DuplicateTarget { block: usize, id: ResId },
}

/// Fixed-layout header of an idmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdmapHeader {
  pub magic: u32,
  pub version: u32,
  pub target_crc: u32,
  pub overlay_crc: u32,
  pub fulfilled_policies: u32,
  pub debug_enabled: bool,
  pub target_path: String,
  pub overlay_path: String,
}

impl IdmapHeader {
  /// Create a header for the current format version.
  pub fn new(
    target_crc: u32,
    overlay_crc: u32,
    fulfilled_policies: u32,
    debug_enabled: bool,
    target_path: impl Into<String>,
    overlay_path: impl Into<String>,
  ) -> Self {
    Self {
      magic: IDMAP_MAGIC,
      version: IDMAP_CURRENT_VERSION,
      target_crc,
      overlay_crc,
      fulfilled_policies,
      debug_enabled,
      target_path: target_path.into(),
      overlay_path: overlay_path.into(),
    }
  }

  fn validate(&self) -> Result<(), IdmapError> {
    if self.magic != IDMAP_MAGIC || self.version != IDMAP_CURRENT_VERSION {
      return Err(IdmapError::UnsupportedFormat {
        magic: self.magic,
        version: self.version,
        expected_magic: IDMAP_MAGIC,
        expected_version: IDMAP_CURRENT_VERSION,
      });
    }
    for (field, path) in [("target path", &self.target_path), ("overlay path", &self.overlay_path)] {
      if path.len() > IDMAP_PATH_FIELD_LEN {
        return Err(IdmapError::PathTooLong {
          field,
          len: path.len(),
          max: IDMAP_PATH_FIELD_LEN,
        });
      }
      if path.bytes().any(|b| b == 0) {
        return Err(IdmapError::PathContainsNul { field });
      }
    }
    Ok(())
  }
}

/// Redirects a target resource to an overlay resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Entry {
  pub target_id: ResId,
  pub overlay_id: ResId,
}

/// Replaces a target resource with a literal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValueEntry {
  pub target_id: ResId,
  pub data_type: DataType,
  pub data_value: u32,
}

impl ValueEntry {
  pub fn value(&self) -> Value {
    Value::from_inline(self.data_type, self.data_value)
  }
}

/// The mapping produced by one matching pass.
///
/// Both lists are sorted by strictly ascending target id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdmapData {
  pub entries: Vec<Entry>,
  pub values: Vec<ValueEntry>,
}

impl IdmapData {
  /// Number of target resources this block overlays.
  pub fn len(&self) -> usize {
    self.entries.len() + self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty() && self.values.is_empty()
  }

  /// Binary search for the redirect of `target`.
  pub fn find_entry(&self, target: ResId) -> Option<&Entry> {
    self
      .entries
      .binary_search_by_key(&target, |e| e.target_id)
      .ok()
      .map(|index| &self.entries[index])
  }

  /// Binary search for the inline value of `target`.
  pub fn find_value(&self, target: ResId) -> Option<&ValueEntry> {
    self
      .values
      .binary_search_by_key(&target, |v| v.target_id)
      .ok()
      .map(|index| &self.values[index])
  }

  fn validate(&self, block: usize) -> Result<(), IdmapError> {
    check_ascending(block, self.entries.iter().map(|e| e.target_id))?;
    check_ascending(block, self.values.iter().map(|v| v.target_id))?;
    for value in &self.values {
      if self.find_entry(value.target_id).is_some() {
        return Err(IdmapError::DuplicateTarget {
          block,
          id: value.target_id,
        });
      }
    }
    Ok(())
  }
}

fn check_ascending(block: usize, ids: impl Iterator<Item = ResId>) -> Result<(), IdmapError> {
  let mut previous: Option<ResId> = None;
  for id in ids {
    if previous.is_some_and(|prev| prev >= id) {
      return Err(IdmapError::Unordered { block, id });
    }
    previous = Some(id);
  }
  Ok(())
}

/// A validated, immutable idmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Idmap {
  header: IdmapHeader,
  data: Vec<IdmapData>,
}

impl Idmap {
  /// Validate and assemble an idmap.
  ///
  /// The header must carry the current magic and version and its paths must
  /// fit their fixed-width fields. There must be at least one data block, and
  /// every block must be strictly ascending by target id.
  pub fn new(header: IdmapHeader, data: Vec<IdmapData>) -> Result<Self, IdmapError> {
    header.validate()?;
    if data.is_empty() {
      return Err(IdmapError::NoDataBlocks);
    }
    for (block, data) in data.iter().enumerate() {
      data.validate(block)?;
    }
    Ok(Self { header, data })
  }

  pub fn header(&self) -> &IdmapHeader {
    &self.header
  }

  pub fn data(&self) -> &[IdmapData] {
    &self.data
  }
}
