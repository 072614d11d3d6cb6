//! Idmap persistence and the canonical artifact store.
//!
//! # Store Layout
//!
//! ```text
//! {output_dir}/
//!   overlay-static-1-3f2a9c01d4e5b6a7.idmap   # {overlay stem}-{hash(overlay path)[:16]}
//!   overlay-static-2-88e0b1c2d3f4a5b6.idmap
//! ```
//!
//! The name depends only on the overlay's absolute path, so repeated scans of
//! the same overlay always land on the same file. Writes replace the file
//! atomically via a temporary file in the same directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::builder::BuildOptions;
use crate::consts::IDMAP_EXTENSION;
use crate::idmap::{DecodeError, Idmap, codec};
use crate::platform::paths::idmap_dir;
use crate::table::ResourceTable;
use crate::util::hash::path_hash;

/// Failure to persist an idmap.
#[derive(Debug, Error)]
#[error("failed to write idmap '{path}': {source}")]
pub struct WriteError {
  pub path: PathBuf,
  #[source]
  pub source: io::Error,
}

/// Failure to load a persisted idmap.
#[derive(Debug, Error)]
pub enum ReadError {
  #[error("failed to read idmap '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to decode idmap '{path}': {source}")]
  Decode {
    path: PathBuf,
    #[source]
    source: DecodeError,
  },
}

/// Write `idmap` to `path`, replacing any existing file.
///
/// The bytes go to a temporary file next to `path`, are synced, and the
/// temporary file is then renamed over `path`. On failure the temporary file
/// is removed and `path` is left untouched.
pub fn write_idmap(path: &Path, idmap: &Idmap) -> Result<(), WriteError> {
  let write_err = |source: io::Error| WriteError {
    path: path.to_path_buf(),
    source,
  };

  let parent = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  let mut file = tempfile::Builder::new()
    .prefix(".idmap-")
    .suffix(".tmp")
    .tempfile_in(parent)
    .map_err(write_err)?;
  codec::write_to(idmap, &mut file).map_err(write_err)?;
  file.as_file().sync_all().map_err(write_err)?;

  #[cfg(unix)]
  {
    use std::os::unix::fs::PermissionsExt;
    file
      .as_file()
      .set_permissions(fs::Permissions::from_mode(0o644))
      .map_err(write_err)?;
  }

  file.persist(path).map_err(|e| write_err(e.error))?;
  Ok(())
}

/// Read and decode the idmap at `path`.
pub fn read_idmap(path: &Path) -> Result<Idmap, ReadError> {
  let bytes = fs::read(path).map_err(|e| ReadError::Io {
    path: path.to_path_buf(),
    source: e,
  })?;
  codec::decode(&bytes).map_err(|e| ReadError::Decode {
    path: path.to_path_buf(),
    source: e,
  })
}

/// Compute the canonical idmap path of an overlay under `output_dir`.
///
/// `overlay_path` should be absolute; the same path always yields the same
/// name and different paths yield different names.
pub fn canonical_idmap_path(output_dir: &Path, overlay_path: &Path) -> PathBuf {
  let stem = overlay_path
    .file_stem()
    .map(|s| s.to_string_lossy().into_owned())
    .unwrap_or_else(|| "overlay".to_string());
  output_dir.join(format!("{}-{}.{}", stem, path_hash(overlay_path), IDMAP_EXTENSION))
}

/// State of an existing artifact relative to its source packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
  /// No artifact exists yet.
  Missing,
  /// The artifact matches the current packages and paths.
  Fresh,
  /// The artifact was built from different package contents, paths or options.
  Stale,
  /// The artifact exists but cannot be decoded.
  Corrupt,
}

/// Directory holding canonical idmaps.
#[derive(Debug, Clone)]
pub struct IdmapStore {
  output_dir: PathBuf,
}

impl Default for IdmapStore {
  fn default() -> Self {
    Self::new(idmap_dir())
  }
}

impl IdmapStore {
  pub fn new(output_dir: PathBuf) -> Self {
    Self { output_dir }
  }

  pub fn output_dir(&self) -> &Path {
    &self.output_dir
  }

  /// Ensure the output directory exists.
  pub fn ensure_dir(&self) -> io::Result<()> {
    fs::create_dir_all(&self.output_dir)
  }

  /// Canonical artifact path for `overlay_path`.
  pub fn path_for(&self, overlay_path: &Path) -> PathBuf {
    canonical_idmap_path(&self.output_dir, overlay_path)
  }

  /// Compare the artifact at `idmap_path` with the packages and options it
  /// would be built from.
  pub fn freshness(
    &self,
    idmap_path: &Path,
    target_path: &str,
    overlay_path: &str,
    target: &ResourceTable,
    overlay: &ResourceTable,
    options: &BuildOptions,
  ) -> Freshness {
    let idmap = match read_idmap(idmap_path) {
      Ok(idmap) => idmap,
      Err(ReadError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
        return Freshness::Missing;
      }
      Err(e) => {
        debug!(path = %idmap_path.display(), error = %e, "existing idmap is unreadable");
        return Freshness::Corrupt;
      }
    };

    let header = idmap.header();
    if header.target_crc == target.identity()
      && header.overlay_crc == overlay.identity()
      && header.target_path == target_path
      && header.overlay_path == overlay_path
      && header.debug_enabled == options.debug
    {
      Freshness::Fresh
    } else {
      Freshness::Stale
    }
  }
}
