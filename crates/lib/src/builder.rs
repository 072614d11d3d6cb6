//! Building idmaps from a target and an overlay package.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::idmap::{Idmap, IdmapData, IdmapError, IdmapHeader};
use crate::matcher::{MatchError, match_resources};
use crate::store::{WriteError, write_idmap};
use crate::table::{LoadError, ResourceTable, TableProvider};

#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Load(#[from] LoadError),

  #[error(transparent)]
  Match(#[from] MatchError),

  #[error("path '{}' is not valid UTF-8", .0.display())]
  NonUtf8Path(PathBuf),

  #[error(transparent)]
  Invalid(#[from] IdmapError),
}

/// Errors of the create operation: building followed by writing.
#[derive(Debug, Error)]
pub enum CreateError {
  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Write(#[from] WriteError),
}

/// Options recorded in the idmap header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
  pub debug: bool,
}

/// Build an idmap from already loaded tables.
///
/// `target_path` and `overlay_path` are stored in the header verbatim.
pub fn build(
  target_path: &str,
  overlay_path: &str,
  target: &ResourceTable,
  overlay: &ResourceTable,
  options: &BuildOptions,
) -> Result<Idmap, BuildError> {
  let matched = match_resources(target, overlay)?;

  let header = IdmapHeader::new(
    target.identity(),
    overlay.identity(),
    matched.fulfilled_policies,
    options.debug,
    target_path,
    overlay_path,
  );
  let data = IdmapData {
    entries: matched.entries,
    values: matched.values,
  };
  Ok(Idmap::new(header, vec![data])?)
}

pub(crate) fn path_str(path: &Path) -> Result<&str, BuildError> {
  path.to_str().ok_or_else(|| BuildError::NonUtf8Path(path.to_path_buf()))
}

/// Load both packages through `provider` and build their idmap.
pub fn build_from_paths(
  provider: &dyn TableProvider,
  target_path: &Path,
  overlay_path: &Path,
  options: &BuildOptions,
) -> Result<Idmap, BuildError> {
  let target_str = path_str(target_path)?;
  let overlay_str = path_str(overlay_path)?;
  let target = provider.load(target_path)?;
  let overlay = provider.load(overlay_path)?;
  build(target_str, overlay_str, &target, &overlay, options)
}

/// Build the idmap of `overlay_path` against `target_path` and write it to `idmap_path`.
///
/// Nothing is written unless the build succeeds.
pub fn create(
  provider: &dyn TableProvider,
  target_path: &Path,
  overlay_path: &Path,
  idmap_path: &Path,
  options: &BuildOptions,
) -> Result<Idmap, CreateError> {
  let idmap = build_from_paths(provider, target_path, overlay_path, options)?;
  write_idmap(idmap_path, &idmap)?;
  info!(
    path = %idmap_path.display(),
    entries = idmap.data()[0].len(),
    "idmap written"
  );
  Ok(idmap)
}
