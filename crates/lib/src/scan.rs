//! Discovery of overlay packages and maintenance of their canonical idmaps.
//!
//! A scan walks one or more input directories, keeps every package whose
//! overlay declaration names the requested target package, and makes sure a
//! current idmap exists for it in the output directory. Idmaps whose recorded
//! crcs, paths and debug flag still match are left untouched.
//!
//! Candidates are deduplicated by canonical path and processed in parallel.
//! Results are reported sorted by overlay path, independent of directory
//! enumeration order.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::builder::{BuildOptions, build, path_str};
use crate::error::{Categorized, ErrorCategory};
use crate::store::{Freshness, IdmapStore, write_idmap};
use crate::table::{LoadError, ResourceTable, TableProvider};

#[derive(Debug, Error)]
pub enum ScanError {
  #[error("failed to read input directory '{path}': {source}")]
  ReadDir {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error(transparent)]
  Load(#[from] LoadError),

  #[error("target package '{path}' is '{actual}', not '{expected}'")]
  TargetMismatch {
    path: PathBuf,
    expected: String,
    actual: String,
  },

  #[error("failed to create output directory '{path}': {source}")]
  CreateOutputDir {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("path '{}' is not valid UTF-8", .0.display())]
  NonUtf8Path(PathBuf),
}

/// Parameters of a scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
  pub input_dirs: Vec<PathBuf>,
  pub recursive: bool,
  pub target_package: String,
  pub target_path: PathBuf,
  pub output_dir: PathBuf,
  pub build: BuildOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanOutcome {
  /// The existing idmap was current and kept as is.
  Fresh,
  /// The idmap was (re)built and written.
  Built,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScannedIdmap {
  pub overlay_path: PathBuf,
  pub idmap_path: PathBuf,
  pub outcome: ScanOutcome,
}

/// An overlay of the target package whose idmap could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
  pub overlay_path: PathBuf,
  pub category: ErrorCategory,
  pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
  /// One entry per matching overlay, sorted by overlay path.
  pub idmaps: Vec<ScannedIdmap>,
  /// Matching overlays that failed to build or write, sorted by overlay path.
  pub failures: Vec<ScanFailure>,
}

impl ScanReport {
  pub fn is_success(&self) -> bool {
    self.failures.is_empty()
  }

  /// Canonical idmap paths in output order.
  pub fn idmap_paths(&self) -> impl Iterator<Item = &Path> {
    self.idmaps.iter().map(|i| i.idmap_path.as_path())
  }
}

enum Processed {
  Skipped,
  Done(ScannedIdmap),
  Failed(ScanFailure),
}

/// Scan the input directories and create or refresh idmaps for matching overlays.
pub fn scan(provider: &dyn TableProvider, options: &ScanOptions) -> Result<ScanReport, ScanError> {
  let target_path_str = options
    .target_path
    .to_str()
    .ok_or_else(|| ScanError::NonUtf8Path(options.target_path.clone()))?;
  let target = provider.load(&options.target_path)?;
  if target.package_name() != options.target_package {
    return Err(ScanError::TargetMismatch {
      path: options.target_path.clone(),
      expected: options.target_package.clone(),
      actual: target.package_name().to_string(),
    });
  }

  let store = IdmapStore::new(options.output_dir.clone());
  store.ensure_dir().map_err(|e| ScanError::CreateOutputDir {
    path: options.output_dir.clone(),
    source: e,
  })?;

  let candidates = discover(provider, &options.input_dirs, options.recursive)?;
  debug!(count = candidates.len(), "discovered candidate packages");

  let candidates: Vec<PathBuf> = candidates.into_iter().collect();
  let processed: Vec<Processed> = candidates
    .par_iter()
    .map(|overlay_path| process(provider, &store, &target, target_path_str, overlay_path, options))
    .collect();

  let mut report = ScanReport::default();
  for item in processed {
    match item {
      Processed::Skipped => {}
      Processed::Done(idmap) => report.idmaps.push(idmap),
      Processed::Failed(failure) => report.failures.push(failure),
    }
  }
  report.idmaps.sort_by(|a, b| a.overlay_path.cmp(&b.overlay_path));
  report.failures.sort_by(|a, b| a.overlay_path.cmp(&b.overlay_path));

  info!(
    idmaps = report.idmaps.len(),
    failures = report.failures.len(),
    "scan complete"
  );
  Ok(report)
}

/// Collect candidate packages under `dirs`, canonicalised and deduplicated.
fn discover(provider: &dyn TableProvider, dirs: &[PathBuf], recursive: bool) -> Result<BTreeSet<PathBuf>, ScanError> {
  let mut candidates = BTreeSet::new();
  let max_depth = if recursive { usize::MAX } else { 1 };

  for dir in dirs {
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth) {
      let entry = entry.map_err(|e| ScanError::ReadDir {
        path: dir.clone(),
        source: e,
      })?;
      if !provider.is_candidate(entry.path()) {
        continue;
      }
      match dunce::canonicalize(entry.path()) {
        Ok(path) => {
          candidates.insert(path);
        }
        Err(e) => {
          info!(path = %entry.path().display(), error = %e, "cannot resolve candidate, skipping");
        }
      }
    }
  }

  Ok(candidates)
}

fn process(
  provider: &dyn TableProvider,
  store: &IdmapStore,
  target: &ResourceTable,
  target_path: &str,
  overlay_path: &Path,
  options: &ScanOptions,
) -> Processed {
  let overlay = match provider.load(overlay_path) {
    Ok(table) => table,
    Err(e) => {
      debug!(path = %overlay_path.display(), error = %e, "not a loadable package, skipping");
      return Processed::Skipped;
    }
  };
  match overlay.overlay() {
    Some(info) if info.target_package == options.target_package => {}
    _ => {
      debug!(path = %overlay_path.display(), "not an overlay of the target package, skipping");
      return Processed::Skipped;
    }
  }

  let idmap_path = store.path_for(overlay_path);
  let overlay_path_str = match path_str(overlay_path) {
    Ok(s) => s,
    Err(e) => return failed(overlay_path, &e),
  };

  match store.freshness(
    &idmap_path,
    target_path,
    overlay_path_str,
    target,
    &overlay,
    &options.build,
  ) {
    Freshness::Fresh => {
      debug!(path = %idmap_path.display(), "idmap is up to date");
      return Processed::Done(ScannedIdmap {
        overlay_path: overlay_path.to_path_buf(),
        idmap_path,
        outcome: ScanOutcome::Fresh,
      });
    }
    Freshness::Corrupt => {
      info!(path = %idmap_path.display(), "existing idmap is corrupt, rebuilding");
    }
    Freshness::Missing | Freshness::Stale => {}
  }

  let idmap = match build(target_path, overlay_path_str, target, &overlay, &options.build) {
    Ok(idmap) => idmap,
    Err(e) => return failed(overlay_path, &e),
  };
  if let Err(e) = write_idmap(&idmap_path, &idmap) {
    return failed(overlay_path, &e);
  }

  info!(overlay = %overlay_path.display(), path = %idmap_path.display(), "idmap written");
  Processed::Done(ScannedIdmap {
    overlay_path: overlay_path.to_path_buf(),
    idmap_path,
    outcome: ScanOutcome::Built,
  })
}

fn failed<E: Categorized + std::fmt::Display>(overlay_path: &Path, error: &E) -> Processed {
  warn!(overlay = %overlay_path.display(), error = %error, "failed to produce idmap");
  Processed::Failed(ScanFailure {
    overlay_path: overlay_path.to_path_buf(),
    category: error.category(),
    message: error.to_string(),
  })
}
