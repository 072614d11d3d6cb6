//! Failure categories shared by every operation.
//!
//! Each error type maps onto one [`ErrorCategory`]; front ends use the
//! category to pick a distinct exit status.

use serde::Serialize;

use crate::builder::{BuildError, CreateError};
use crate::idmap::{DecodeError, IdmapError};
use crate::lookup::LookupError;
use crate::matcher::MatchError;
use crate::scan::ScanError;
use crate::store::{ReadError, WriteError};
use crate::table::LoadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
  /// An input package is missing or corrupt.
  Load,
  /// The overlay does not target the given target package.
  PackageMismatch,
  /// No resource matched.
  NoMatch,
  /// An idmap is malformed, truncated or of another version.
  Decode,
  /// The destination cannot be written.
  Write,
  /// The target resource has no entry in the idmap.
  NotFound,
  /// A resource reference cannot be resolved to an id.
  Unresolvable,
  Other,
}

impl ErrorCategory {
  pub fn exit_code(self) -> i32 {
    match self {
      ErrorCategory::Other => 1,
      ErrorCategory::Load => 2,
      ErrorCategory::PackageMismatch => 3,
      ErrorCategory::NoMatch => 4,
      ErrorCategory::Decode => 5,
      ErrorCategory::Write => 6,
      ErrorCategory::NotFound => 7,
      ErrorCategory::Unresolvable => 8,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      ErrorCategory::Load => "load error",
      ErrorCategory::PackageMismatch => "package mismatch",
      ErrorCategory::NoMatch => "no match",
      ErrorCategory::Decode => "decode error",
      ErrorCategory::Write => "write error",
      ErrorCategory::NotFound => "not found",
      ErrorCategory::Unresolvable => "unresolvable",
      ErrorCategory::Other => "error",
    }
  }
}

impl std::fmt::Display for ErrorCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Errors that know their category.
pub trait Categorized {
  fn category(&self) -> ErrorCategory;
}

impl Categorized for LoadError {
  fn category(&self) -> ErrorCategory {
    ErrorCategory::Load
  }
}

impl Categorized for MatchError {
  fn category(&self) -> ErrorCategory {
    match self {
      MatchError::NotAnOverlay { .. } | MatchError::PackageMismatch { .. } => ErrorCategory::PackageMismatch,
      MatchError::NoMatch { .. } => ErrorCategory::NoMatch,
    }
  }
}

impl Categorized for IdmapError {
  fn category(&self) -> ErrorCategory {
    ErrorCategory::Other
  }
}

impl Categorized for BuildError {
  fn category(&self) -> ErrorCategory {
    match self {
      BuildError::Load(e) => e.category(),
      BuildError::Match(e) => e.category(),
      BuildError::NonUtf8Path(_) => ErrorCategory::Other,
      BuildError::Invalid(e) => e.category(),
    }
  }
}

impl Categorized for WriteError {
  fn category(&self) -> ErrorCategory {
    ErrorCategory::Write
  }
}

impl Categorized for CreateError {
  fn category(&self) -> ErrorCategory {
    match self {
      CreateError::Build(e) => e.category(),
      CreateError::Write(e) => e.category(),
    }
  }
}

impl Categorized for DecodeError {
  fn category(&self) -> ErrorCategory {
    ErrorCategory::Decode
  }
}

impl Categorized for ReadError {
  fn category(&self) -> ErrorCategory {
    match self {
      ReadError::Io { .. } | ReadError::Decode { .. } => ErrorCategory::Decode,
    }
  }
}

impl Categorized for ScanError {
  fn category(&self) -> ErrorCategory {
    match self {
      ScanError::Load(e) => e.category(),
      ScanError::TargetMismatch { .. } => ErrorCategory::PackageMismatch,
      ScanError::CreateOutputDir { .. } => ErrorCategory::Write,
      ScanError::ReadDir { .. } | ScanError::NonUtf8Path(_) => ErrorCategory::Other,
    }
  }
}

impl Categorized for LookupError {
  fn category(&self) -> ErrorCategory {
    match self {
      LookupError::NotFound { .. } | LookupError::NoValue { .. } => ErrorCategory::NotFound,
      LookupError::Unresolvable { .. } => ErrorCategory::Unresolvable,
      LookupError::Load(e) => e.category(),
    }
  }
}
