//! Implementation of the `idmap scan` command.
//!
//! Prints the canonical idmap path of every overlay of the target package,
//! one per line, in overlay path order. Overlays whose idmap could not be
//! produced are reported on stderr and make the command fail.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use tracing::debug;

use idmap_lib::builder::BuildOptions;
use idmap_lib::platform::paths::idmap_dir;
use idmap_lib::scan::{ScanOptions, scan};
use idmap_lib::table::ManifestProvider;

use crate::output::{OutputFormat, print_error, print_json};

pub struct ScanArgs {
  pub input_dirs: Vec<PathBuf>,
  pub recursive: bool,
  pub target_package_name: String,
  pub target_path: PathBuf,
  pub output_dir: Option<PathBuf>,
  pub debug: bool,
}

pub fn cmd_scan(args: ScanArgs, output: OutputFormat) -> Result<ExitCode> {
  let output_dir = args.output_dir.unwrap_or_else(idmap_dir);
  debug!(output_dir = %output_dir.display(), "scanning");

  let options = ScanOptions {
    input_dirs: args.input_dirs,
    recursive: args.recursive,
    target_package: args.target_package_name,
    target_path: args.target_path,
    output_dir,
    build: BuildOptions { debug: args.debug },
  };
  let report = scan(&ManifestProvider::new(), &options)?;

  if output.is_json() {
    print_json(&report)?;
  } else {
    for path in report.idmap_paths() {
      println!("{}", path.display());
    }
  }

  let Some(first) = report.failures.first() else {
    return Ok(ExitCode::SUCCESS);
  };
  for failure in &report.failures {
    print_error(&format!("{}: {}", failure.overlay_path.display(), failure.message));
  }
  Ok(ExitCode::from(first.category.exit_code() as u8))
}
