//! Implementation of the `idmap create` command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;

use idmap_lib::builder::{BuildOptions, create};
use idmap_lib::table::ManifestProvider;

use crate::output::{print_stat, print_success};

pub struct CreateArgs {
  pub target_path: PathBuf,
  pub overlay_path: PathBuf,
  pub idmap_path: PathBuf,
  pub debug: bool,
}

/// Build the idmap of an overlay against its target and write it.
///
/// Nothing is written when loading or matching fails.
pub fn cmd_create(args: CreateArgs) -> Result<ExitCode> {
  let options = BuildOptions { debug: args.debug };
  let idmap = create(
    &ManifestProvider::new(),
    &args.target_path,
    &args.overlay_path,
    &args.idmap_path,
    &options,
  )?;

  let data = &idmap.data()[0];
  print_success(&format!("Wrote {}", args.idmap_path.display()));
  print_stat("Redirects", &data.entries.len().to_string());
  print_stat("Inline values", &data.values.len().to_string());
  print_stat("Policies", &format!("{:#010x}", idmap.header().fulfilled_policies));

  Ok(ExitCode::SUCCESS)
}
