//! Implementation of the `idmap lookup` command.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use idmap_lib::lookup::{ResourceRef, lookup};
use idmap_lib::store::read_idmap;
use idmap_lib::table::{Configuration, ManifestProvider};

use crate::output::{OutputFormat, print_json};

pub struct LookupArgs {
  pub idmap_path: PathBuf,
  pub resid: String,
  pub config: String,
}

/// Resolve a target resource through an idmap and print its value.
pub fn cmd_lookup(args: LookupArgs, output: OutputFormat) -> Result<ExitCode> {
  let reference: ResourceRef = args.resid.parse()?;
  let config: Configuration = args
    .config
    .parse()
    .with_context(|| format!("Invalid configuration '{}'", args.config))?;
  let idmap = read_idmap(&args.idmap_path)?;

  let result = lookup(&ManifestProvider::new(), &idmap, &reference, &config)?;

  if output.is_json() {
    print_json(&result)?;
  } else {
    println!("{}", result.value);
  }
  Ok(ExitCode::SUCCESS)
}
