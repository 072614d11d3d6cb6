//! Implementation of the `idmap dump` command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;

use idmap_lib::idmap::dump;
use idmap_lib::store::read_idmap;
use idmap_lib::table::{ManifestProvider, TableProvider};

use tracing::info;

pub struct DumpArgs {
  pub idmap_path: PathBuf,
  pub verbose: bool,
}

/// Print an idmap, labelling resources from its target package when available.
pub fn cmd_dump(args: DumpArgs) -> Result<ExitCode> {
  let idmap = read_idmap(&args.idmap_path)?;

  let target_path = Path::new(&idmap.header().target_path);
  let target = match ManifestProvider::new().load(target_path) {
    Ok(table) => Some(table),
    Err(e) => {
      info!(path = %target_path.display(), error = %e, "resource names unavailable");
      None
    }
  };

  print!("{}", dump(&idmap, target.as_ref(), args.verbose));
  Ok(ExitCode::SUCCESS)
}
