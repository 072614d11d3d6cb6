mod cmd;
mod output;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use idmap_lib::error::ErrorCategory;

use crate::cmd::{CreateArgs, DumpArgs, LookupArgs, ScanArgs};
use crate::output::{OutputFormat, print_error};

/// idmap - create, inspect and query resource overlay idmaps
#[derive(Parser)]
#[command(name = "idmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable debug logging
  #[arg(long, global = true)]
  log_debug: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Build the idmap of an overlay package against its target
  Create {
    /// Path to the target package
    #[arg(long)]
    target_path: PathBuf,

    /// Path to the overlay package
    #[arg(long)]
    overlay_path: PathBuf,

    /// Where to write the idmap
    #[arg(long)]
    idmap_path: PathBuf,

    /// Set the debug flag in the idmap header
    #[arg(long)]
    debug: bool,
  },

  /// Print the contents of an idmap
  Dump {
    /// Path to the idmap
    #[arg(long)]
    idmap_path: PathBuf,

    /// Show the raw header layout with byte offsets
    #[arg(long)]
    verbose: bool,
  },

  /// Create or refresh idmaps for every overlay of a target package
  Scan {
    /// Directory to search for overlay packages (repeatable)
    #[arg(long = "input-directory", required = true)]
    input_dirs: Vec<PathBuf>,

    /// Descend into subdirectories
    #[arg(long)]
    recursive: bool,

    /// Package name the overlays must target
    #[arg(long)]
    target_package_name: String,

    /// Path to the target package
    #[arg(long)]
    target_path: PathBuf,

    /// Directory for the idmaps (default: the idmap cache directory)
    #[arg(long = "output-directory")]
    output_dir: Option<PathBuf>,

    /// Set the debug flag in built idmap headers
    #[arg(long)]
    debug: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Resolve a target resource through an idmap
  Lookup {
    /// Path to the idmap
    #[arg(long)]
    idmap_path: PathBuf,

    /// Resource id (0x7f010000) or qualified name (package:type/name)
    #[arg(long)]
    resid: String,

    /// Configuration qualifiers, e.g. sv-rSE-hdpi (empty: default configuration)
    #[arg(long, default_value = "")]
    config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.log_debug { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Create {
      target_path,
      overlay_path,
      idmap_path,
      debug,
    } => cmd::cmd_create(CreateArgs {
      target_path,
      overlay_path,
      idmap_path,
      debug,
    }),
    Commands::Dump { idmap_path, verbose } => cmd::cmd_dump(DumpArgs { idmap_path, verbose }),
    Commands::Scan {
      input_dirs,
      recursive,
      target_package_name,
      target_path,
      output_dir,
      debug,
      output,
    } => cmd::cmd_scan(
      ScanArgs {
        input_dirs,
        recursive,
        target_package_name,
        target_path,
        output_dir,
        debug,
      },
      output,
    ),
    Commands::Lookup {
      idmap_path,
      resid,
      config,
      output,
    } => cmd::cmd_lookup(
      LookupArgs {
        idmap_path,
        resid,
        config,
      },
      output,
    ),
  };

  match result {
    Ok(code) => code,
    Err(e) => {
      print_error(&format!("{:#}", e));
      let category = cmd::category_of(&e);
      exit_code(category)
    }
  }
}

fn exit_code(category: ErrorCategory) -> ExitCode {
  ExitCode::from(category.exit_code() as u8)
}
