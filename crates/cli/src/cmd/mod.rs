mod create;
mod dump;
mod lookup;
mod scan;

pub use create::{CreateArgs, cmd_create};
pub use dump::{DumpArgs, cmd_dump};
pub use lookup::{LookupArgs, cmd_lookup};
pub use scan::{ScanArgs, cmd_scan};

use idmap_lib::builder::{BuildError, CreateError};
use idmap_lib::error::{Categorized, ErrorCategory};
use idmap_lib::idmap::DecodeError;
use idmap_lib::lookup::LookupError;
use idmap_lib::scan::ScanError;
use idmap_lib::store::{ReadError, WriteError};
use idmap_lib::table::LoadError;

/// Find the category of the first library error in the chain of `error`.
pub fn category_of(error: &anyhow::Error) -> ErrorCategory {
  for cause in error.chain() {
    if let Some(category) = category_of_cause(cause) {
      return category;
    }
  }
  ErrorCategory::Other
}

fn category_of_cause(cause: &(dyn std::error::Error + 'static)) -> Option<ErrorCategory> {
  macro_rules! try_category {
    ($($ty:ty),* $(,)?) => {
      $(
        if let Some(e) = cause.downcast_ref::<$ty>() {
          return Some(e.category());
        }
      )*
    };
  }

  try_category!(
    CreateError,
    BuildError,
    ScanError,
    LookupError,
    ReadError,
    DecodeError,
    WriteError,
    LoadError,
  );
  None
}
