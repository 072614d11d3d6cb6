//! Constants shared across the crate.

/// Application name used for platform directories.
pub const APP_NAME: &str = "idmap";

/// Magic word at offset 0 of every idmap ("IDMP" on disk, little-endian).
pub const IDMAP_MAGIC: u32 = 0x504d_4449;

/// The only idmap format version this build reads and writes.
pub const IDMAP_CURRENT_VERSION: u32 = 1;

/// Fixed width of each NUL-padded path field in the header.
pub const IDMAP_PATH_FIELD_LEN: usize = 256;

/// File extension of idmap artifacts written by the store.
pub const IDMAP_EXTENSION: &str = "idmap";

/// Number of hex characters of the path hash used in canonical idmap names.
pub const CANONICAL_HASH_LEN: usize = 16;

/// File extension of package descriptions read by the manifest provider.
pub const PACKAGE_EXTENSION: &str = "json";
