//! The idmap artifact: in-memory model, binary codec and text dump.
//!
//! # Binary Layout
//!
//! All words are little-endian.
//!
//! ```text
//! 0x000  magic               u32  0x504d4449 ("IDMP")
//! 0x004  version             u32
//! 0x008  target crc          u32
//! 0x00c  overlay crc         u32
//! 0x010  fulfilled policies  u32
//! 0x014  debug flag          u8   + 3 bytes zero padding
//! 0x018  target path length  u32  (<= 256)
//! 0x01c  target path         [u8; 256], NUL padded
//! 0x11c  overlay path length u32
//! 0x120  overlay path        [u8; 256], NUL padded
//! 0x220  data block count    u32  (>= 1)
//! 0x224  data blocks:
//!          entry count       u32
//!          entries           { target id u32, overlay id u32 } * count
//!          value count       u32
//!          values            { target id u32, type u8 + 3 pad, data u32 } * count
//! ```

pub mod codec;
pub mod dump;
pub mod types;

pub use codec::{DecodeError, decode, encode, read_from, write_to};
pub use dump::dump;
pub use types::{Entry, Idmap, IdmapData, IdmapError, IdmapHeader, ValueEntry};
