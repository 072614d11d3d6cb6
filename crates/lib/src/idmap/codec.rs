//! Binary encoding and decoding of idmaps.
//!
//! Decoding validates every byte it consumes: lengths are checked before each
//! read, padding must be zero and nothing may follow the last data block.
//! As a consequence any accepted input re-encodes to exactly the same bytes.

use std::io::{self, Read, Write};

use thiserror::Error;

use super::types::{Entry, Idmap, IdmapData, IdmapError, IdmapHeader, ValueEntry};
use crate::consts::{IDMAP_CURRENT_VERSION, IDMAP_MAGIC, IDMAP_PATH_FIELD_LEN};
use crate::table::{DataType, ResId};

pub const OFFSET_MAGIC: usize = 0x00;
pub const OFFSET_VERSION: usize = 0x04;
pub const OFFSET_TARGET_CRC: usize = 0x08;
pub const OFFSET_OVERLAY_CRC: usize = 0x0c;
pub const OFFSET_FULFILLED_POLICIES: usize = 0x10;
pub const OFFSET_DEBUG: usize = 0x14;
pub const OFFSET_TARGET_PATH: usize = 0x18;
pub const OFFSET_OVERLAY_PATH: usize = OFFSET_TARGET_PATH + PATH_RECORD_SIZE;
pub const OFFSET_BLOCK_COUNT: usize = OFFSET_OVERLAY_PATH + PATH_RECORD_SIZE;
pub const OFFSET_FIRST_BLOCK: usize = OFFSET_BLOCK_COUNT + 4;

/// Length word plus fixed-width path field.
pub const PATH_RECORD_SIZE: usize = 4 + IDMAP_PATH_FIELD_LEN;
pub const ENTRY_SIZE: usize = 8;
pub const VALUE_ENTRY_SIZE: usize = 12;

/// Smallest possible data block: two zero counts.
const MIN_BLOCK_SIZE: usize = 8;

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("failed to read idmap: {0}")]
  Io(#[from] io::Error),

  #[error("idmap truncated: {field} at offset {offset:#x} needs {needed} bytes, {available} available")]
  Truncated {
    field: &'static str,
    offset: usize,
    needed: usize,
    available: usize,
  },

  #[error("bad magic {found:#010x}, expected {expected:#010x}")]
  BadMagic { found: u32, expected: u32 },

  #[error("unsupported idmap version {found}, this build reads version {expected}")]
  UnsupportedVersion { found: u32, expected: u32 },

  #[error("invalid debug flag {0:#04x}")]
  InvalidDebugFlag(u8),

  #[error("non-zero padding in {field} at offset {offset:#x}")]
  NonZeroPadding { field: &'static str, offset: usize },

  #[error("{field} length {len} exceeds the {max} byte field")]
  PathTooLong {
    field: &'static str,
    len: usize,
    max: usize,
  },

  #[error("{field} is not valid UTF-8")]
  InvalidPath { field: &'static str },

  #[error("unknown value type {found:#04x} at offset {offset:#x}")]
  UnknownValueType { found: u8, offset: usize },

  #[error("{count} trailing bytes after the last data block at offset {offset:#x}")]
  TrailingBytes { offset: usize, count: usize },

  #[error("invalid idmap: {0}")]
  Invalid(#[from] IdmapError),
}

/// Encode an idmap into its binary form.
pub fn encode(idmap: &Idmap) -> Vec<u8> {
  let mut buf = Vec::with_capacity(encoded_len(idmap));
  let header = idmap.header();

  put_u32(&mut buf, header.magic);
  put_u32(&mut buf, header.version);
  put_u32(&mut buf, header.target_crc);
  put_u32(&mut buf, header.overlay_crc);
  put_u32(&mut buf, header.fulfilled_policies);
  buf.push(u8::from(header.debug_enabled));
  buf.extend_from_slice(&[0; 3]);
  put_path(&mut buf, &header.target_path);
  put_path(&mut buf, &header.overlay_path);

  put_u32(&mut buf, idmap.data().len() as u32);
  for data in idmap.data() {
    put_u32(&mut buf, data.entries.len() as u32);
    for entry in &data.entries {
      put_u32(&mut buf, entry.target_id.0);
      put_u32(&mut buf, entry.overlay_id.0);
    }
    put_u32(&mut buf, data.values.len() as u32);
    for value in &data.values {
      put_u32(&mut buf, value.target_id.0);
      buf.push(value.data_type as u8);
      buf.extend_from_slice(&[0; 3]);
      put_u32(&mut buf, value.data_value);
    }
  }

  buf
}

/// Size in bytes of the encoded form of `idmap`.
pub fn encoded_len(idmap: &Idmap) -> usize {
  OFFSET_FIRST_BLOCK
    + idmap
      .data()
      .iter()
      .map(|d| MIN_BLOCK_SIZE + d.entries.len() * ENTRY_SIZE + d.values.len() * VALUE_ENTRY_SIZE)
      .sum::<usize>()
}

/// Encode `idmap` into a writer.
pub fn write_to<W: Write>(idmap: &Idmap, writer: &mut W) -> io::Result<()> {
  writer.write_all(&encode(idmap))
}

/// Read an entire stream and decode it.
pub fn read_from<R: Read>(reader: &mut R) -> Result<Idmap, DecodeError> {
  let mut bytes = Vec::new();
  reader.read_to_end(&mut bytes)?;
  decode(&bytes)
}

/// Decode an idmap from its binary form.
pub fn decode(bytes: &[u8]) -> Result<Idmap, DecodeError> {
  let mut reader = Reader::new(bytes);

  let magic = reader.u32("magic")?;
  if magic != IDMAP_MAGIC {
    return Err(DecodeError::BadMagic {
      found: magic,
      expected: IDMAP_MAGIC,
    });
  }
  let version = reader.u32("version")?;
  if version != IDMAP_CURRENT_VERSION {
    return Err(DecodeError::UnsupportedVersion {
      found: version,
      expected: IDMAP_CURRENT_VERSION,
    });
  }

  let target_crc = reader.u32("target crc")?;
  let overlay_crc = reader.u32("overlay crc")?;
  let fulfilled_policies = reader.u32("fulfilled policies")?;
  let debug_enabled = match reader.u8("debug flag")? {
    0 => false,
    1 => true,
    other => return Err(DecodeError::InvalidDebugFlag(other)),
  };
  reader.padding(3, "debug flag")?;
  let target_path = reader.path("target path")?;
  let overlay_path = reader.path("overlay path")?;

  let block_count = reader.count("data block count", MIN_BLOCK_SIZE)?;
  let mut data = Vec::with_capacity(block_count);
  for _ in 0..block_count {
    let entry_count = reader.count("entry count", ENTRY_SIZE)?;
    let mut entries = Vec::with_capacity(entry_count);
    for _ in 0..entry_count {
      entries.push(Entry {
        target_id: ResId(reader.u32("entry target id")?),
        overlay_id: ResId(reader.u32("entry overlay id")?),
      });
    }

    let value_count = reader.count("value count", VALUE_ENTRY_SIZE)?;
    let mut values = Vec::with_capacity(value_count);
    for _ in 0..value_count {
      let target_id = ResId(reader.u32("value target id")?);
      let type_offset = reader.pos;
      let type_byte = reader.u8("value type")?;
      let data_type = DataType::from_byte(type_byte).ok_or(DecodeError::UnknownValueType {
        found: type_byte,
        offset: type_offset,
      })?;
      reader.padding(3, "value type")?;
      let data_value = reader.u32("value data")?;
      values.push(ValueEntry {
        target_id,
        data_type,
        data_value,
      });
    }

    data.push(IdmapData { entries, values });
  }

  if reader.remaining() > 0 {
    return Err(DecodeError::TrailingBytes {
      offset: reader.pos,
      count: reader.remaining(),
    });
  }

  let header = IdmapHeader {
    magic,
    version,
    target_crc,
    overlay_crc,
    fulfilled_policies,
    debug_enabled,
    target_path,
    overlay_path,
  };
  Ok(Idmap::new(header, data)?)
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
  buf.extend_from_slice(&value.to_le_bytes());
}

fn put_path(buf: &mut Vec<u8>, path: &str) {
  put_u32(buf, path.len() as u32);
  buf.extend_from_slice(path.as_bytes());
  buf.resize(buf.len() + IDMAP_PATH_FIELD_LEN - path.len(), 0);
}

/// Bounds-checked cursor over the input bytes.
struct Reader<'a> {
  bytes: &'a [u8],
  pos: usize,
}

impl<'a> Reader<'a> {
  fn new(bytes: &'a [u8]) -> Self {
    Self { bytes, pos: 0 }
  }

  fn remaining(&self) -> usize {
    self.bytes.len() - self.pos
  }

  fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
    if self.remaining() < len {
      return Err(DecodeError::Truncated {
        field,
        offset: self.pos,
        needed: len,
        available: self.remaining(),
      });
    }
    let slice = &self.bytes[self.pos..self.pos + len];
    self.pos += len;
    Ok(slice)
  }

  fn u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
    Ok(self.take(1, field)?[0])
  }

  fn u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
    let b = self.take(4, field)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
  }

  fn padding(&mut self, len: usize, field: &'static str) -> Result<(), DecodeError> {
    let offset = self.pos;
    if self.take(len, field)?.iter().any(|&b| b != 0) {
      return Err(DecodeError::NonZeroPadding { field, offset });
    }
    Ok(())
  }

  /// Read a record count and check that `count` records of at least
  /// `record_size` bytes can still follow.
  fn count(&mut self, field: &'static str, record_size: usize) -> Result<usize, DecodeError> {
    let count = self.u32(field)? as usize;
    let needed = count.saturating_mul(record_size);
    if needed > self.remaining() {
      return Err(DecodeError::Truncated {
        field,
        offset: self.pos,
        needed,
        available: self.remaining(),
      });
    }
    Ok(count)
  }

  fn path(&mut self, field: &'static str) -> Result<String, DecodeError> {
    let len = self.u32(field)? as usize;
    if len > IDMAP_PATH_FIELD_LEN {
      return Err(DecodeError::PathTooLong {
        field,
        len,
        max: IDMAP_PATH_FIELD_LEN,
      });
    }
    let offset = self.pos;
    let raw = self.take(IDMAP_PATH_FIELD_LEN, field)?;
    let (text, padding) = raw.split_at(len);
    if padding.iter().any(|&b| b != 0) {
      return Err(DecodeError::NonZeroPadding {
        field,
        offset: offset + len,
      });
    }
    std::str::from_utf8(text)
      .map(str::to_string)
      .map_err(|_| DecodeError::InvalidPath { field })
  }
}
