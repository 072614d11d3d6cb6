//! Human-readable rendering of idmaps.
//!
//! The plain view prints the header and one `target -> overlay` line per
//! overlaid resource. The verbose view prints every field with its byte
//! offset in the binary layout, e.g. `00000000: 504d4449  magic`.

use std::fmt::Write;

use super::codec::{
  ENTRY_SIZE, OFFSET_BLOCK_COUNT, OFFSET_DEBUG, OFFSET_FIRST_BLOCK, OFFSET_FULFILLED_POLICIES, OFFSET_MAGIC,
  OFFSET_OVERLAY_CRC, OFFSET_OVERLAY_PATH, OFFSET_TARGET_CRC, OFFSET_TARGET_PATH, OFFSET_VERSION,
  VALUE_ENTRY_SIZE,
};
use super::types::Idmap;
use crate::table::{ResId, ResourceTable};

/// Render `idmap`, labelling target ids with names from `target` when given.
pub fn dump(idmap: &Idmap, target: Option<&ResourceTable>, verbose: bool) -> String {
  if verbose {
    dump_raw(idmap, target)
  } else {
    dump_pretty(idmap, target)
  }
}

fn label(target: Option<&ResourceTable>, id: ResId) -> Option<String> {
  target.and_then(|table| table.label(id))
}

fn with_label(line: String, label: Option<String>) -> String {
  match label {
    Some(label) => format!("{} {}", line, label),
    None => line,
  }
}

fn dump_pretty(idmap: &Idmap, target: Option<&ResourceTable>) -> String {
  let header = idmap.header();
  let mut out = String::new();

  // Writing to a String cannot fail.
  let _ = writeln!(out, "target path        : {}", header.target_path);
  let _ = writeln!(out, "overlay path       : {}", header.overlay_path);
  let _ = writeln!(out, "target crc         : {:#010x}", header.target_crc);
  let _ = writeln!(out, "overlay crc        : {:#010x}", header.overlay_crc);
  let _ = writeln!(out, "fulfilled policies : {:#010x}", header.fulfilled_policies);
  let _ = writeln!(out, "debug enabled      : {}", header.debug_enabled);

  let multiple = idmap.data().len() > 1;
  for (index, data) in idmap.data().iter().enumerate() {
    if multiple {
      let _ = writeln!(out, "data block {}:", index);
    }

    let mut lines: Vec<(ResId, String)> = Vec::with_capacity(data.len());
    for entry in &data.entries {
      let line = format!("{} -> {}", entry.target_id, entry.overlay_id);
      lines.push((entry.target_id, with_label(line, label(target, entry.target_id))));
    }
    for value in &data.values {
      let line = format!(
        "{} -> {} {:#010x}",
        value.target_id,
        value.data_type.as_str(),
        value.data_value
      );
      lines.push((value.target_id, with_label(line, label(target, value.target_id))));
    }
    lines.sort_by_key(|(id, _)| *id);

    for (_, line) in lines {
      let _ = writeln!(out, "{}", line);
    }
  }

  out
}

struct RawPrinter {
  out: String,
}

impl RawPrinter {
  fn word(&mut self, offset: usize, value: u32, label: &str) {
    let _ = writeln!(self.out, "{:08x}: {:08x}  {}", offset, value, label);
  }

  fn byte(&mut self, offset: usize, value: u8, label: &str) {
    let _ = writeln!(self.out, "{:08x}: {:>8}  {}", offset, format!("{:02x}", value), label);
  }

  fn field(&mut self, offset: usize, label: &str) {
    let _ = writeln!(self.out, "{:08x}: ........  {}", offset, label);
  }
}

fn dump_raw(idmap: &Idmap, target: Option<&ResourceTable>) -> String {
  let header = idmap.header();
  let mut p = RawPrinter { out: String::new() };

  p.word(OFFSET_MAGIC, header.magic, "magic");
  p.word(OFFSET_VERSION, header.version, "version");
  p.word(OFFSET_TARGET_CRC, header.target_crc, "target crc");
  p.word(OFFSET_OVERLAY_CRC, header.overlay_crc, "overlay crc");
  p.word(OFFSET_FULFILLED_POLICIES, header.fulfilled_policies, "fulfilled policies");
  p.byte(OFFSET_DEBUG, u8::from(header.debug_enabled), "debug enabled");
  p.word(OFFSET_TARGET_PATH, header.target_path.len() as u32, "target path length");
  p.field(OFFSET_TARGET_PATH + 4, &format!("target path: {}", header.target_path));
  p.word(OFFSET_OVERLAY_PATH, header.overlay_path.len() as u32, "overlay path length");
  p.field(OFFSET_OVERLAY_PATH + 4, &format!("overlay path: {}", header.overlay_path));
  p.word(OFFSET_BLOCK_COUNT, idmap.data().len() as u32, "data block count");

  let mut offset = OFFSET_FIRST_BLOCK;
  for data in idmap.data() {
    p.word(offset, data.entries.len() as u32, "entry count");
    offset += 4;
    for entry in &data.entries {
      let target_label = match label(target, entry.target_id) {
        Some(name) => format!("target id: {}", name),
        None => "target id".to_string(),
      };
      p.word(offset, entry.target_id.0, &target_label);
      p.word(offset + 4, entry.overlay_id.0, "overlay id");
      offset += ENTRY_SIZE;
    }

    p.word(offset, data.values.len() as u32, "value count");
    offset += 4;
    for value in &data.values {
      let target_label = match label(target, value.target_id) {
        Some(name) => format!("target id: {}", name),
        None => "target id".to_string(),
      };
      p.word(offset, value.target_id.0, &target_label);
      p.byte(
        offset + 4,
        value.data_type as u8,
        &format!("value type: {}", value.data_type.as_str()),
      );
      p.word(offset + 8, value.data_value, "value data");
      offset += VALUE_ENTRY_SIZE;
    }
  }

  p.out
}
