//! idmap-lib: Core types and logic for resource overlay idmaps
//!
//! This crate provides everything needed to produce and consume idmaps:
//! - `table`: resource tables of target and overlay packages
//! - `matcher`: pairing of target resources with overlay resources
//! - `idmap`: the versioned binary artifact and its codec
//! - `builder` / `store`: building artifacts and persisting them atomically
//! - `scan`: keeping canonical idmaps current for a directory of overlays
//! - `lookup`: configuration-aware resolution through an idmap

pub mod builder;
pub mod consts;
pub mod error;
pub mod idmap;
pub mod lookup;
pub mod matcher;
pub mod platform;
pub mod scan;
pub mod store;
pub mod table;
pub mod util;
