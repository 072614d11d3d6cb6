//! CLI integration tests for idmap.

mod common;
mod create_tests;
mod dump_tests;
mod lookup_tests;
mod scan_tests;
