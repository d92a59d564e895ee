#![forbid(unsafe_code)]
//! Filesystem, pattern matching, archiving, and process helpers for the Kover step.

pub mod archive;
pub mod error;
pub mod find;
pub mod fs;
pub mod process;
