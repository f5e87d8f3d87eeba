//! Core utilities shared across the dsdlgen crates.
//!
//! This crate provides the output file primitives (overwrite policy,
//! permission handling) and the string case helpers exposed to templates.

mod file;
mod utils;

// File operations
pub use file::{FileError, Overwrite, create_output, prepare_destination, set_file_mode};
// String utilities
pub use utils::{macrofy, to_snake_case};
