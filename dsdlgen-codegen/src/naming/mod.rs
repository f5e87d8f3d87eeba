//! Identifier encoding and unique names.
//!
//! - [`IdentifierEncoder`] - turns arbitrary tokens into valid identifiers
//! - [`UniqueNameGenerator`] - per-file unique names for template locals
//! - [`SharedUniqueNames`] - the generator behind a shared handle

mod encoder;
mod unique;

pub use encoder::IdentifierEncoder;
pub use unique::{SharedUniqueNames, UniqueNameGenerator};
