//! Core operations.
//!
//! This module contains the business logic for dsdlgen commands,
//! separated from CLI argument parsing and output rendering.

pub mod generate;
pub mod languages;

pub use generate::{GenerateRequest, generate, list_inputs, load_language};
pub use languages::languages;
