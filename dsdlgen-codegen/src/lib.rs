//! Code generation engine for dsdlgen.
//!
//! Takes a [`TypeCatalog`](dsdlgen_ir::TypeCatalog) and a root namespace
//! folder and writes one file per type (and optionally per namespace) for
//! a target language.
//!
//! # Module Organization
//!
//! - [`namespace`] - Namespace tree, output layout, entity iteration
//! - [`dependencies`] - What a set of types references
//! - [`naming`] - Identifier encoding and per-file unique names
//! - [`template`] - Template sources and kind-based resolution
//! - [`render`] - Template engine seam and template data
//! - [`postprocess`] - Line and file post-processors
//! - [`language`] - Language plugins and their registry
//! - [`includes`] - Include lists for type files
//! - [`generator`] - The resolve, render, post-process, write pipeline
//! - [`testing`] - Test utilities (feature-gated)

pub mod dependencies;
mod error;
pub mod generator;
pub mod includes;
pub mod language;
pub mod namespace;
pub mod naming;
pub mod postprocess;
pub mod render;
pub mod template;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{Error, Result};
pub use generator::{CodeGenerator, GenerateOptions};
pub use language::{Language, LanguagePlugin, LanguageRegistry};
pub use namespace::{NamespaceTree, OutputLayout};
