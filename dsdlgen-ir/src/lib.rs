//! Composite type model for the dsdlgen code generator.
//!
//! The schema front-end parses definition files and hands the generator a
//! flat list of [`CompositeType`] values. This crate holds those types and the
//! [`TypeCatalog`] that resolves [`TypeKey`] references between them.
//!
//! # Architecture
//!
//! ```text
//! *.dsdl → front-end (parsing) → dsdlgen-ir (types.json) → dsdlgen-codegen
//! ```
//!
//! The model is:
//! - Immutable once handed to the generator
//! - Language-agnostic (no target-specific naming)
//! - Serializable, so a front-end in any language can produce it

mod catalog;
mod composite;
mod types;

pub use catalog::{CatalogError, TypeCatalog};
pub use composite::{Attribute, AttributeKind, CompositeKind, CompositeType, TypeKey, Version};
pub use types::{ArrayCapacity, DataType, PrimitiveType};
