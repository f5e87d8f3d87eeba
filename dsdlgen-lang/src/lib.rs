//! Language rule tables for the dsdlgen code generator.
//!
//! Everything that varies between target languages but needs no code lives
//! here as data:
//!
//! - [`LanguageRules`] - extension, namespace file stem, identifier rules,
//!   name substitution maps and feature flags, loaded from TOML
//! - [`RuleTableLoader`] - layers user overlays on top of a base table
//! - [`BuiltinLanguage`] - the rule tables and templates compiled into dsdlgen
//!
//! Errors are [`miette`] diagnostics pointing at the offending TOML.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod builtin;
mod error;
mod rules;
mod validate;

pub use builtin::{BuiltinLanguage, BundledTemplate};
pub use error::{Error, Result, SourceContext};
pub use rules::{IdentifierRules, LanguageOptions, LanguageRules, LanguageSection, RuleTableLoader};
pub use validate::ILLEGAL_START_PATTERN;
