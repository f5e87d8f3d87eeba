//! Template resolution.
//!
//! - [`EntityKind`] - closed set of entity kinds with a static fallback chain
//! - [`TemplateSource`] - override directories and bundled templates
//! - [`TemplateResolver`] - cached breadth-first lookup across sources

mod kind;
mod resolver;
mod source;

pub use kind::EntityKind;
pub use resolver::TemplateResolver;
pub use source::{
    DirectorySource, InlineSource, TEMPLATE_EXTENSION, TemplateLocation, TemplateRef,
    TemplateSource,
};
