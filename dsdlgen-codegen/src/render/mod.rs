//! Rendering templates into output.
//!
//! - [`TemplateEngine`] - the templating service seam
//! - [`HandlebarsEngine`] - the default engine
//! - [`GenerationContext`] - run-wide values shared by every render
//! - [`RenderData`] - per-file template data

mod context;
mod data;
mod handlebars;

use std::{fmt, io::Write};

use serde_json::Value;

pub use self::handlebars::HandlebarsEngine;
pub use context::GenerationContext;
pub use data::RenderData;

use crate::{Result, template::TemplateRef};

/// A templating service.
///
/// Output is streamed into `out` as it is produced rather than returned
/// as one string.
pub trait TemplateEngine: fmt::Debug {
    fn render_to(&mut self, template: &TemplateRef, data: &Value, out: &mut dyn Write) -> Result<()>;
}
