//! Handlebars adapter.

use std::{collections::HashSet, io::Write};

use dsdlgen_core::{macrofy, to_snake_case};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, RenderErrorReason,
    ScopedJson, handlebars_helper, no_escape,
};
use serde_json::Value;
use tracing::debug;

use super::TemplateEngine;
use crate::{
    Error, Result,
    language::Language,
    naming::{IdentifierEncoder, SharedUniqueNames},
    template::TemplateRef,
};

handlebars_helper!(snake_case_helper: |s: str| to_snake_case(s));
handlebars_helper!(macrofy_helper: |s: str| macrofy(s));

/// Renders templates with Handlebars.
///
/// Templates are compiled on first use. Output is written as the template
/// produces it, nothing is escaped, and these helpers are available:
///
/// - `id` - encode a token into a valid identifier
/// - `unique_name` - a name unique within the current file
/// - `snake_case`, `macrofy` - case conversions
pub struct HandlebarsEngine {
    registry: Handlebars<'static>,
    registered: HashSet<String>,
}

impl HandlebarsEngine {
    pub fn new(language: &Language, unique_names: SharedUniqueNames) -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        registry.register_helper(
            "id",
            Box::new(IdHelper {
                encoder: language.encoder().clone(),
            }),
        );
        registry.register_helper(
            "unique_name",
            Box::new(UniqueNameHelper {
                names: unique_names,
                domain: language.name().to_string(),
                affix: language.rules().identifiers.unique_name_affix.clone(),
            }),
        );
        registry.register_helper("snake_case", Box::new(snake_case_helper));
        registry.register_helper("macrofy", Box::new(macrofy_helper));

        Self {
            registry,
            registered: HashSet::new(),
        }
    }

    fn ensure_registered(&mut self, template: &TemplateRef) -> Result<String> {
        let id = template.id();
        if !self.registered.contains(&id) {
            debug!(template = %id, "compiling template");
            let source = template.read()?;
            self.registry
                .register_template_string(&id, source)
                .map_err(|e| Error::Render {
                    template: id.clone(),
                    message: e.to_string(),
                })?;
            self.registered.insert(id.clone());
        }
        Ok(id)
    }
}

impl std::fmt::Debug for HandlebarsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlebarsEngine")
            .field("registered", &self.registered)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn render_to(&mut self, template: &TemplateRef, data: &Value, out: &mut dyn Write) -> Result<()> {
        let id = self.ensure_registered(template)?;
        self.registry
            .render_to_write(&id, data, out)
            .map_err(|e| Error::Render {
                template: id,
                message: e.to_string(),
            })
    }
}

fn param_as_string(h: &Helper<'_>, name: &'static str) -> std::result::Result<String, RenderError> {
    let value = h
        .param(0)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(name, 0))?
        .value();
    Ok(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

struct IdHelper {
    encoder: IdentifierEncoder,
}

impl HelperDef for IdHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let token = param_as_string(h, "id")?;
        Ok(ScopedJson::Derived(Value::String(self.encoder.encode(&token))))
    }
}

struct UniqueNameHelper {
    names: SharedUniqueNames,
    domain: String,
    affix: String,
}

impl HelperDef for UniqueNameHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let base = param_as_string(h, "unique_name")?;
        let name = self.names.unique_name(&self.domain, &base, &self.affix);
        Ok(ScopedJson::Derived(Value::String(name)))
    }
}
