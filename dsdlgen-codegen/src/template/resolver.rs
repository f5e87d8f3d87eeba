//! Template lookup along the entity kind hierarchy.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::{EntityKind, TemplateRef, TemplateSource};
use crate::{Error, Result, namespace::Entity};

/// Resolves the template for an entity.
///
/// Candidates are tried kind by kind in [`EntityKind::search_order`]; for
/// each kind every source is asked in priority order and the first hit
/// wins. Hits are cached per originating kind, misses are not.
#[derive(Debug, Default)]
pub struct TemplateResolver {
    sources: Vec<Box<dyn TemplateSource>>,
    cache: HashMap<EntityKind, TemplateRef>,
}

impl TemplateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source with lower priority than those already added.
    pub fn with_source(mut self, source: impl TemplateSource + 'static) -> Self {
        self.add_source(Box::new(source));
        self
    }

    pub fn add_source(&mut self, source: Box<dyn TemplateSource>) {
        // Resolution results may change with a new source.
        self.cache.clear();
        self.sources.push(source);
    }

    /// Insert a source at `index` in priority order, 0 being the highest.
    pub fn insert_source(&mut self, index: usize, source: Box<dyn TemplateSource>) {
        self.cache.clear();
        self.sources.insert(index.min(self.sources.len()), source);
    }

    /// Template for an entity kind.
    pub fn resolve(&mut self, kind: EntityKind) -> Result<TemplateRef> {
        self.resolve_for(kind, kind.name())
    }

    /// Template for a type or namespace.
    pub fn resolve_entity(&mut self, entity: &Entity<'_>) -> Result<TemplateRef> {
        self.resolve_for(EntityKind::of_entity(entity), entity.full_name())
    }

    fn resolve_for(&mut self, kind: EntityKind, entity: &str) -> Result<TemplateRef> {
        if let Some(template) = self.cache.get(&kind) {
            trace!(%kind, template = %template, "template cache hit");
            return Ok(template.clone());
        }

        for candidate in kind.search_order() {
            for source in &self.sources {
                debug!(%kind, candidate = candidate.name(), source = %source.describe(), "looking for template");
                if let Some(template) = source.find(candidate.name()) {
                    debug!(%kind, template = %template, "resolved template");
                    self.cache.insert(kind, template.clone());
                    return Ok(template);
                }
            }
        }

        Err(Error::TemplateNotFound {
            entity: entity.to_string(),
            kind: kind.name().to_string(),
        })
    }

    /// Every template in every source, highest priority source first.
    pub fn list_templates(&self) -> Result<Vec<TemplateRef>> {
        let mut templates = Vec::new();
        for source in &self.sources {
            templates.extend(source.list()?);
        }
        Ok(templates)
    }

    /// Drop all cached resolutions.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
