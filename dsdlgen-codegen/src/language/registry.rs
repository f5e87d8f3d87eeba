use std::{str::FromStr, sync::Arc};

use dsdlgen_lang::BuiltinLanguage;
use indexmap::IndexMap;
use tracing::debug;

use super::{BuiltinPlugin, LanguagePlugin};
use crate::Result;

/// Table of available target languages, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct LanguageRegistry {
    plugins: IndexMap<String, Arc<dyn LanguagePlugin>>,
}

impl LanguageRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in language.
    pub fn with_builtins() -> Self {
        BuiltinLanguage::ALL
            .into_iter()
            .fold(Self::new(), |registry, language| {
                registry.with_plugin(BuiltinPlugin::new(language))
            })
    }

    /// Register a plugin (builder style).
    pub fn with_plugin(mut self, plugin: impl LanguagePlugin + 'static) -> Self {
        self.register(Arc::new(plugin));
        self
    }

    /// Register a plugin, replacing any plugin with the same name.
    pub fn register(&mut self, plugin: Arc<dyn LanguagePlugin>) {
        debug!(language = plugin.name(), "registering language");
        self.plugins.insert(plugin.name().to_string(), plugin);
    }

    /// Look up a language by name or by a built-in alias such as `python`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn LanguagePlugin>> {
        if let Some(plugin) = self.plugins.get(name) {
            return Ok(plugin.clone());
        }
        if let Some(plugin) = BuiltinLanguage::from_str(name)
            .ok()
            .and_then(|builtin| self.plugins.get(builtin.as_str()))
        {
            return Ok(plugin.clone());
        }
        Err(Box::new(dsdlgen_lang::Error::UnknownLanguage {
            name: name.to_string(),
            available: self.names().collect::<Vec<_>>().join(", "),
        })
        .into())
    }

    /// Registered language names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn LanguagePlugin> {
        self.plugins.values().map(|p| p.as_ref())
    }
}
