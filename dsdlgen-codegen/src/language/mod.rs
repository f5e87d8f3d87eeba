//! Target language plugins.
//!
//! A plugin contributes the parts of a language that are not plain data:
//! its base rule table, its bundled templates and its include resolver.
//! Plugins are registered once in a [`LanguageRegistry`] at startup.

mod builtin;
mod registry;

use std::{fmt, path::PathBuf, sync::Arc};

use dsdlgen_lang::{BundledTemplate, LanguageRules, RuleTableLoader};
use tracing::debug;

pub use builtin::BuiltinPlugin;
pub use registry::LanguageRegistry;

use crate::{Result, dependencies::Dependencies, naming::IdentifierEncoder};

/// Capabilities a target language provides to the generator.
pub trait LanguagePlugin: fmt::Debug + Send + Sync {
    /// Name the language is selected by.
    fn name(&self) -> &str;

    /// Loader primed with the language's base rule table.
    fn rule_loader(&self) -> dsdlgen_lang::Result<RuleTableLoader>;

    /// Templates for types and namespaces.
    fn bundled_templates(&self) -> &[BundledTemplate];

    /// Templates for per-language support files.
    fn support_templates(&self) -> &[BundledTemplate] {
        &[]
    }

    /// Standard includes a file needs for the given dependencies, unquoted.
    fn includes(&self, rules: &LanguageRules, _deps: &Dependencies) -> Vec<String> {
        rules.options.std_includes.clone()
    }
}

/// A plugin with its rule table loaded and its encoder built.
#[derive(Debug, Clone)]
pub struct Language {
    plugin: Arc<dyn LanguagePlugin>,
    rules: LanguageRules,
    encoder: IdentifierEncoder,
}

impl Language {
    /// Load the plugin's rule table with `overlays` merged on top, in order.
    pub fn load(plugin: Arc<dyn LanguagePlugin>, overlays: &[PathBuf]) -> Result<Self> {
        let mut loader = plugin.rule_loader()?;
        for overlay in overlays {
            debug!(language = plugin.name(), overlay = %overlay.display(), "applying rule table overlay");
            loader = loader.overlay_file(overlay)?;
        }
        let rules = loader.load()?;
        Self::with_rules(plugin, rules)
    }

    /// Use an already loaded rule table.
    pub fn with_rules(plugin: Arc<dyn LanguagePlugin>, rules: LanguageRules) -> Result<Self> {
        let encoder = IdentifierEncoder::for_language(&rules)?;
        Ok(Self {
            plugin,
            rules,
            encoder,
        })
    }

    pub fn name(&self) -> &str {
        self.rules.name()
    }

    pub fn plugin(&self) -> &dyn LanguagePlugin {
        self.plugin.as_ref()
    }

    pub fn rules(&self) -> &LanguageRules {
        &self.rules
    }

    pub fn encoder(&self) -> &IdentifierEncoder {
        &self.encoder
    }

    /// Standard includes for the given dependencies.
    pub fn includes(&self, deps: &Dependencies) -> Vec<String> {
        self.plugin.includes(&self.rules, deps)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dsdlgen_lang::BuiltinLanguage;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_builtin() {
        let plugin = Arc::new(BuiltinPlugin::new(BuiltinLanguage::C));
        let language = Language::load(plugin, &[]).unwrap();

        assert_eq!(language.name(), "c");
        assert_eq!(language.encoder().encode("if"), "_if");
    }

    #[test]
    fn test_load_with_overlay() {
        let temp = TempDir::new().unwrap();
        let overlay = temp.path().join("c-overrides.toml");
        fs::write(
            &overlay,
            "[language]\nextension = \".hh\"\n\n[identifiers]\nreserved_identifiers = [\"thing\"]\n",
        )
        .unwrap();
        let plugin = Arc::new(BuiltinPlugin::new(BuiltinLanguage::C));

        let language = Language::load(plugin, &[overlay]).unwrap();

        assert_eq!(language.rules().extension(), ".hh");
        assert_eq!(language.encoder().encode("thing"), "_thing");
        assert_eq!(language.encoder().encode("if"), "if");
    }

    #[test]
    fn test_bad_overlay_is_a_language_error() {
        let temp = TempDir::new().unwrap();
        let overlay = temp.path().join("bad.toml");
        fs::write(&overlay, "[identifiers]\nreserved_patterns = [\"(\"]\n").unwrap();
        let plugin = Arc::new(BuiltinPlugin::new(BuiltinLanguage::C));

        let err = Language::load(plugin, &[overlay]).unwrap_err();

        assert!(matches!(err, crate::Error::Language(_)));
    }
}
