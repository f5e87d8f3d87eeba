use dsdlgen_lang::{BuiltinLanguage, BundledTemplate, LanguageRules, RuleTableLoader};

use super::LanguagePlugin;
use crate::dependencies::Dependencies;

/// Plugin for a language shipped with dsdlgen.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinPlugin {
    language: BuiltinLanguage,
}

impl BuiltinPlugin {
    pub fn new(language: BuiltinLanguage) -> Self {
        Self { language }
    }

    pub fn language(&self) -> BuiltinLanguage {
        self.language
    }
}

impl LanguagePlugin for BuiltinPlugin {
    fn name(&self) -> &str {
        self.language.as_str()
    }

    fn rule_loader(&self) -> dsdlgen_lang::Result<RuleTableLoader> {
        self.language.loader()
    }

    fn bundled_templates(&self) -> &[BundledTemplate] {
        self.language.templates()
    }

    fn support_templates(&self) -> &[BundledTemplate] {
        self.language.support_templates()
    }

    fn includes(&self, rules: &LanguageRules, deps: &Dependencies) -> Vec<String> {
        let mut includes = rules.options.std_includes.clone();
        let extra = match self.language {
            BuiltinLanguage::C if deps.uses_variable_length_array => Some("stddef.h"),
            BuiltinLanguage::Cpp if deps.uses_variable_length_array => Some("cstddef"),
            _ => None,
        };
        if let Some(extra) = extra {
            if !includes.iter().any(|i| i == extra) {
                includes.push(extra.to_string());
            }
        }
        includes
    }
}
