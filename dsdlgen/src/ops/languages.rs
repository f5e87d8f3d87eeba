//! Languages operation - describe every registered target language.

use dsdlgen_codegen::{Language, LanguageRegistry, Result};

use crate::reports::{LanguageInfo, LanguagesReport};

/// Execute the languages operation.
///
/// Loads every plugin's base rule table so the report shows the values
/// a run would use.
pub fn languages(registry: &LanguageRegistry) -> Result<LanguagesReport> {
    let mut languages = Vec::new();
    for name in registry.names() {
        let language = Language::load(registry.get(name)?, &[])?;
        let rules = language.rules();
        languages.push(LanguageInfo {
            name: language.name().to_string(),
            extension: rules.extension().to_string(),
            namespace_files: rules.generate_namespace_types_default(),
            support_files: language
                .plugin()
                .support_templates()
                .iter()
                .map(|t| t.name.to_string())
                .collect(),
            templates: language
                .plugin()
                .bundled_templates()
                .iter()
                .map(|t| t.name.to_string())
                .collect(),
        });
    }
    Ok(LanguagesReport { languages })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_languages() {
        let report = languages(&LanguageRegistry::with_builtins()).unwrap();

        let names: Vec<_> = report.languages.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["c", "cpp", "py", "js"]);

        let py = &report.languages[2];
        assert_eq!(py.extension, ".py");
        assert!(py.namespace_files);
        assert!(py.support_files.is_empty());

        let c = &report.languages[0];
        assert_eq!(c.support_files, vec!["serialization"]);
        assert!(c.templates.contains(&"ServiceType".to_string()));
    }
}
