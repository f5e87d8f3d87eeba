//! Languages command report data structures.

use super::output::{Output, Report};

/// Report data listing the registered languages.
#[derive(Debug)]
pub struct LanguagesReport {
    pub languages: Vec<LanguageInfo>,
}

/// One target language.
#[derive(Debug)]
pub struct LanguageInfo {
    pub name: String,
    /// Extension of generated files.
    pub extension: String,
    /// Namespace files are generated by default.
    pub namespace_files: bool,
    /// Support template stems.
    pub support_files: Vec<String>,
    /// Bundled template stems.
    pub templates: Vec<String>,
}

impl Report for LanguagesReport {
    fn render(&self, out: &mut dyn Output) {
        for (i, language) in self.languages.iter().enumerate() {
            if i > 0 {
                out.newline();
            }
            out.section(&language.name);
            out.key_value("  extension", &language.extension);
            out.key_value(
                "  namespace files",
                if language.namespace_files { "yes" } else { "no" },
            );
            out.key_value("  templates", &language.templates.join(", "));
            if !language.support_files.is_empty() {
                out.key_value("  support", &language.support_files.join(", "));
            }
        }
    }
}
