//! Output file naming.

use std::path::{Path, PathBuf};

use dsdlgen_ir::TypeKey;
use dsdlgen_lang::LanguageRules;

use crate::naming::IdentifierEncoder;

/// Where generated files go and what they are called.
///
/// Types are written to `<output_dir>/<encoded namespace components>/<short>_<major>_<minor><ext>`
/// and namespace files to `<output_dir>/<encoded components>/<stem><ext>`.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    output_dir: PathBuf,
    extension: String,
    namespace_file_stem: String,
    encoder: IdentifierEncoder,
}

impl OutputLayout {
    /// Layout using the rule table's extension and namespace file stem.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        rules: &LanguageRules,
        encoder: IdentifierEncoder,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: rules.language.extension.clone(),
            namespace_file_stem: rules.language.namespace_file_stem.clone(),
            encoder,
        }
    }

    /// Override the extension of generated files.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.extension = if extension.starts_with('.') || extension.is_empty() {
            extension
        } else {
            format!(".{extension}")
        };
        self
    }

    /// Override the namespace file stem.
    pub fn with_namespace_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.namespace_file_stem = stem.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn encoder(&self) -> &IdentifierEncoder {
        &self.encoder
    }

    /// Folder for a namespace, relative to the output directory.
    pub fn relative_folder<'s>(&self, components: impl IntoIterator<Item = &'s str>) -> PathBuf {
        components
            .into_iter()
            .map(|c| self.encoder.encode(c))
            .collect()
    }

    /// Namespace file name (stem plus extension).
    pub fn namespace_file_name(&self) -> String {
        format!("{}{}", self.namespace_file_stem, self.extension)
    }

    /// File stem of a type: `<short>_<major>_<minor>`.
    pub fn type_file_stem(key: &TypeKey) -> String {
        format!(
            "{}_{}_{}",
            key.short_name(),
            key.version.major,
            key.version.minor
        )
    }

    /// File name of a type, with extension.
    pub fn type_file_name(&self, key: &TypeKey) -> String {
        format!("{}{}", Self::type_file_stem(key), self.extension)
    }

    /// Path of a type's file relative to the output directory.
    pub fn relative_type_path(&self, key: &TypeKey) -> PathBuf {
        let namespace = key
            .full_name
            .rsplit_once('.')
            .map(|(ns, _)| ns)
            .unwrap_or("");
        self.relative_folder(namespace.split('.').filter(|c| !c.is_empty()))
            .join(self.type_file_name(key))
    }
}

#[cfg(test)]
mod tests {
    use dsdlgen_ir::Version;
    use dsdlgen_lang::BuiltinLanguage;

    use super::*;

    fn c_layout() -> OutputLayout {
        let rules = BuiltinLanguage::C.rules().unwrap();
        let encoder = IdentifierEncoder::for_language(&rules).unwrap();
        OutputLayout::new("out", &rules, encoder)
    }

    #[test]
    fn test_relative_type_path() {
        let key = TypeKey::new("uavcan.node.Heartbeat", Version::new(1, 0));
        assert_eq!(
            c_layout().relative_type_path(&key),
            PathBuf::from("uavcan/node/Heartbeat_1_0.h")
        );
    }

    #[test]
    fn test_components_are_encoded() {
        let key = TypeKey::new("vendor.if.Thing", Version::new(0, 3));
        assert_eq!(
            c_layout().relative_type_path(&key),
            PathBuf::from("vendor/_if/Thing_0_3.h")
        );
    }

    #[test]
    fn test_extension_override() {
        let layout = c_layout().with_extension("hh");
        assert_eq!(layout.extension(), ".hh");
        assert_eq!(layout.namespace_file_name(), "_namespace.hh");
    }
}
