//! Language rule tables.
//!
//! A rule table tells the generator everything it needs to know about a
//! target language without any code: file extension, namespace file naming,
//! identifier rules, name substitution maps and feature flags.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    str::FromStr,
};

use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result, error::SourceContext, validate};

/// A fully loaded and validated language rule table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageRules {
    /// Language identity and output layout.
    pub language: LanguageSection,
    /// Identifier encoding rules.
    #[serde(default)]
    pub identifiers: IdentifierRules,
    /// Substitutions for schema type names (e.g. `byte` -> `uint8_t`).
    #[serde(default)]
    pub named_types: BTreeMap<String, String>,
    /// Substitutions for literal values (e.g. `true` -> `True`).
    #[serde(default)]
    pub named_values: BTreeMap<String, String>,
    /// Feature flags.
    #[serde(default)]
    pub options: LanguageOptions,
}

/// The `[language]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageSection {
    /// Language name used to select it (e.g. `c`).
    pub name: String,
    /// Extension of generated files, including the dot.
    pub extension: String,
    /// Stem of the per-namespace pseudo-file.
    #[serde(default = "default_namespace_file_stem")]
    pub namespace_file_stem: String,
    /// Whether the language needs a file per namespace (e.g. `__init__.py`).
    #[serde(default)]
    pub has_standard_namespace_files: bool,
    /// Whether identifiers are encoded at all.
    #[serde(default = "default_true")]
    pub enable_stropping: bool,
    /// Skip generating support files.
    #[serde(default)]
    pub omit_serialization_support: bool,
    /// Namespace (as path components) support files are written under.
    #[serde(default = "default_support_namespace")]
    pub support_namespace: Vec<String>,
}

/// The `[identifiers]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct IdentifierRules {
    /// Prepended to reserved identifiers.
    pub stropping_prefix: String,
    /// Appended to reserved identifiers.
    pub stropping_suffix: String,
    /// Prepended to the four hex digits of an encoded character.
    pub encoding_prefix: String,
    /// Surrounds names produced by the unique name generator.
    pub unique_name_affix: String,
    /// Rewrite identifiers starting with `__` or `_` plus a capital letter.
    pub enforce_c_prefix_rules: bool,
    /// Encode any `__` left after stropping.
    pub encode_double_underscores: bool,
    /// Exact reserved words.
    pub reserved_identifiers: BTreeSet<String>,
    /// Regular expressions matched against the start of an identifier.
    pub reserved_patterns: Vec<String>,
}

impl Default for IdentifierRules {
    fn default() -> Self {
        Self {
            stropping_prefix: "_".to_string(),
            stropping_suffix: String::new(),
            encoding_prefix: "ZX".to_string(),
            unique_name_affix: "_".to_string(),
            enforce_c_prefix_rules: false,
            encode_double_underscores: false,
            reserved_identifiers: BTreeSet::new(),
            reserved_patterns: Vec::new(),
        }
    }
}

/// The `[options]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LanguageOptions {
    /// Maximum run of consecutive blank lines kept in generated files.
    pub limit_empty_lines: Option<usize>,
    /// Strip trailing whitespace from every generated line.
    pub trim_trailing_whitespace: bool,
    /// Use `<...>` rather than `"..."` for generated includes.
    pub prefer_system_includes: bool,
    /// Includes added to every generated type.
    pub std_includes: Vec<String>,
    /// Default for namespace file generation when not set on the command line.
    pub generate_namespace_types: Option<bool>,
}

fn default_namespace_file_stem() -> String {
    "_namespace".to_string()
}

fn default_support_namespace() -> Vec<String> {
    vec!["dsdlgen".to_string(), "support".to_string()]
}

fn default_true() -> bool {
    true
}

impl LanguageRules {
    /// Parse a single rule table file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        RuleTableLoader::from_file(path)?.load()
    }

    /// Parse a rule table from a string with a custom filename for error reporting.
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        RuleTableLoader::new(content, filename)?.load()
    }

    /// Name of the language.
    pub fn name(&self) -> &str {
        &self.language.name
    }

    /// Extension of generated files.
    pub fn extension(&self) -> &str {
        &self.language.extension
    }

    /// Whether namespace files are generated unless told otherwise.
    pub fn generate_namespace_types_default(&self) -> bool {
        self.options
            .generate_namespace_types
            .unwrap_or(self.language.has_standard_namespace_files)
    }

    /// Look up a named type substitution, falling back to the input.
    pub fn named_type<'a>(&'a self, name: &'a str) -> &'a str {
        self.named_types.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Look up a named value substitution, falling back to the input.
    pub fn named_value<'a>(&'a self, value: &'a str) -> &'a str {
        self.named_values
            .get(value)
            .map(String::as_str)
            .unwrap_or(value)
    }
}

impl FromStr for LanguageRules {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, "language.toml")
    }
}

/// Loads a rule table, optionally layering user overlays on top.
///
/// Overlays are merged table by table: keys present in an overlay replace
/// the base value, nested tables are merged recursively, and arrays are
/// replaced as a whole.
///
/// # Example
///
/// ```ignore
/// let rules = RuleTableLoader::new(builtin.rules, "c.toml")?
///     .overlay_file("my-c.toml")?
///     .load()?;
/// ```
#[derive(Debug, Clone)]
pub struct RuleTableLoader {
    table: toml::Table,
    source: SourceContext,
}

impl RuleTableLoader {
    /// Start from a rule table held in memory.
    pub fn new(content: &str, filename: &str) -> Result<Self> {
        let source = SourceContext::new(content, filename);
        let table = parse_table(&source)?;
        Ok(Self { table, source })
    }

    /// Start from a rule table file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let (content, filename) = read_file(path.as_ref())?;
        Self::new(&content, &filename)
    }

    /// Merge an overlay held in memory.
    pub fn overlay(mut self, content: &str, filename: &str) -> Result<Self> {
        let source = SourceContext::new(content, filename);
        let overlay = parse_table(&source)?;
        debug!(overlay = filename, base = self.source.filename(), "merging rule table overlay");
        merge_tables(&mut self.table, overlay);
        self.source = source;
        Ok(self)
    }

    /// Merge an overlay file.
    pub fn overlay_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let (content, filename) = read_file(path.as_ref())?;
        self.overlay(&content, &filename)
    }

    /// Deserialize and validate the merged table.
    ///
    /// Validation errors point into the most recently merged source.
    pub fn load(self) -> Result<LanguageRules> {
        let rules: LanguageRules = toml::Value::Table(self.table)
            .try_into()
            .map_err(|e| self.source.parse_error(e))?;
        validate::validate_rules(&rules, &self.source)?;
        Ok(rules)
    }
}

fn read_file(path: &Path) -> Result<(String, String)> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Box::new(Error::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })?;
    Ok((content, path.display().to_string()))
}

fn parse_table(source: &SourceContext) -> Result<toml::Table> {
    toml::from_str(source.src()).map_err(|e| source.parse_error(e))
}

fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[language]
name = "c"
extension = ".h"
"#;

    #[test]
    fn test_defaults() {
        let rules: LanguageRules = MINIMAL.parse().unwrap();

        assert_eq!(rules.name(), "c");
        assert_eq!(rules.extension(), ".h");
        assert_eq!(rules.language.namespace_file_stem, "_namespace");
        assert!(rules.language.enable_stropping);
        assert_eq!(rules.identifiers.stropping_prefix, "_");
        assert_eq!(rules.identifiers.encoding_prefix, "ZX");
        assert!(rules.options.limit_empty_lines.is_none());
        assert!(!rules.generate_namespace_types_default());
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let src = "[language]\nname = \"c\"\nextension = \".h\"\ncolour = \"blue\"\n";
        let err = LanguageRules::from_str_with_filename(src, "c.toml").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_missing_extension_is_an_error() {
        let err = LanguageRules::from_str("[language]\nname = \"c\"\n").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_overlay_merges_tables_and_replaces_arrays() {
        let base = r#"
[language]
name = "c"
extension = ".h"

[identifiers]
reserved_identifiers = ["if", "while"]
encoding_prefix = "ZX"

[options]
trim_trailing_whitespace = true
"#;
        let overlay = r#"
[identifiers]
reserved_identifiers = ["goto"]

[options]
limit_empty_lines = 2
"#;
        let rules = RuleTableLoader::new(base, "c.toml")
            .unwrap()
            .overlay(overlay, "user.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(rules.extension(), ".h");
        assert_eq!(rules.identifiers.encoding_prefix, "ZX");
        assert_eq!(
            rules.identifiers.reserved_identifiers,
            BTreeSet::from(["goto".to_string()])
        );
        assert!(rules.options.trim_trailing_whitespace);
        assert_eq!(rules.options.limit_empty_lines, Some(2));
    }

    #[test]
    fn test_overlay_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("overlay.toml");
        std::fs::write(&path, "[language]\nextension = \".hh\"\n").unwrap();

        let rules = RuleTableLoader::new(MINIMAL, "c.toml")
            .unwrap()
            .overlay_file(&path)
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(rules.extension(), ".hh");
    }

    #[test]
    fn test_named_substitutions() {
        let src = format!("{MINIMAL}\n[named_types]\nbyte = \"uint8_t\"\n\n[named_values]\ntrue = \"1\"\n");
        let rules: LanguageRules = src.parse().unwrap();

        assert_eq!(rules.named_type("byte"), "uint8_t");
        assert_eq!(rules.named_type("float"), "float");
        assert_eq!(rules.named_value("true"), "1");
    }

    #[test]
    fn test_io_error() {
        let err = LanguageRules::from_file("/nonexistent/rules.toml").unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }
}
