//! Built-in target languages.

use std::{fmt, str::FromStr};

use crate::{LanguageRules, Result, RuleTableLoader};

/// A template compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BundledTemplate {
    /// Template stem (e.g. `CompositeType`, `serialization`).
    pub name: &'static str,
    /// Template text.
    pub source: &'static str,
}

macro_rules! bundled {
    ($dir:literal, $lang:literal, [$($name:literal),* $(,)?]) => {
        &[$(BundledTemplate {
            name: $name,
            source: include_str!(concat!("../", $dir, "/", $lang, "/", $name, ".hbs")),
        }),*]
    };
}

const C_TEMPLATES: &[BundledTemplate] =
    bundled!("templates", "c", ["CompositeType", "ServiceType", "Namespace"]);
const C_SUPPORT: &[BundledTemplate] = bundled!("support", "c", ["serialization"]);
const CPP_TEMPLATES: &[BundledTemplate] =
    bundled!("templates", "cpp", ["CompositeType", "Namespace"]);
const CPP_SUPPORT: &[BundledTemplate] = bundled!("support", "cpp", ["serialization"]);
const PY_TEMPLATES: &[BundledTemplate] =
    bundled!("templates", "py", ["CompositeType", "ServiceType", "Namespace"]);
const JS_TEMPLATES: &[BundledTemplate] =
    bundled!("templates", "js", ["SerializableType", "Namespace"]);

/// Target languages shipped with dsdlgen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinLanguage {
    /// C11
    C,
    /// C++14
    Cpp,
    /// Python 3
    Python,
    /// JavaScript (ES modules)
    JavaScript,
}

impl BuiltinLanguage {
    /// All built-in languages in registration order.
    pub const ALL: [BuiltinLanguage; 4] = [
        BuiltinLanguage::C,
        BuiltinLanguage::Cpp,
        BuiltinLanguage::Python,
        BuiltinLanguage::JavaScript,
    ];

    /// Returns the language identifier as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuiltinLanguage::C => "c",
            BuiltinLanguage::Cpp => "cpp",
            BuiltinLanguage::Python => "py",
            BuiltinLanguage::JavaScript => "js",
        }
    }

    /// Text of the built-in rule table.
    pub fn rules_source(&self) -> &'static str {
        match self {
            BuiltinLanguage::C => include_str!("../rules/c.toml"),
            BuiltinLanguage::Cpp => include_str!("../rules/cpp.toml"),
            BuiltinLanguage::Python => include_str!("../rules/py.toml"),
            BuiltinLanguage::JavaScript => include_str!("../rules/js.toml"),
        }
    }

    /// Loader primed with the built-in rule table, ready for overlays.
    pub fn loader(&self) -> Result<RuleTableLoader> {
        RuleTableLoader::new(self.rules_source(), &format!("{}.toml", self.as_str()))
    }

    /// Load the built-in rule table.
    pub fn rules(&self) -> Result<LanguageRules> {
        self.loader()?.load()
    }

    /// Templates for types and namespaces.
    pub fn templates(&self) -> &'static [BundledTemplate] {
        match self {
            BuiltinLanguage::C => C_TEMPLATES,
            BuiltinLanguage::Cpp => CPP_TEMPLATES,
            BuiltinLanguage::Python => PY_TEMPLATES,
            BuiltinLanguage::JavaScript => JS_TEMPLATES,
        }
    }

    /// Templates for support files.
    pub fn support_templates(&self) -> &'static [BundledTemplate] {
        match self {
            BuiltinLanguage::C => C_SUPPORT,
            BuiltinLanguage::Cpp => CPP_SUPPORT,
            BuiltinLanguage::Python | BuiltinLanguage::JavaScript => &[],
        }
    }
}

impl fmt::Display for BuiltinLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BuiltinLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" => Ok(BuiltinLanguage::C),
            "cpp" | "c++" | "cxx" => Ok(BuiltinLanguage::Cpp),
            "py" | "python" => Ok(BuiltinLanguage::Python),
            "js" | "javascript" => Ok(BuiltinLanguage::JavaScript),
            _ => Err(format!(
                "unknown language '{}', expected one of 'c', 'cpp', 'py', 'js'",
                s
            )),
        }
    }
}
