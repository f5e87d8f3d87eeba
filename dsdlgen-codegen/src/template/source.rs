//! Where templates come from.

use std::{
    fmt, fs,
    path::PathBuf,
    sync::Arc,
};

use dsdlgen_lang::BundledTemplate;

use crate::{Error, Result};

/// File extension of template files.
pub const TEMPLATE_EXTENSION: &str = "hbs";

/// A template found by a [`TemplateSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRef {
    stem: String,
    location: TemplateLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLocation {
    /// A `<stem>.hbs` file on disk.
    File(PathBuf),
    /// Template text held in memory, e.g. compiled into the binary.
    Inline { origin: String, source: Arc<str> },
}

impl TemplateRef {
    pub fn file(stem: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            stem: stem.into(),
            location: TemplateLocation::File(path.into()),
        }
    }

    pub fn inline(stem: impl Into<String>, origin: impl Into<String>, source: impl Into<Arc<str>>) -> Self {
        Self {
            stem: stem.into(),
            location: TemplateLocation::Inline {
                origin: origin.into(),
                source: source.into(),
            },
        }
    }

    /// Template stem (the entity kind name for type templates).
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn location(&self) -> &TemplateLocation {
        &self.location
    }

    /// Stable identifier, unique across sources.
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// Template text.
    pub fn read(&self) -> Result<String> {
        match &self.location {
            TemplateLocation::File(path) => {
                fs::read_to_string(path).map_err(|e| Error::io(path, e))
            }
            TemplateLocation::Inline { source, .. } => Ok(source.to_string()),
        }
    }
}

impl fmt::Display for TemplateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            TemplateLocation::File(path) => write!(f, "{}", path.display()),
            TemplateLocation::Inline { origin, .. } => {
                write!(f, "{origin}:{}.{TEMPLATE_EXTENSION}", self.stem)
            }
        }
    }
}

/// A place templates can be looked up by stem.
pub trait TemplateSource: fmt::Debug + Send + Sync {
    /// Human readable description for logs.
    fn describe(&self) -> String;

    /// The template named `stem`, if this source has one.
    fn find(&self, stem: &str) -> Option<TemplateRef>;

    /// Every template in this source, sorted by stem.
    fn list(&self) -> Result<Vec<TemplateRef>>;
}

/// Templates in a directory, one `<stem>.hbs` file each.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Fails if `dir` is not an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(Error::Configuration(format!(
                "template directory {} does not exist",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }
}

impl TemplateSource for DirectorySource {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    fn find(&self, stem: &str) -> Option<TemplateRef> {
        let path = self.dir.join(format!("{stem}.{TEMPLATE_EXTENSION}"));
        path.is_file().then(|| TemplateRef::file(stem, path))
    }

    fn list(&self) -> Result<Vec<TemplateRef>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| Error::io(&self.dir, e))?;
        let mut templates = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                templates.push(TemplateRef::file(stem, &path));
            }
        }
        templates.sort_by(|a, b| a.stem.cmp(&b.stem));
        Ok(templates)
    }
}

/// Templates held in memory.
#[derive(Debug, Clone, Default)]
pub struct InlineSource {
    origin: String,
    templates: Vec<(String, Arc<str>)>,
}

impl InlineSource {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            templates: Vec::new(),
        }
    }

    /// Source over templates compiled into the binary.
    pub fn bundled(origin: impl Into<String>, templates: &[BundledTemplate]) -> Self {
        templates
            .iter()
            .fold(Self::new(origin), |source, t| source.with_template(t.name, t.source))
    }

    /// Add or replace a template.
    pub fn with_template(mut self, stem: impl Into<String>, source: impl Into<Arc<str>>) -> Self {
        let stem = stem.into();
        self.templates.retain(|(existing, _)| *existing != stem);
        self.templates.push((stem, source.into()));
        self
    }
}

impl TemplateSource for InlineSource {
    fn describe(&self) -> String {
        format!("bundled templates ({})", self.origin)
    }

    fn find(&self, stem: &str) -> Option<TemplateRef> {
        self.templates
            .iter()
            .find(|(name, _)| name == stem)
            .map(|(name, source)| TemplateRef::inline(name.clone(), self.origin.clone(), source.clone()))
    }

    fn list(&self) -> Result<Vec<TemplateRef>> {
        let mut templates: Vec<_> = self
            .templates
            .iter()
            .map(|(name, source)| TemplateRef::inline(name.clone(), self.origin.clone(), source.clone()))
            .collect();
        templates.sort_by(|a, b| a.stem.cmp(&b.stem));
        Ok(templates)
    }
}
