//! Errors raised by the code generation engine.

use std::path::PathBuf;

use dsdlgen_core::FileError;
use thiserror::Error;

/// Result type for code generation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a generation run.
///
/// None of these are transient: the same inputs always produce the same
/// error, so callers report them rather than retry.
#[derive(Debug, Error)]
pub enum Error {
    /// A language rule is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A rule table failed to load or the language is unknown.
    #[error(transparent)]
    Language(#[from] Box<dsdlgen_lang::Error>),

    /// A namespace's backing source directory does not exist.
    #[error("source directory for namespace '{namespace}' not found: {}", path.display())]
    SourceNotFound { namespace: String, path: PathBuf },

    /// No namespace in the tree owns the type.
    #[error("type '{0}' not found in any namespace")]
    TypeNotFound(String),

    /// Neither the entity kind nor any of its ancestors has a template.
    #[error("no template found for {entity} ({kind} or any of its base kinds)")]
    TemplateNotFound { entity: String, kind: String },

    /// The destination exists and overwriting is disabled.
    #[error("{} exists and overwrite is not allowed", path.display())]
    OverwriteDenied { path: PathBuf },

    /// A post-processor broke its contract.
    #[error("post-processor '{processor}' violated its contract: {message}")]
    PostProcessorContract { processor: String, message: String },

    /// A file post-processor failed on a generated file.
    #[error("post-processor '{processor}' failed on {}: {message}", path.display())]
    PostProcessorFailed {
        processor: String,
        path: PathBuf,
        message: String,
    },

    /// The templating service failed.
    #[error("failed to render '{template}': {message}")]
    Render { template: String, message: String },

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<FileError> for Error {
    fn from(err: FileError) -> Self {
        match err {
            FileError::OverwriteDenied { path } => Error::OverwriteDenied { path },
            FileError::Io { path, source } => Error::Io { path, source },
        }
    }
}
