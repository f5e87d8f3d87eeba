use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for rule table operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Carries the text and filename of the rule table currently being loaded so
/// that validation errors can point into it.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error, pointing at `value` if it appears in the source.
    pub fn validation_error(&self, message: impl Into<String>, value: Option<&str>) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: value.and_then(|v| find_value_span(&self.src, v)),
            message: message.into(),
        })
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern_error(&self, pattern: &str, source: regex::Error) -> Box<Error> {
        Box::new(Error::InvalidPattern {
            src: self.named_source(),
            span: find_value_span(&self.src, pattern),
            pattern: pattern.to_string(),
            source,
        })
    }

    /// Create an illegal encoding prefix error.
    pub fn illegal_prefix_error(&self, prefix: &str) -> Box<Error> {
        Box::new(Error::IllegalEncodingPrefix {
            src: self.named_source(),
            span: find_value_span(&self.src, prefix),
            prefix: prefix.to_string(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(code(dsdlgen::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse language rule table")]
    #[diagnostic(code(dsdlgen::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(dsdlgen::invalid_rule))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("invalid reserved pattern '{pattern}'")]
    #[diagnostic(
        code(dsdlgen::invalid_pattern),
        help("reserved patterns use regular expression syntax and are matched from the start of the identifier")
    )]
    InvalidPattern {
        #[source_code]
        src: NamedSource<String>,
        #[label("does not compile")]
        span: Option<SourceSpan>,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("'{prefix}' is not allowed as an encoding prefix")]
    #[diagnostic(
        code(dsdlgen::illegal_prefix),
        help("identifiers may not start with '__' or '_' followed by a capital letter; pick a prefix like 'ZX'")
    )]
    IllegalEncodingPrefix {
        #[source_code]
        src: NamedSource<String>,
        #[label("would produce illegal identifiers")]
        span: Option<SourceSpan>,
        prefix: String,
    },

    #[error("unknown target language '{name}'")]
    #[diagnostic(code(dsdlgen::unknown_language), help("available languages: {available}"))]
    UnknownLanguage { name: String, available: String },
}

/// Find the span of a quoted string value in the TOML source.
pub(crate) fn find_value_span(src: &str, value: &str) -> Option<SourceSpan> {
    if value.is_empty() {
        return None;
    }
    for quote in ['"', '\''] {
        let needle = format!("{quote}{value}{quote}");
        if let Some(pos) = src.find(&needle) {
            return Some(SourceSpan::from((pos + 1, value.len())));
        }
    }
    // Basic strings escape backslashes, so regexes usually appear doubled.
    let escaped = value.replace('\\', "\\\\");
    let needle = format!("\"{escaped}\"");
    src.find(&needle)
        .map(|pos| SourceSpan::from((pos + 1, escaped.len())))
}
