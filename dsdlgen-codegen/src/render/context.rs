use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::{generator::GenerateOptions, language::Language};

/// Values every template sees as `ctx`, built once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationContext {
    pub generator_version: String,
    /// UTC time of the run, only when auditing info is embedded.
    pub timestamp: Option<String>,
    pub language: String,
    pub omit_serialization_support: bool,
    pub generate_namespace_types: bool,
}

impl GenerationContext {
    pub fn new(language: &Language, options: &GenerateOptions) -> Self {
        let context = Self {
            generator_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: None,
            language: language.name().to_string(),
            omit_serialization_support: options.serialization_support_omitted(language.rules()),
            generate_namespace_types: options.namespace_types_enabled(language.rules()),
        };
        if options.embed_auditing_info {
            context.with_timestamp(Utc::now())
        } else {
            context
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp.to_rfc3339_opts(SecondsFormat::Secs, true));
        self
    }
}
