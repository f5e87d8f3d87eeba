//! Rule table validation.

use regex::Regex;

use crate::{LanguageRules, Result, error::SourceContext};

/// Identifiers may not start with these in C-family languages.
pub const ILLEGAL_START_PATTERN: &str = r"(^__)|(^_[A-Z])";

pub(crate) fn validate_rules(rules: &LanguageRules, source: &SourceContext) -> Result<()> {
    let language = &rules.language;

    if !is_language_name(&language.name) {
        return Err(source.validation_error(
            format!(
                "language name '{}' must start with a letter and contain only letters, digits and underscores",
                language.name
            ),
            Some(&language.name),
        ));
    }
    if language.extension.is_empty() {
        return Err(source.validation_error("extension must not be empty", None));
    }
    if language.namespace_file_stem.is_empty() {
        return Err(source.validation_error("namespace_file_stem must not be empty", None));
    }

    let ids = &rules.identifiers;
    for (field, value) in [
        ("stropping_prefix", &ids.stropping_prefix),
        ("stropping_suffix", &ids.stropping_suffix),
        ("unique_name_affix", &ids.unique_name_affix),
        ("encoding_prefix", &ids.encoding_prefix),
    ] {
        if !value.chars().all(is_identifier_char) {
            return Err(source.validation_error(
                format!("{field} '{value}' may only contain letters, digits and underscores"),
                Some(value),
            ));
        }
    }

    if ids.enforce_c_prefix_rules {
        let illegal_start = Regex::new(ILLEGAL_START_PATTERN)
            .map_err(|e| source.invalid_pattern_error(ILLEGAL_START_PATTERN, e))?;
        if illegal_start.is_match(&ids.encoding_prefix) {
            return Err(source.illegal_prefix_error(&ids.encoding_prefix));
        }
    }

    for pattern in &ids.reserved_patterns {
        Regex::new(pattern).map_err(|e| source.invalid_pattern_error(pattern, e))?;
    }

    Ok(())
}

fn is_language_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic()) && chars.all(is_identifier_char)
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
