//! Identifier encoding ("stropping").

use std::collections::BTreeSet;

use dsdlgen_lang::{ILLEGAL_START_PATTERN, IdentifierRules, LanguageRules};
use regex::{Captures, Regex};

use crate::{Error, Result};

/// Characters that need replacing: a leading digit, whitespace runs, and
/// anything outside `[A-Za-z0-9_]`.
const TOKEN_PATTERN: &str = r"(^[0-9])|(\s+)|[^a-zA-Z0-9_]";

/// One-way transform from an arbitrary token into a valid, non-reserved
/// identifier of the target language.
///
/// The transform is pure: the same token always produces the same
/// identifier for a given rule table.
///
/// # Example
///
/// ```ignore
/// let encoder = IdentifierEncoder::new(&c_rules.identifiers)?;
/// assert_eq!(encoder.encode("if"), "_if");
/// assert_eq!(encoder.encode("I ❤ c"), "I_ZX2764_c");
/// ```
#[derive(Debug, Clone)]
pub struct IdentifierEncoder {
    enabled: bool,
    stropping_prefix: String,
    stropping_suffix: String,
    encoding_prefix: String,
    reserved_identifiers: BTreeSet<String>,
    reserved_patterns: Vec<Regex>,
    token_pattern: Regex,
    illegal_start: Option<Regex>,
    encode_double_underscores: bool,
}

impl IdentifierEncoder {
    /// Build an encoder from a rule table's identifier section.
    ///
    /// Fails if a reserved pattern does not compile or if the encoding
    /// prefix could itself produce an illegal identifier.
    pub fn new(rules: &IdentifierRules) -> Result<Self> {
        let illegal_start = if rules.enforce_c_prefix_rules {
            let re = compile(ILLEGAL_START_PATTERN)?;
            if re.is_match(&rules.encoding_prefix) {
                return Err(Error::Configuration(format!(
                    "'{}' is not allowed as an encoding prefix since it can result in illegal identifiers",
                    rules.encoding_prefix
                )));
            }
            Some(re)
        } else {
            None
        };

        let reserved_patterns = rules
            .reserved_patterns
            .iter()
            .map(|p| compile(&format!("^(?:{p})")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            enabled: true,
            stropping_prefix: rules.stropping_prefix.clone(),
            stropping_suffix: rules.stropping_suffix.clone(),
            encoding_prefix: rules.encoding_prefix.clone(),
            reserved_identifiers: rules.reserved_identifiers.clone(),
            reserved_patterns,
            token_pattern: compile(TOKEN_PATTERN)?,
            illegal_start,
            encode_double_underscores: rules.encode_double_underscores,
        })
    }

    /// Build the encoder for a language; when the language disables
    /// stropping the encoder passes tokens through unchanged.
    pub fn for_language(rules: &LanguageRules) -> Result<Self> {
        let mut encoder = Self::new(&rules.identifiers)?;
        encoder.enabled = rules.language.enable_stropping;
        Ok(encoder)
    }

    /// Encode a single character as `<prefix><hex codepoint>`.
    pub fn encode_character(&self, c: char) -> String {
        format!("{}{:04X}", self.encoding_prefix, c as u32)
    }

    /// Returns true if `identifier` is a reserved word or starts with a
    /// reserved pattern.
    pub fn is_reserved(&self, identifier: &str) -> bool {
        self.reserved_identifiers.contains(identifier)
            || self.reserved_patterns.iter().any(|p| p.is_match(identifier))
    }

    /// Encode `token` into a valid identifier.
    pub fn encode(&self, token: &str) -> String {
        if !self.enabled {
            return token.to_string();
        }
        let filtered = self.replace_illegal_characters(token);

        let stropped = if self.is_reserved(&filtered) {
            format!(
                "{}{}{}",
                self.stropping_prefix, filtered, self.stropping_suffix
            )
        } else {
            filtered
        };

        let corrected = match &self.illegal_start {
            Some(illegal_start) => self.correct_illegal_start(illegal_start, stropped),
            None => stropped,
        };

        if self.encode_double_underscores {
            corrected.replace("__", &format!("_{}", self.encode_character('_')))
        } else {
            corrected
        }
    }

    fn replace_illegal_characters(&self, token: &str) -> String {
        self.token_pattern
            .replace_all(token, |caps: &Captures| {
                if let Some(digit) = caps.get(1) {
                    digit
                        .as_str()
                        .chars()
                        .map(|c| self.encode_character(c))
                        .collect()
                } else if caps.get(2).is_some() {
                    "_".to_string()
                } else {
                    caps[0].chars().map(|c| self.encode_character(c)).collect()
                }
            })
            .into_owned()
    }

    /// Rewrite a leading `__` or `_[A-Z]`.
    ///
    /// `__` becomes `_` plus the encoded underscore, `_X` becomes `_x`. If
    /// the rewrite lands on a reserved identifier the leading underscore is
    /// encoded as well.
    fn correct_illegal_start(&self, illegal_start: &Regex, identifier: String) -> String {
        let Some(caps) = illegal_start.captures(&identifier) else {
            return identifier;
        };

        let corrected = if caps.get(1).is_some() {
            format!("_{}{}", self.encode_character('_'), &identifier[2..])
        } else {
            let capital = &identifier[1..2];
            format!("_{}{}", capital.to_lowercase(), &identifier[2..])
        };

        if self.is_reserved(&corrected) {
            format!("{}{}", self.encode_character('_'), &corrected[1..])
        } else {
            corrected
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::Configuration(format!("invalid pattern '{pattern}': {e}")))
}
