//! Per-file unique names.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

/// Hands out names that are unique within one generated file.
///
/// Counters are kept per domain (usually the language name) and per base
/// token. [`reset`](Self::reset) clears every domain at once and must be
/// called before each file is generated.
#[derive(Debug, Default)]
pub struct UniqueNameGenerator {
    index: HashMap<String, HashMap<String, usize>>,
}

impl UniqueNameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all counters in all domains.
    pub fn reset(&mut self) {
        self.index.clear();
    }

    /// Next name for `base_token` in `domain`.
    ///
    /// The result is `<affix><base_token with lowercased first letter><n><affix>`
    /// where `n` counts up from zero for each distinct adjusted base token.
    pub fn unique_name(&mut self, domain: &str, base_token: &str, affix: &str) -> String {
        let mut chars = base_token.chars();
        let adjusted: String = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };

        let counters = self.index.entry(domain.to_string()).or_default();
        let counter = counters.entry(adjusted.clone()).or_insert(0);
        let index = *counter;
        *counter += 1;

        format!("{affix}{adjusted}{index}{affix}")
    }
}

/// Unique name generator shared between the generator and template helpers.
#[derive(Debug, Clone, Default)]
pub struct SharedUniqueNames(Arc<Mutex<UniqueNameGenerator>>);

impl SharedUniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all counters in all domains.
    pub fn reset(&self) {
        self.with(UniqueNameGenerator::reset);
    }

    /// See [`UniqueNameGenerator::unique_name`].
    pub fn unique_name(&self, domain: &str, base_token: &str, affix: &str) -> String {
        self.with(|generator| generator.unique_name(domain, base_token, affix))
    }

    fn with<R>(&self, f: impl FnOnce(&mut UniqueNameGenerator) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}
