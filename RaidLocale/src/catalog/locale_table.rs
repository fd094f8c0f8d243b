//! Canonical id -> localized display text

use std::collections::HashMap;

use super::{CanonicalId, Catalog, Locale};

/// Localized display text for one (catalog, locale) pair
#[derive(Debug, Clone, Default)]
pub struct LocaleTable {
    texts: HashMap<CanonicalId, String>,
}

impl LocaleTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already-normalized text for `id`, replacing any previous value
    pub fn insert(&mut self, id: CanonicalId, text: impl Into<String>) {
        self.texts.insert(id, text.into());
    }

    #[must_use]
    pub fn get(&self, id: CanonicalId) -> Option<&str> {
        self.texts.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

/// Normalize raw sheet text the same way regardless of which source supplied it.
///
/// Returns `None` for blank text. German actor names have their grammar tags
/// expanded into regex alternations so one key matches every declension.
#[must_use]
pub fn normalize_localized(catalog: Catalog, locale: Locale, raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if catalog == Catalog::BNpcName && locale == Locale::De {
        let expanded = replace_german_grammar_tags(trimmed);
        return (!expanded.is_empty()).then_some(expanded);
    }
    Some(trimmed.to_string())
}

/// Expand `[t]`, `[a]`, `[A]` and `[p]` grammar tags from German `BNpcName` rows
#[must_use]
pub fn replace_german_grammar_tags(name: &str) -> String {
    name.replace("[t]", "(?:der|die|das)")
        .replace("[a]", "(?:e|er|es|en)")
        .replace("[A]", "(?:e|er|es|en)")
        .replace("[p]", "")
        .trim()
        .to_string()
}
