//! Case-insensitive English name -> canonical id index

use std::collections::{BTreeSet, HashMap};

use super::CanonicalId;

/// Maps a lower-cased English display name to every id that carries it.
///
/// Ids are kept in a `BTreeSet` so iteration is ascending and deterministic.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    by_name: HashMap<String, BTreeSet<CanonicalId>>,
}

impl NameIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` under `name`. Blank names are ignored.
    ///
    /// Returns `true` if the id was not already recorded for this name.
    pub fn insert(&mut self, name: &str, id: CanonicalId) -> bool {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return false;
        }
        self.by_name.entry(key).or_default().insert(id)
    }

    /// All ids for `name`, compared case-insensitively
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&BTreeSet<CanonicalId>> {
        self.by_name.get(&name.to_lowercase())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of distinct names
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, CanonicalId)> for NameIndex {
    fn from_iter<I: IntoIterator<Item = (S, CanonicalId)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (name, id) in iter {
            index.insert(name.as_ref(), id);
        }
        index
    }
}
