//! Ordered override tables
//!
//! Key order is part of the data: it must survive a round trip through the
//! file, so the entries live in an explicit list with a side index for
//! lookups.

use std::collections::HashMap;

use super::disambiguate::bare_key;

/// One hand-authored or generated `key: value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub key: String,
    pub value: String,
}

impl Override {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Which sub-map of a locale block a table is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// `replaceSync`: actor names
    Sync,
    /// `replaceText`: ability names in the timeline
    Text,
}

impl TableKind {
    pub const ALL: [TableKind; 2] = [TableKind::Sync, TableKind::Text];

    /// Property name in the trigger file
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            TableKind::Sync => "replaceSync",
            TableKind::Text => "replaceText",
        }
    }
}

/// Insertion-ordered `key -> value` list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedTable {
    entries: Vec<Override>,
    positions: HashMap<String, usize>,
}

impl OrderedTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. A repeated key keeps its first position and takes
    /// the new value, the way a repeated property behaves in an object literal.
    pub fn upsert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(&pos) = self.positions.get(&key) {
            self.entries[pos].value = value;
        } else {
            self.positions.insert(key.clone(), self.entries.len());
            self.entries.push(Override { key, value });
        }
    }

    /// Append a key that is known to be new; returns false (and does nothing)
    /// if it already exists.
    pub fn push_new(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.positions.contains_key(&key) {
            return false;
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push(Override {
            key,
            value: value.into(),
        });
        true
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.positions
            .get(key)
            .map(|&pos| self.entries[pos].value.as_str())
    }

    /// First entry whose key, with any lookaround guards removed, equals `bare`
    #[must_use]
    pub fn find_bare(&self, bare: &str) -> Option<&Override> {
        if let Some(&pos) = self.positions.get(bare) {
            return Some(&self.entries[pos]);
        }
        self.entries.iter().find(|entry| bare_key(&entry.key) == bare)
    }

    /// Rename the key at `index`. Returns false if `new_key` is already taken
    /// by another entry.
    pub fn rename_at(&mut self, index: usize, new_key: impl Into<String>) -> bool {
        let new_key = new_key.into();
        let Some(entry) = self.entries.get(index) else {
            return false;
        };
        if entry.key == new_key {
            return true;
        }
        if self.positions.contains_key(&new_key) {
            return false;
        }
        self.positions.remove(&entry.key);
        self.positions.insert(new_key.clone(), index);
        self.entries[index].key = new_key;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Override> {
        self.entries.iter()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OrderedTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, value) in iter {
            table.upsert(key, value);
        }
        table
    }
}

/// The overrides for one locale
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleBlock {
    pub replace_sync: OrderedTable,
    pub replace_text: OrderedTable,
    /// `'missingTranslations': true`
    pub needs_review: bool,
}

impl LocaleBlock {
    #[must_use]
    pub fn table(&self, kind: TableKind) -> &OrderedTable {
        match kind {
            TableKind::Sync => &self.replace_sync,
            TableKind::Text => &self.replace_text,
        }
    }

    pub fn table_mut(&mut self, kind: TableKind) -> &mut OrderedTable {
        match kind {
            TableKind::Sync => &mut self.replace_sync,
            TableKind::Text => &mut self.replace_text,
        }
    }

    /// Total entries across both sub-maps
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.replace_sync.len() + self.replace_text.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_keeps_first_position_last_value() {
        let table: OrderedTable = [("a", "1"), ("b", "2"), ("a", "3")].into_iter().collect();
        assert_eq!(table.keys(), vec!["a", "b"]);
        assert_eq!(table.get("a"), Some("3"));
    }

    #[test]
    fn test_push_new_refuses_existing() {
        let mut table = OrderedTable::new();
        assert!(table.push_new("Stack", "パケット"));
        assert!(!table.push_new("Stack", "other"));
        assert_eq!(table.get("Stack"), Some("パケット"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_find_bare_sees_through_guards() {
        let table: OrderedTable = [("(?<![ ])Burst", "Detonation"), ("Visceral Burst", "x")]
            .into_iter()
            .collect();
        assert_eq!(table.find_bare("Burst").map(|o| o.value.as_str()), Some("Detonation"));
        assert!(table.find_bare("Visceral").is_none());
    }

    #[test]
    fn test_rename_at() {
        let mut table: OrderedTable = [("Ice", "Eis"), ("Ice Storm", "Eissturm")]
            .into_iter()
            .collect();
        assert!(table.rename_at(0, "Ice(?![ ])"));
        assert_eq!(table.keys(), vec!["Ice(?![ ])", "Ice Storm"]);
        assert_eq!(table.get("Ice(?![ ])"), Some("Eis"));
        assert!(table.get("Ice").is_none());
        assert!(!table.rename_at(0, "Ice Storm"));
    }
}
