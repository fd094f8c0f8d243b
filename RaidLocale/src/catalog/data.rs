//! The read-only catalog object shared by every file in a batch

use std::collections::HashMap;

use super::locale_table::normalize_localized;
use super::sources::{CatalogSource, LoadedSheet, load_all};
use super::{CanonicalId, Catalog, Locale, LocaleTable, NameIndex};
use crate::error::Result;

/// English action names with this prefix are reserved placeholders
const RESERVED_NAME_PREFIX: &str = "_rsv_";

/// Name indexes and locale tables for both catalogs.
///
/// Built once at batch start, then only borrowed.
#[derive(Debug, Clone)]
pub struct CatalogData {
    indexes: HashMap<Catalog, NameIndex>,
    tables: HashMap<(Catalog, Locale), LocaleTable>,
}

/// Summary counts, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub action_names: usize,
    pub actor_names: usize,
    pub locale_tables: usize,
}

impl CatalogData {
    /// Start building a catalog from in-memory rows
    #[must_use]
    pub fn builder() -> CatalogDataBuilder {
        CatalogDataBuilder::default()
    }

    /// Load every source concurrently and assemble the result
    ///
    /// # Errors
    /// Returns an error if any source fails to load.
    pub fn load(sources: &[Box<dyn CatalogSource>]) -> Result<Self> {
        let sheets = load_all(sources)?;
        let data = Self::from_sheets(sheets);
        let stats = data.stats();
        tracing::info!(
            "Catalogs ready: {} action names, {} actor names, {} locale tables",
            stats.action_names,
            stats.actor_names,
            stats.locale_tables
        );
        Ok(data)
    }

    /// Assemble from already-loaded sheets; later sheets win on conflicting ids
    #[must_use]
    pub fn from_sheets(sheets: impl IntoIterator<Item = LoadedSheet>) -> Self {
        let mut builder = Self::builder();
        for sheet in sheets {
            for (id, name) in &sheet.english {
                builder.add_english(sheet.catalog, *id, name);
            }
            for (locale, rows) in &sheet.localized {
                for (id, text) in rows {
                    builder.add_localized(sheet.catalog, *locale, *id, text);
                }
            }
        }
        builder.build()
    }

    /// English name index for `catalog`
    #[must_use]
    pub fn name_index(&self, catalog: Catalog) -> &NameIndex {
        // Both catalogs are always present; see `CatalogDataBuilder::build`
        &self.indexes[&catalog]
    }

    /// Localized text for `catalog` in `locale`, if any source supplied it
    #[must_use]
    pub fn locale_table(&self, catalog: Catalog, locale: Locale) -> Option<&LocaleTable> {
        self.tables.get(&(catalog, locale))
    }

    /// Whether any source supplied text for `locale`
    #[must_use]
    pub fn has_locale(&self, locale: Locale) -> bool {
        Catalog::ALL
            .iter()
            .any(|&catalog| self.locale_table(catalog, locale).is_some())
    }

    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            action_names: self.name_index(Catalog::Action).len(),
            actor_names: self.name_index(Catalog::BNpcName).len(),
            locale_tables: self.tables.len(),
        }
    }
}

/// Incremental constructor for [`CatalogData`]; normalizes as it goes
#[derive(Debug, Default)]
pub struct CatalogDataBuilder {
    indexes: HashMap<Catalog, NameIndex>,
    tables: HashMap<(Catalog, Locale), LocaleTable>,
}

impl CatalogDataBuilder {
    /// Add an English name (chainable)
    #[must_use]
    pub fn english(mut self, catalog: Catalog, id: CanonicalId, name: &str) -> Self {
        self.add_english(catalog, id, name);
        self
    }

    /// Add localized text (chainable)
    #[must_use]
    pub fn localized(mut self, catalog: Catalog, locale: Locale, id: CanonicalId, text: &str) -> Self {
        self.add_localized(catalog, locale, id, text);
        self
    }

    pub fn add_english(&mut self, catalog: Catalog, id: CanonicalId, name: &str) {
        let lower = name.trim().to_lowercase();
        if lower.is_empty() || (catalog == Catalog::Action && lower.starts_with(RESERVED_NAME_PREFIX)) {
            return;
        }
        self.indexes.entry(catalog).or_default().insert(&lower, id);
    }

    pub fn add_localized(&mut self, catalog: Catalog, locale: Locale, id: CanonicalId, text: &str) {
        let table = self.tables.entry((catalog, locale)).or_default();
        if let Some(text) = normalize_localized(catalog, locale, text) {
            table.insert(id, text);
        }
    }

    #[must_use]
    pub fn build(mut self) -> CatalogData {
        for catalog in Catalog::ALL {
            self.indexes.entry(catalog).or_default();
        }
        CatalogData {
            indexes: self.indexes,
            tables: self.tables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_reserved_action_names_skipped() {
        let data = CatalogData::builder()
            .english(Catalog::Action, 1, "_rsv_1_0_1_0_1")
            .english(Catalog::BNpcName, 1, "_rsv_actor")
            .build();
        assert!(data.name_index(Catalog::Action).is_empty());
        assert!(data.name_index(Catalog::BNpcName).contains("_rsv_actor"));
    }

    #[test]
    fn test_from_sheets_merges_sources() {
        let mut api = LoadedSheet::new(Catalog::Action);
        api.english.push((104, "Fireball".to_string()));
        api.localized
            .insert(Locale::De, vec![(104, " Feuerball ".to_string())]);

        let mut community = LoadedSheet::new(Catalog::Action);
        community.localized = BTreeMap::from([(Locale::Ko, vec![(104, "파이어볼".to_string())])]);

        let data = CatalogData::from_sheets([api, community]);
        assert!(data.name_index(Catalog::Action).contains("fireball"));
        assert_eq!(
            data.locale_table(Catalog::Action, Locale::De).unwrap().get(104),
            Some("Feuerball")
        );
        assert_eq!(
            data.locale_table(Catalog::Action, Locale::Ko).unwrap().get(104),
            Some("파이어볼")
        );
        assert!(data.has_locale(Locale::Ko));
        assert!(!data.has_locale(Locale::Fr));
        assert_eq!(data.stats().locale_tables, 2);
    }

    #[test]
    fn test_empty_catalog_has_both_indexes() {
        let data = CatalogData::builder().build();
        assert!(data.name_index(Catalog::Action).is_empty());
        assert!(data.name_index(Catalog::BNpcName).is_empty());
        assert!(data.locale_table(Catalog::Action, Locale::Ja).is_none());
    }
}
