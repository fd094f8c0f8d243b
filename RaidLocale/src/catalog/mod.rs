//! Game data catalogs
//!
//! Name-indexed views over the two game data sheets a raidboss file refers to:
//!
//! - **Action**: abilities, keyed by the English `Name` field
//! - **BNpcName**: actors, keyed by the English `Singular` field
//!
//! A catalog is loaded once per batch from one or more [`CatalogSource`]s and
//! assembled into an immutable [`CatalogData`] that every file-processing
//! call borrows.
//!
//! # Usage
//!
//! ```
//! use raidlocale::catalog::{Catalog, CatalogData, Locale};
//!
//! let data = CatalogData::builder()
//!     .english(Catalog::Action, 0xB533, "Arcadian Hell")
//!     .localized(Catalog::Action, Locale::De, 0xB533, "Arkadische Hölle")
//!     .build();
//!
//! let ids = data.name_index(Catalog::Action).lookup("arcadian hell");
//! assert_eq!(ids.map(|ids| ids.len()), Some(1));
//! ```

mod data;
mod locale_table;
mod name_index;
mod sources;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use data::{CatalogData, CatalogDataBuilder, CatalogStats};
pub use locale_table::{LocaleTable, normalize_localized, replace_german_grammar_tags};
pub use name_index::NameIndex;
pub use sources::{
    CatalogSource, CommunityCsv, LoadedSheet, XivApiDump, default_sources, load_all,
    parse_api_dump, parse_community_csv,
};

/// Stable numeric row id of one entity in one catalog.
pub type CanonicalId = u32;

/// The game data sheets a raidboss file draws names from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Catalog {
    /// Abilities (`Action` sheet)
    Action,
    /// Actors (`BNpcName` sheet)
    BNpcName,
}

impl Catalog {
    /// Both catalogs, in load order
    pub const ALL: [Catalog; 2] = [Catalog::Action, Catalog::BNpcName];

    /// Sheet name, also the base file name of dumps and community tables
    #[must_use]
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Action => "Action",
            Self::BNpcName => "BNpcName",
        }
    }

    /// Column holding the display text
    #[must_use]
    pub fn text_field(self) -> &'static str {
        match self {
            Self::Action => "Name",
            Self::BNpcName => "Singular",
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Where a locale's display text comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleOrigin {
    /// The language file keys are written in; never resolved
    Source,
    /// Structured-data API dump (`Name@de` style fields)
    Api,
    /// Community-maintained datamining tables
    Community,
}

/// A `timelineReplace` locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    De,
    Fr,
    Ja,
    Cn,
    Ko,
    Tc,
}

impl Locale {
    /// Every locale, in emission order
    pub const ALL: [Locale; 7] = [
        Locale::En,
        Locale::De,
        Locale::Fr,
        Locale::Ja,
        Locale::Cn,
        Locale::Ko,
        Locale::Tc,
    ];

    /// Locales that receive resolved translations
    pub const MANAGED: [Locale; 6] = [
        Locale::De,
        Locale::Fr,
        Locale::Ja,
        Locale::Cn,
        Locale::Ko,
        Locale::Tc,
    ];

    /// The code used in `'locale': '..'`
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Fr => "fr",
            Self::Ja => "ja",
            Self::Cn => "cn",
            Self::Ko => "ko",
            Self::Tc => "tc",
        }
    }

    /// Parse a locale code; case-sensitive like the tables themselves
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }

    #[must_use]
    pub fn origin(self) -> LocaleOrigin {
        match self {
            Self::En => LocaleOrigin::Source,
            Self::De | Self::Fr | Self::Ja => LocaleOrigin::Api,
            Self::Cn | Self::Ko | Self::Tc => LocaleOrigin::Community,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(&s.to_lowercase()).ok_or_else(|| Error::UnknownLocale(s.to_string()))
    }
}
