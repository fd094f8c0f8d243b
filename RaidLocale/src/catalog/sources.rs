//! Catalog sources
//!
//! Two shapes of data feed a [`CatalogData`](super::CatalogData):
//!
//! - **Structured-API dumps** (`Action.json`, `BNpcName.json`): rows of
//!   `{ "row_id": 7, "fields": { "Name": "..", "Name@de": ".." } }`, either as a
//!   bare array or wrapped in `{ "rows": [...] }`. These supply the English
//!   names and the `de`/`fr`/`ja` text.
//! - **Community tables** (`<locale>/Action.csv`): datamining CSVs with a
//!   `#` header row, an optional type row, then one row per id. These supply
//!   `cn`/`ko`/`tc` text.
//!
//! Every source is loaded on the rayon pool and the batch waits for all of
//! them before any file is processed.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Deserialize;

use super::{CanonicalId, Catalog, Locale, LocaleOrigin};
use crate::error::{Error, Result};

/// Raw rows produced by one source, before normalization
#[derive(Debug, Clone)]
pub struct LoadedSheet {
    pub catalog: Catalog,
    /// English names, when the source carries them
    pub english: Vec<(CanonicalId, String)>,
    /// Localized text per locale
    pub localized: BTreeMap<Locale, Vec<(CanonicalId, String)>>,
}

impl LoadedSheet {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            english: Vec::new(),
            localized: BTreeMap::new(),
        }
    }
}

/// Something that can produce catalog rows
pub trait CatalogSource: Send + Sync {
    /// Short description for logs and errors
    fn describe(&self) -> String;

    /// Read the rows
    fn load(&self) -> Result<LoadedSheet>;
}

// -----------------------------------------------------------------------------
// Structured-API dump
// -----------------------------------------------------------------------------

/// JSON dump of one sheet from the structured-data API
#[derive(Debug, Clone)]
pub struct XivApiDump {
    path: PathBuf,
    catalog: Catalog,
    locales: Vec<Locale>,
}

impl XivApiDump {
    /// Dump at `<dir>/<Sheet>.json`, reading the given API locales
    #[must_use]
    pub fn in_dir(dir: &Path, catalog: Catalog, locales: &[Locale]) -> Self {
        Self {
            path: dir.join(format!("{}.json", catalog.sheet_name())),
            catalog,
            locales: locales
                .iter()
                .copied()
                .filter(|l| l.origin() == LocaleOrigin::Api)
                .collect(),
        }
    }
}

impl CatalogSource for XivApiDump {
    fn describe(&self) -> String {
        format!("{} dump ({})", self.catalog, self.path.display())
    }

    fn load(&self) -> Result<LoadedSheet> {
        let file = File::open(&self.path)?;
        parse_api_dump(std::io::BufReader::new(file), self.catalog, &self.locales)
    }
}

#[derive(Deserialize)]
struct ApiRow {
    row_id: CanonicalId,
    #[serde(default)]
    fields: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ApiDump {
    Rows(Vec<ApiRow>),
    Sheet { rows: Vec<ApiRow> },
}

/// Parse a structured-API dump
///
/// # Errors
/// Returns an error if the JSON does not have the row shape.
pub fn parse_api_dump<R: Read>(
    reader: R,
    catalog: Catalog,
    locales: &[Locale],
) -> Result<LoadedSheet> {
    let rows = match serde_json::from_reader::<_, ApiDump>(reader)? {
        ApiDump::Rows(rows) | ApiDump::Sheet { rows } => rows,
    };

    let field = catalog.text_field();
    let mut sheet = LoadedSheet::new(catalog);

    for row in &rows {
        if let Some(name) = row.fields.get(field).and_then(serde_json::Value::as_str) {
            sheet.english.push((row.row_id, name.to_string()));
        }
        for &locale in locales {
            let key = format!("{field}@{}", locale.code());
            if let Some(text) = row.fields.get(&key).and_then(serde_json::Value::as_str) {
                sheet
                    .localized
                    .entry(locale)
                    .or_default()
                    .push((row.row_id, text.to_string()));
            }
        }
    }

    tracing::debug!("Parsed {} {} rows from API dump", rows.len(), catalog);
    Ok(sheet)
}

// -----------------------------------------------------------------------------
// Community tables
// -----------------------------------------------------------------------------

/// Community datamining CSV for one (catalog, locale)
#[derive(Debug, Clone)]
pub struct CommunityCsv {
    path: PathBuf,
    catalog: Catalog,
    locale: Locale,
}

impl CommunityCsv {
    /// Table at `<dir>/<locale>/<Sheet>.csv`
    #[must_use]
    pub fn in_dir(dir: &Path, catalog: Catalog, locale: Locale) -> Self {
        Self {
            path: dir
                .join(locale.code())
                .join(format!("{}.csv", catalog.sheet_name())),
            catalog,
            locale,
        }
    }
}

impl CatalogSource for CommunityCsv {
    fn describe(&self) -> String {
        format!(
            "{} {} table ({})",
            self.locale,
            self.catalog,
            self.path.display()
        )
    }

    fn load(&self) -> Result<LoadedSheet> {
        let file = File::open(&self.path)?;
        let rows = parse_community_csv(file, self.catalog).map_err(|e| match e {
            Error::MalformedTable { message, .. } => Error::MalformedTable {
                path: self.path.clone(),
                message,
            },
            other => other,
        })?;

        let mut sheet = LoadedSheet::new(self.catalog);
        sheet.localized.insert(self.locale, rows);
        Ok(sheet)
    }
}

/// Parse a community CSV into `(id, text)` rows
///
/// Rows before the `#` header and rows whose first cell is not an id (type
/// rows, offsets) are skipped.
///
/// # Errors
/// Returns an error if the CSV is unreadable or has no usable header.
pub fn parse_community_csv<R: Read>(
    reader: R,
    catalog: Catalog,
) -> Result<Vec<(CanonicalId, String)>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let field = catalog.text_field();
    let mut text_column: Option<usize> = None;
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let Some(first) = record.get(0) else {
            continue;
        };

        let Some(column) = text_column else {
            if first.trim() == "#" {
                text_column = record.iter().position(|cell| cell.trim() == field);
                if text_column.is_none() {
                    return Err(Error::MalformedTable {
                        path: PathBuf::new(),
                        message: format!("no `{field}` column"),
                    });
                }
            }
            continue;
        };

        let Ok(id) = first.trim().parse::<CanonicalId>() else {
            continue;
        };
        if let Some(text) = record.get(column) {
            rows.push((id, text.to_string()));
        }
    }

    if text_column.is_none() {
        return Err(Error::MalformedTable {
            path: PathBuf::new(),
            message: "no `#` header row".to_string(),
        });
    }

    Ok(rows)
}

// -----------------------------------------------------------------------------
// Loading
// -----------------------------------------------------------------------------

/// The standard source set: one API dump per catalog plus one community
/// table per (catalog, community locale).
#[must_use]
pub fn default_sources(
    api_dir: &Path,
    community_dir: &Path,
    locales: &[Locale],
) -> Vec<Box<dyn CatalogSource>> {
    let mut sources: Vec<Box<dyn CatalogSource>> = Vec::new();
    for catalog in Catalog::ALL {
        sources.push(Box::new(XivApiDump::in_dir(api_dir, catalog, locales)));
    }
    for &locale in locales {
        if locale.origin() != LocaleOrigin::Community {
            continue;
        }
        for catalog in Catalog::ALL {
            sources.push(Box::new(CommunityCsv::in_dir(community_dir, catalog, locale)));
        }
    }
    sources
}

/// Load every source concurrently and wait for all of them.
///
/// # Errors
/// Returns the first failure as [`Error::CatalogLoad`]; a batch cannot
/// resolve anything correctly with a partial catalog.
pub fn load_all(sources: &[Box<dyn CatalogSource>]) -> Result<Vec<LoadedSheet>> {
    tracing::info!("Loading {} catalog sources", sources.len());

    sources
        .par_iter()
        .map(|source| {
            source.load().map_err(|e| Error::CatalogLoad {
                source_name: source.describe(),
                reason: e.to_string(),
            })
        })
        .collect()
}
