//! Per-file review notes
//!
//! Entries are buffered while a file is processed and flushed once it
//! completes, so lines from files processed in parallel never interleave
//! without their path.

use std::fmt;
use std::path::{Path, PathBuf};

use super::table::TableKind;
use crate::catalog::Locale;

/// Something a human should look at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    /// Several translations and no prior override: an alternation was written
    Ambiguous {
        locale: Locale,
        table: TableKind,
        key: String,
        candidates: Vec<String>,
    },
    /// Several translations, but the prior override was kept
    AmbiguousKept {
        locale: Locale,
        table: TableKind,
        key: String,
        candidates: Vec<String>,
        kept: String,
    },
    /// The existing table could not be parsed and was regenerated
    Degraded { reason: String },
    /// An existing key matched inside a newly added key and was guarded
    Overlap {
        locale: Locale,
        new_key: String,
        existing_key: String,
    },
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportEntry::Ambiguous {
                locale,
                table,
                key,
                candidates,
            } => write!(
                f,
                "Multiple candidates for '{key}' in {locale} {}: {}. Manual review required.",
                table.field_name(),
                candidates.join(", ")
            ),
            ReportEntry::AmbiguousKept {
                locale,
                table,
                key,
                candidates,
                kept,
            } => write!(
                f,
                "Multiple candidates for '{key}' in {locale} {}: {}. Using existing translation '{kept}'.",
                table.field_name(),
                candidates.join(", ")
            ),
            ReportEntry::Degraded { reason } => write!(
                f,
                "Existing timelineReplace could not be parsed ({reason}); regenerating it, unparsed edits are lost"
            ),
            ReportEntry::Overlap {
                locale,
                new_key,
                existing_key,
            } => write!(
                f,
                "Existing {locale} key '{existing_key}' matched inside new key '{new_key}'; guards widened, please check"
            ),
        }
    }
}

/// Review notes for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub path: PathBuf,
    pub entries: Vec<ReportEntry>,
}

impl Report {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Emit every entry as a warning tagged with the file path
    pub fn flush(&self) {
        for entry in &self.entries {
            tracing::warn!(path = %self.path.display(), "{entry}");
        }
    }
}
