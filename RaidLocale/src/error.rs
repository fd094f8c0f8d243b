//! Error types for `RaidLocale`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `RaidLocale` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A trigger file has no sibling timeline file.
    #[error("timeline file not found: {path}")]
    TimelineMissing {
        /// The expected path to the timeline file.
        path: PathBuf,
    },

    /// An explicit target filter matched no raidboss file.
    #[error("could not find raidboss file for {0}")]
    TargetNotFound(String),

    // ==================== Catalog Errors ====================
    /// A catalog source could not be loaded. Aborts the whole batch.
    #[error("failed to load {source_name}: {reason}")]
    CatalogLoad {
        /// Human-readable description of the source.
        source_name: String,
        /// What went wrong.
        reason: String,
    },

    /// JSON parse error in a structured-API dump.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parse error in a community table.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A community table has no `#` header row or lacks the text column.
    #[error("malformed community table {path}: {message}")]
    MalformedTable {
        /// Path of the offending table.
        path: PathBuf,
        /// Description of what is missing.
        message: String,
    },

    // ==================== Table Errors ====================
    /// The `timelineReplace` marker exists but no span could be located,
    /// so rewriting would duplicate the table.
    #[error("timelineReplace marker found but its extent could not be located")]
    UnlocatableBlock,

    /// No `timelineReplace` table and no `export default` statement to insert before.
    #[error("no insertion point for timelineReplace (missing `export default`)")]
    NoInsertionPoint,

    /// Unknown locale code.
    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    // ==================== Pipeline Errors ====================
    /// Processing a single file panicked; caught at the file boundary.
    #[error("processing {path} panicked: {message}")]
    FilePanicked {
        /// The file being processed.
        path: PathBuf,
        /// Panic payload, if it was a string.
        message: String,
    },

    // ==================== Config Errors ====================
    /// TOML parse error in a configuration file.
    #[error("config error in {path}: {source}")]
    Config {
        /// The config file path.
        path: PathBuf,
        /// The underlying TOML error.
        source: toml::de::Error,
    },
}

/// Result type alias for `RaidLocale` operations.
pub type Result<T> = std::result::Result<T, Error>;
