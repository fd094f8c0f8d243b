#![allow(non_snake_case)]
//! # RaidLocale
//!
//! Keeps the `timelineReplace` tables of raidboss trigger files in step with
//! the game's own translations.
//!
//! Each trigger file maps English timeline text to German, French, Japanese,
//! Chinese, Korean and Traditional Chinese. Those tables are partly
//! hand-written, so they are never regenerated wholesale: existing entries
//! stay where they are, resolved names are appended, and anything the tool
//! cannot decide on its own is flagged for review.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use raidlocale::prelude::*;
//!
//! let sources = default_sources(Path::new("xivapi"), Path::new("community"), &Locale::MANAGED);
//! let data = CatalogData::load(&sources)?;
//!
//! let files = find_target_files(Path::new("ui/raidboss/data"), None, DEFAULT_EXCLUDES)?;
//! let summary = run_batch(&files, &data, &Options::default(), true, |_| {});
//! println!("Updated {} of {} files", summary.updated, summary.total());
//! # Ok::<(), raidlocale::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - name indexes and locale tables from game data dumps
//! - [`timeline_replace`] - table recovery, resolution, merging and patching
//! - [`discovery`] - finding trigger files with timelines
//! - [`config`] - `raidlocale.toml`
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `raidlocale` command-line binary

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod timeline_replace;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::catalog::{
        CanonicalId, Catalog, CatalogData, CatalogSource, Locale, default_sources,
    };
    pub use crate::config::Config;
    pub use crate::discovery::{DEFAULT_EXCLUDES, find_target_files, timeline_path};
    pub use crate::timeline_replace::{
        BatchSummary, FileOutcome, FileStatus, Options, SkipReason, process_file,
        process_source, run_batch,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
