//! `timelineReplace` reconciliation
//!
//! Each raidboss trigger file carries a hand-curated `timelineReplace` table
//! that maps English timeline and sync text to other locales. This module
//! brings those tables up to date from the game data catalogs without
//! touching what people wrote by hand:
//!
//! 1. [`extract_references`]: ability ids, actor names and timeline names
//! 2. [`extract_table`]: the existing table, in file order
//! 3. [`ActionResolver`] / [`resolve_actor`]: names to catalog ids
//! 4. [`merge`]: existing entries kept, new ones appended
//! 5. [`guard_appended`]: lookaround guards for overlapping new keys
//! 6. [`writer`]: serialize and patch the file
//!
//! [`process_source`] runs the whole thing for one file and [`run_batch`]
//! for many.
//!
//! # Usage
//!
//! ```
//! use std::path::Path;
//! use raidlocale::catalog::{Catalog, CatalogData, Locale};
//! use raidlocale::timeline_replace::{FileStatus, Options, process_source};
//!
//! let data = CatalogData::builder()
//!     .english(Catalog::Action, 0xB533, "Arcadian Hell")
//!     .localized(Catalog::Action, Locale::De, 0xB533, "Arkadische Hölle")
//!     .build();
//!
//! let triggers = "const triggerSet = {
//!   triggers: [
//!     { id: 'R12S Arcadian Hell', type: 'StartsUsing', netRegex: { id: 'B533' } },
//!   ],
//! };
//!
//! export default triggerSet;
//! ";
//! let timeline = "10.0 \"Arcadian Hell\" Ability { id: \"B533\" }\n";
//!
//! let outcome = process_source(Path::new("r12s.ts"), triggers, timeline, &data, &Options::default())?;
//! let FileStatus::Updated { content } = outcome.status else { panic!() };
//! assert!(content.contains("'Arcadian Hell': 'Arkadische Hölle',"));
//! # Ok::<(), raidlocale::Error>(())
//! ```

pub mod batch;
pub mod disambiguate;
pub mod extractor;
pub mod literal;
pub mod merger;
pub mod pipeline;
pub mod references;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod table;
pub mod writer;

pub use batch::{BatchProgress, BatchSummary, run_batch};
pub use disambiguate::{
    Collisions, Overlap, bare_key, collisions, disambiguate, guard, guard_appended,
};
pub use extractor::{ExistingBlock, ExistingTable, TableSpan, extract_table};
pub use merger::{Ambiguity, MergeOutcome, ResolvedEntry, distinct_candidates, merge};
pub use pipeline::{FileOutcome, FileStatus, Options, SkipReason, process_file, process_source};
pub use references::{Bounds, ReferenceSet, extract_references};
pub use report::{Report, ReportEntry};
pub use resolver::{
    ActionResolver, DEFAULT_ACTOR_PREFIXES, DEFAULT_PADDING, NameSplitter, Resolution,
    best_action_id, resolve_actor,
};
pub use scanner::ScanError;
pub use table::{LocaleBlock, OrderedTable, Override, TableKind};
pub use writer::{LineEnding, Patch, TableElement};
