//! One trigger file, start to finish
//!
//! [`process_source`] is pure: text in, patched text and review notes out.
//! [`process_file`] adds the reads.

use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::disambiguate::guard_appended;
use super::extractor::{ExistingTable, TableSpan, extract_table};
use super::merger::{MergeOutcome, ResolvedEntry, merge};
use super::references::extract_references;
use super::report::{Report, ReportEntry};
use super::resolver::{ActionResolver, DEFAULT_ACTOR_PREFIXES, DEFAULT_PADDING, NameSplitter, resolve_actor};
use super::table::TableKind;
use super::writer::{self, LineEnding, TableElement};
use crate::catalog::{CanonicalId, Catalog, CatalogData, Locale};
use crate::discovery::timeline_path;
use crate::error::{Error, Result};

/// Knobs for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Ability id window padding around a file's code bounds
    pub padding: u32,
    /// Actor prefixes stripped when a timeline name does not resolve as is
    pub actor_prefixes: Vec<String>,
    /// Flag every brand-new locale block for review
    pub flag_new_blocks: bool,
    /// Locales to generate
    pub locales: Vec<Locale>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            actor_prefixes: DEFAULT_ACTOR_PREFIXES.iter().map(ToString::to_string).collect(),
            flag_new_blocks: false,
            locales: Locale::MANAGED.to_vec(),
        }
    }
}

/// Why a file was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `StartsUsing` ability codes to bound resolution
    NoAnchor,
    /// No resolvable timeline names and no actor names
    NothingToTranslate,
    /// No table exists and no locale produced any entries
    NoLocaleOutput,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoAnchor => write!(f, "no StartsUsing ability ids"),
            SkipReason::NothingToTranslate => write!(f, "nothing to translate"),
            SkipReason::NoLocaleOutput => write!(f, "no translations found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Updated { content: String },
    Unchanged,
    Skipped(SkipReason),
}

/// What happened to one file
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
    pub report: Report,
}

impl FileOutcome {
    fn new(path: &Path, status: FileStatus, report: Report) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            report,
        }
    }
}

/// Read a trigger file and its timeline, then [`process_source`] them.
///
/// # Errors
/// Fails if either file cannot be read, or as [`process_source`] does.
pub fn process_file(path: &Path, data: &CatalogData, options: &Options) -> Result<FileOutcome> {
    let timeline = timeline_path(path);
    if !timeline.is_file() {
        return Err(Error::TimelineMissing { path: timeline });
    }
    let trigger_text = std::fs::read_to_string(path)?;
    let timeline_text = std::fs::read_to_string(&timeline)?;
    process_source(path, &trigger_text, &timeline_text, data, options)
}

/// Reconcile one file's `timelineReplace` table against the catalogs.
///
/// # Errors
/// [`Error::UnlocatableBlock`] or [`Error::NoInsertionPoint`] when the new
/// table has nowhere to go.
pub fn process_source(
    path: &Path,
    trigger_text: &str,
    timeline_text: &str,
    data: &CatalogData,
    options: &Options,
) -> Result<FileOutcome> {
    let mut report = Report::new(path);

    let refs = extract_references(trigger_text, timeline_text);
    let Some(bounds) = refs.bounds else {
        tracing::debug!("{}: no StartsUsing ids, skipping", path.display());
        return Ok(FileOutcome::new(path, FileStatus::Skipped(SkipReason::NoAnchor), report));
    };

    let existing = extract_table(trigger_text);
    if let Some(reason) = &existing.degraded {
        report.push(ReportEntry::Degraded {
            reason: reason.clone(),
        });
    }

    let splitter = NameSplitter::new(options.actor_prefixes.as_slice());
    let resolver = ActionResolver::new(
        data.name_index(Catalog::Action),
        bounds,
        options.padding,
        &splitter,
    );
    let mut text_keys: IndexMap<String, CanonicalId> = IndexMap::new();
    for name in &refs.text_names {
        if let Some((key, id)) = resolver.resolve(name) {
            text_keys.entry(key).or_insert(id);
        }
    }

    if text_keys.is_empty() && refs.sync_names.is_empty() {
        return Ok(FileOutcome::new(
            path,
            FileStatus::Skipped(SkipReason::NothingToTranslate),
            report,
        ));
    }

    let actor_index = data.name_index(Catalog::BNpcName);
    let actors: Vec<(&str, Vec<CanonicalId>)> = refs
        .sync_names
        .iter()
        .map(|name| (name.as_str(), resolve_actor(name, actor_index).ids()))
        .filter(|(_, ids)| !ids.is_empty())
        .collect();

    tracing::debug!(
        "{}: bounds {:X}..{:X}, {} text keys, {} actors",
        path.display(),
        bounds.min,
        bounds.max,
        text_keys.len(),
        actors.len()
    );

    let eol = LineEnding::detect(trigger_text);
    let mut elements: Vec<TableElement> = Vec::new();
    let mut emitted = vec![false; existing.blocks.len()];
    let mut any_changed = false;

    for locale in Locale::ALL {
        let first = existing.first_index(locale);

        let merged = is_managed(locale, data, options).then(|| {
            merge_locale(locale, &existing, &text_keys, &actors, data, options, &mut report)
        });

        let comments = first.map_or(&[][..], |i| &existing.blocks[i].leading[..]);
        match merged {
            Some(outcome) if outcome.changed() => {
                any_changed = true;
                let text = writer::render_block(locale.code(), &outcome.block, eol);
                elements.push(TableElement::new(text).with_comments(comments));
            }
            _ => {
                if let Some(i) = first {
                    let raw = existing.blocks[i].raw.clone();
                    elements.push(TableElement::new(raw).with_comments(comments));
                }
            }
        }
        if let Some(i) = first {
            emitted[i] = true;
        }
    }

    if !any_changed {
        let status = if existing.span == TableSpan::Absent {
            FileStatus::Skipped(SkipReason::NoLocaleOutput)
        } else {
            FileStatus::Unchanged
        };
        return Ok(FileOutcome::new(path, status, report));
    }

    // Unknown locales and repeated blocks follow the known ones untouched
    for (block, _) in existing.blocks.iter().zip(&emitted).filter(|(_, done)| !**done) {
        elements.push(TableElement::new(block.raw.clone()).with_comments(&block.leading));
    }

    let table = writer::render_table(&elements, &existing.trailing, eol);
    let patch = writer::apply(trigger_text, &existing.span, &table)?;
    let status = if patch.changed {
        FileStatus::Updated {
            content: patch.content,
        }
    } else {
        FileStatus::Unchanged
    };
    Ok(FileOutcome::new(path, status, report))
}

fn is_managed(locale: Locale, data: &CatalogData, options: &Options) -> bool {
    locale != Locale::En && options.locales.contains(&locale) && data.has_locale(locale)
}

fn merge_locale(
    locale: Locale,
    existing: &ExistingTable,
    text_keys: &IndexMap<String, CanonicalId>,
    actors: &[(&str, Vec<CanonicalId>)],
    data: &CatalogData,
    options: &Options,
    report: &mut Report,
) -> MergeOutcome {
    let action_table = data.locale_table(Catalog::Action, locale);
    let actor_table = data.locale_table(Catalog::BNpcName, locale);

    let text: Vec<ResolvedEntry> = text_keys
        .iter()
        .map(|(key, &id)| ResolvedEntry::new(key.as_str(), action_table.and_then(|t| t.get(id))))
        .collect();

    let sync: Vec<ResolvedEntry> = actors
        .iter()
        .map(|(name, ids)| {
            let texts = ids
                .iter()
                .filter_map(|&id| actor_table.and_then(|t| t.get(id)));
            ResolvedEntry::new(*name, texts)
        })
        .collect();

    let mut outcome = merge(existing.get(locale), &sync, &text, options.flag_new_blocks);

    // A boilerplate block that gets regenerated keeps its review marker
    if outcome.is_new {
        if let Some(i) = existing.first_index(locale) {
            outcome.block.needs_review |= existing.blocks[i].block.needs_review;
        }
    }

    if outcome.added_text > 0 {
        let overlaps = guard_appended(&mut outcome.block.replace_text, outcome.first_new_text);
        for overlap in overlaps {
            report.push(ReportEntry::Overlap {
                locale,
                new_key: overlap.new_key,
                existing_key: overlap.existing_key,
            });
        }
    }

    for ambiguity in &outcome.ambiguities {
        report.push(match &ambiguity.kept {
            Some(kept) => ReportEntry::AmbiguousKept {
                locale,
                table: ambiguity.table,
                key: ambiguity.key.clone(),
                candidates: ambiguity.candidates.clone(),
                kept: kept.clone(),
            },
            None => ReportEntry::Ambiguous {
                locale,
                table: ambiguity.table,
                key: ambiguity.key.clone(),
                candidates: ambiguity.candidates.clone(),
            },
        });
    }

    if outcome.changed() {
        tracing::debug!(
            "{locale}: +{} {}, +{} {}",
            outcome.added_sync,
            TableKind::Sync.field_name(),
            outcome.added_text,
            TableKind::Text.field_name()
        );
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRIGGERS: &str = "const triggerSet: TriggerSet<Data> = {
  id: 'TestArena',
  triggers: [
    {
      id: 'Test Fireball',
      type: 'StartsUsing',
      netRegex: { id: ['64', '69'], source: 'Lindwurm' },
    },
  ],
};

export default triggerSet;
";

    const TIMELINE: &str = "0.0 \"--sync--\" InCombat window 0,1
10.0 \"Fireball\" Ability { id: \"64\", source: \"Lindwurm\" }
20.0 \"Ice\" Ability { id: \"65\", source: \"Lindwurm\" }
30.0 \"Ice Storm\" Ability { id: \"66\", source: \"Lindwurm\" }
";

    fn catalog() -> CatalogData {
        CatalogData::builder()
            .english(Catalog::Action, 104, "Fireball")
            .english(Catalog::Action, 9000, "Fireball")
            .english(Catalog::Action, 101, "Ice")
            .english(Catalog::Action, 102, "Ice Storm")
            .english(Catalog::BNpcName, 14378, "Lindwurm")
            .localized(Catalog::Action, Locale::De, 104, "Feuerball")
            .localized(Catalog::Action, Locale::De, 9000, "Falscher Feuerball")
            .localized(Catalog::Action, Locale::De, 101, "Eis")
            .localized(Catalog::Action, Locale::De, 102, "Eissturm")
            .localized(Catalog::BNpcName, Locale::De, 14378, "Lindwurm")
            .build()
    }

    fn updated(outcome: &FileOutcome) -> &str {
        match &outcome.status {
            FileStatus::Updated { content } => content,
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[test]
    fn test_inserts_new_table() {
        let outcome = process_source(
            Path::new("test.ts"),
            TRIGGERS,
            TIMELINE,
            &catalog(),
            &Options::default(),
        )
        .unwrap();
        let content = updated(&outcome);
        assert!(content.contains("        'Fireball': 'Feuerball',\n"));
        assert!(content.contains("        'Ice(?![ ])': 'Eis',\n"));
        assert!(content.contains("        'Lindwurm': 'Lindwurm',\n"));
        assert!(!content.contains("Falscher"));
        assert!(!content.contains("'locale': 'fr'"));
        assert!(content.ends_with("  ],\n};\n\nexport default triggerSet;\n"));
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let data = catalog();
        let options = Options::default();
        let first = process_source(Path::new("test.ts"), TRIGGERS, TIMELINE, &data, &options).unwrap();
        let second =
            process_source(Path::new("test.ts"), updated(&first), TIMELINE, &data, &options).unwrap();
        assert_eq!(second.status, FileStatus::Unchanged);
    }

    #[test]
    fn test_no_anchor_skips() {
        let outcome = process_source(
            Path::new("test.ts"),
            "const triggerSet = { triggers: [] };\n\nexport default triggerSet;\n",
            TIMELINE,
            &catalog(),
            &Options::default(),
        )
        .unwrap();
        assert_eq!(outcome.status, FileStatus::Skipped(SkipReason::NoAnchor));
    }

    #[test]
    fn test_locale_without_data_produces_nothing() {
        let data = CatalogData::builder()
            .english(Catalog::Action, 104, "Fireball")
            .build();
        let outcome =
            process_source(Path::new("test.ts"), TRIGGERS, TIMELINE, &data, &Options::default())
                .unwrap();
        assert_eq!(outcome.status, FileStatus::Skipped(SkipReason::NoLocaleOutput));
    }

    #[test]
    fn test_unlocatable_table_fails() {
        let broken = TRIGGERS.replace(
            "};\n\nexport",
            "  timelineReplace: [ { 'locale': 'de', 'replaceText': { 'x': 'y } ] };\n\nexport",
        );
        let err = process_source(
            Path::new("test.ts"),
            &broken,
            TIMELINE,
            &catalog(),
            &Options::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnlocatableBlock));
    }
}
