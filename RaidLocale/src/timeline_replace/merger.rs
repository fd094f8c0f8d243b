//! Merge recovered overrides with freshly resolved translations
//!
//! Existing entries are never removed, moved or rewritten. New keys go after
//! every existing key, in the order they were discovered. When a name maps
//! to several distinct translations, an existing override wins; otherwise
//! an alternation of the candidates is written and flagged for review.

use std::collections::HashMap;

use super::table::{LocaleBlock, OrderedTable, TableKind};

/// One English name and its distinct translations in one locale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub key: String,
    /// Case-insensitively distinct, sorted
    pub candidates: Vec<String>,
}

impl ResolvedEntry {
    pub fn new<I, S>(key: impl Into<String>, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            key: key.into(),
            candidates: distinct_candidates(texts),
        }
    }
}

/// Dedupe case-insensitively (keeping the smallest spelling of each), then sort
pub fn distinct_candidates<I, S>(texts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut by_lower: HashMap<String, String> = HashMap::new();
    for text in texts {
        let text = text.as_ref();
        if text.is_empty() {
            continue;
        }
        let spelling = by_lower
            .entry(text.to_lowercase())
            .or_insert_with(|| text.to_string());
        if text < spelling.as_str() {
            *spelling = text.to_string();
        }
    }
    let mut candidates: Vec<String> = by_lower.into_values().collect();
    candidates.sort();
    candidates
}

/// A name with more than one distinct translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    pub table: TableKind,
    pub key: String,
    pub candidates: Vec<String>,
    /// The existing override that was kept, if there was one
    pub kept: Option<String>,
}

/// Result of merging one locale
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub block: LocaleBlock,
    /// Whether there was no prior block for this locale
    pub is_new: bool,
    pub added_sync: usize,
    pub added_text: usize,
    /// Index of the first appended `replaceText` entry
    pub first_new_text: usize,
    pub ambiguities: Vec<Ambiguity>,
}

impl MergeOutcome {
    /// Whether the merge added anything
    #[must_use]
    pub fn changed(&self) -> bool {
        self.added_sync + self.added_text > 0
    }
}

/// Merge `sync` and `text` resolutions into `existing`.
///
/// A brand-new block is flagged for review when an alternation was written,
/// or always when `flag_new_blocks` is set. An existing block keeps its flag
/// as it was.
#[must_use]
pub fn merge(
    existing: Option<&LocaleBlock>,
    sync: &[ResolvedEntry],
    text: &[ResolvedEntry],
    flag_new_blocks: bool,
) -> MergeOutcome {
    let mut block = existing.cloned().unwrap_or_default();
    let mut ambiguities = Vec::new();

    let first_new_text = block.replace_text.len();
    let added_sync = merge_table(&mut block.replace_sync, TableKind::Sync, sync, &mut ambiguities);
    let added_text = merge_table(&mut block.replace_text, TableKind::Text, text, &mut ambiguities);

    let is_new = existing.is_none();
    if is_new {
        let wrote_alternation = ambiguities.iter().any(|a| a.kept.is_none());
        block.needs_review = wrote_alternation || flag_new_blocks;
    }

    MergeOutcome {
        block,
        is_new,
        added_sync,
        added_text,
        first_new_text,
        ambiguities,
    }
}

fn merge_table(
    table: &mut OrderedTable,
    kind: TableKind,
    resolved: &[ResolvedEntry],
    ambiguities: &mut Vec<Ambiguity>,
) -> usize {
    let mut added = 0;

    for entry in resolved {
        let key = entry.key.as_str();
        if key.trim().is_empty() {
            continue;
        }

        if let Some(existing) = table.find_bare(key) {
            if entry.candidates.len() > 1 {
                ambiguities.push(Ambiguity {
                    table: kind,
                    key: key.to_string(),
                    candidates: entry.candidates.clone(),
                    kept: Some(existing.value.clone()),
                });
            }
            continue;
        }

        let value = match entry.candidates.as_slice() {
            [] => continue,
            [only] => only.clone(),
            many => {
                ambiguities.push(Ambiguity {
                    table: kind,
                    key: key.to_string(),
                    candidates: many.to_vec(),
                    kept: None,
                });
                format!("(?:{})", many.join("|"))
            }
        };

        if table.push_new(key, value) {
            added += 1;
        }
    }

    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(key: &str, texts: &[&str]) -> ResolvedEntry {
        ResolvedEntry::new(key, texts.iter().copied())
    }

    fn block(text: &[(&str, &str)], needs_review: bool) -> LocaleBlock {
        LocaleBlock {
            replace_sync: OrderedTable::new(),
            replace_text: text.iter().copied().collect(),
            needs_review,
        }
    }

    #[test]
    fn test_distinct_candidates() {
        assert_eq!(
            distinct_candidates(["Lindwurm", "lindwurm", "Drache", ""]),
            vec!["Drache".to_string(), "Lindwurm".to_string()]
        );
    }

    #[test]
    fn test_existing_same_value_not_duplicated() {
        let prior = block(&[("Stack", "パケット")], false);
        let outcome = merge(Some(&prior), &[], &[entry("Stack", &["パケット"])], false);
        assert_eq!(outcome.block, prior);
        assert!(!outcome.changed());
    }

    #[test]
    fn test_existing_entries_kept_new_appended() {
        let prior = block(&[("B", "b-manual"), ("A", "a-manual")], false);
        let outcome = merge(
            Some(&prior),
            &[],
            &[entry("A", &["a-fresh"]), entry("C", &["c"]), entry("D", &[])],
            false,
        );
        let pairs: Vec<_> = outcome
            .block
            .replace_text
            .iter()
            .map(|o| (o.key.as_str(), o.value.as_str()))
            .collect();
        assert_eq!(pairs, vec![("B", "b-manual"), ("A", "a-manual"), ("C", "c")]);
        assert_eq!(outcome.first_new_text, 2);
        assert_eq!(outcome.added_text, 1);
        assert!(!outcome.block.needs_review);
    }

    #[test]
    fn test_new_ambiguity_writes_alternation_and_flags_new_block() {
        let outcome = merge(
            None,
            &[entry("Lindwurm", &["Lindwurm", "Drache"])],
            &[],
            false,
        );
        assert_eq!(
            outcome.block.replace_sync.get("Lindwurm"),
            Some("(?:Drache|Lindwurm)")
        );
        assert!(outcome.is_new);
        assert!(outcome.block.needs_review);
        assert_eq!(outcome.ambiguities.len(), 1);
        assert_eq!(outcome.ambiguities[0].kept, None);
    }

    #[test]
    fn test_existing_override_beats_ambiguity() {
        let prior = LocaleBlock {
            replace_sync: [("Lindwurm", "Lindwurm")].into_iter().collect(),
            ..LocaleBlock::default()
        };
        let outcome = merge(
            Some(&prior),
            &[entry("Lindwurm", &["Lindwurm", "Drache"])],
            &[],
            false,
        );
        assert_eq!(outcome.block, prior);
        assert_eq!(outcome.ambiguities[0].kept.as_deref(), Some("Lindwurm"));
    }

    #[test]
    fn test_review_flag_carried_and_never_introduced() {
        let flagged = block(&[("Stack", "Sammeln")], true);
        let outcome = merge(Some(&flagged), &[], &[entry("Spread", &["Verteilen"])], false);
        assert!(outcome.block.needs_review);

        let clean = block(&[("Stack", "Sammeln")], false);
        let outcome = merge(
            Some(&clean),
            &[entry("Boss", &["A", "B"])],
            &[entry("Spread", &["Verteilen"])],
            false,
        );
        assert!(!outcome.block.needs_review);
    }

    #[test]
    fn test_flag_new_blocks_option() {
        let plain = merge(None, &[], &[entry("Spread", &["Verteilen"])], false);
        assert!(!plain.block.needs_review);
        let flagged = merge(None, &[], &[entry("Spread", &["Verteilen"])], true);
        assert!(flagged.block.needs_review);
    }

    #[test]
    fn test_guarded_existing_key_matches_bare_name() {
        let prior = block(&[("(?<![ ])Burst", "Detonation")], false);
        let outcome = merge(Some(&prior), &[], &[entry("Burst", &["Explosion"])], false);
        assert_eq!(outcome.block, prior);
    }
}
