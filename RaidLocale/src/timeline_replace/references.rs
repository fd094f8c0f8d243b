//! What a trigger file and its timeline refer to
//!
//! - **Codes**: ability ids from `StartsUsing` triggers, which bound the id
//!   window used to resolve ability names
//! - **Sync names**: actor names in `source`/`name`/`target` fields
//! - **Text names**: quoted strings in the timeline

use std::ops::Range;
use std::sync::LazyLock;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use super::scanner;
use crate::catalog::CanonicalId;

static STARTS_USING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\btype\s*:\s*['"]StartsUsing['"]"#).expect("valid regex")
});

static NET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnetRegex\s*:\s*\{").expect("valid regex"));

static ID_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bid\s*:\s*(?:['"]([0-9A-Fa-f]+)['"]|\[((?:\s*['"][0-9A-Fa-f]+['"]\s*,?)+)\s*\])"#)
        .expect("valid regex")
});

static SYNC_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(?:source|name|target)\s*:\s*(?:'([^'"\n]+)'|"([^'"\n]+)"|\[((?:\s*['"][^'"\n]+['"]\s*,?)+)\s*\])"#,
    )
    .expect("valid regex")
});

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"['"]([^'"\n]+)['"]"#).expect("valid regex"));

static TIMELINE_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"\n]+)""#).expect("valid regex"));

/// Inclusive range of a file's ability codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: CanonicalId,
    pub max: CanonicalId,
}

impl Bounds {
    /// `None` when there are no codes
    pub fn from_codes(codes: impl IntoIterator<Item = CanonicalId>) -> Option<Self> {
        codes.into_iter().fold(None, |acc, code| {
            Some(match acc {
                None => Bounds { min: code, max: code },
                Some(b) => Bounds {
                    min: b.min.min(code),
                    max: b.max.max(code),
                },
            })
        })
    }

    /// Distance from `id` to the interval; zero inside it
    #[must_use]
    pub fn distance(&self, id: CanonicalId) -> u32 {
        if id < self.min {
            self.min - id
        } else if id > self.max {
            id - self.max
        } else {
            0
        }
    }

    /// Whether `id` falls in `[min - padding, max + padding]`
    #[must_use]
    pub fn window_contains(&self, id: CanonicalId, padding: u32) -> bool {
        id >= self.min.saturating_sub(padding) && id <= self.max.saturating_add(padding)
    }
}

/// Everything a file refers to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    /// Ability codes in discovery order (duplicates kept)
    pub codes: Vec<CanonicalId>,
    pub bounds: Option<Bounds>,
    /// Actor names, case-insensitively unique, in discovery order
    pub sync_names: IndexSet<String>,
    /// Timeline strings, in discovery order
    pub text_names: IndexSet<String>,
}

/// Collect the references of one trigger file and its timeline
#[must_use]
pub fn extract_references(trigger_text: &str, timeline_text: &str) -> ReferenceSet {
    let codes = starts_using_codes(trigger_text);
    let bounds = Bounds::from_codes(codes.iter().copied());

    ReferenceSet {
        codes,
        bounds,
        sync_names: sync_names([trigger_text, timeline_text]),
        text_names: timeline_names(timeline_text),
    }
}

/// Hex ids from the `netRegex` of every `StartsUsing` trigger
#[must_use]
pub fn starts_using_codes(text: &str) -> Vec<CanonicalId> {
    let markers: Vec<usize> = STARTS_USING
        .find_iter(text)
        .map(|m| m.start())
        .filter(|&pos| scanner::is_code_at(text, pos))
        .collect();
    if markers.is_empty() {
        return Vec::new();
    }

    let objects = match scanner::object_spans(text) {
        Ok(spans) => Some(spans),
        Err(e) => {
            tracing::debug!("trigger scan failed, scoping StartsUsing loosely: {e}");
            None
        }
    };

    let mut codes = Vec::new();
    for (i, &pos) in markers.iter().enumerate() {
        let scope = objects
            .as_deref()
            .and_then(|spans| innermost_containing(spans, pos))
            .unwrap_or_else(|| pos..markers.get(i + 1).copied().unwrap_or(text.len()));
        codes.extend(net_regex_ids(&text[scope]));
    }
    codes
}

fn innermost_containing(spans: &[Range<usize>], pos: usize) -> Option<Range<usize>> {
    spans
        .iter()
        .filter(|span| span.start < pos && pos < span.end)
        .max_by_key(|span| span.start)
        .cloned()
}

fn net_regex_ids(trigger: &str) -> Vec<CanonicalId> {
    let Some(m) = NET_REGEX.find(trigger) else {
        return Vec::new();
    };
    let open = m.end() - 1;
    let body = match scanner::matching_close(trigger, open) {
        Ok(close) => &trigger[open + 1..close],
        Err(_) => &trigger[open + 1..],
    };
    let Some(caps) = ID_FIELD.captures(body) else {
        return Vec::new();
    };

    if let Some(single) = caps.get(1) {
        return parse_hex(single.as_str()).into_iter().collect();
    }
    caps.get(2)
        .map(|list| {
            LIST_ITEM
                .captures_iter(list.as_str())
                .filter_map(|c| c.get(1).and_then(|m| parse_hex(m.as_str())))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_hex(code: &str) -> Option<CanonicalId> {
    CanonicalId::from_str_radix(code.trim(), 16).ok()
}

/// Actor names from `source`/`name`/`target` fields across `texts`
///
/// Case variants collapse to one entry, spelled with the lexicographically
/// smallest variant, at the position of the first variant seen.
pub fn sync_names<'a>(texts: impl IntoIterator<Item = &'a str>) -> IndexSet<String> {
    let mut by_lower: IndexMap<String, String> = IndexMap::new();
    let mut add = |name: &str| {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        let spelling = by_lower.entry(name.to_lowercase()).or_insert_with(|| name.to_string());
        if name < spelling.as_str() {
            *spelling = name.to_string();
        }
    };

    for text in texts {
        for caps in SYNC_FIELD.captures_iter(text) {
            if let Some(single) = caps.get(1).or_else(|| caps.get(2)) {
                add(single.as_str());
            } else if let Some(list) = caps.get(3) {
                for item in LIST_ITEM.captures_iter(list.as_str()) {
                    if let Some(m) = item.get(1) {
                        add(m.as_str());
                    }
                }
            }
        }
    }

    by_lower.into_values().collect()
}

/// Quoted strings in a timeline that could be ability names
///
/// Skips `--directive--` markers, `# comment` lines and field values such
/// as `id: "B4D8"` or `id: ["B4D9", "B4DA"]`, meaning anything after a `:`
/// or inside a `{ .. }` field object.
#[must_use]
pub fn timeline_names(timeline_text: &str) -> IndexSet<String> {
    let mut names = IndexSet::new();
    for line in timeline_text.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        for caps in TIMELINE_STRING.captures_iter(line) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let before = &line[..whole.start()];
            if before.trim_end().ends_with(':') || inside_fields(before) {
                continue;
            }
            let name = name.as_str();
            if name.starts_with("--") && name.ends_with("--") {
                continue;
            }
            names.insert(name.to_string());
        }
    }
    names
}

/// Whether a `{` is still open at the end of `before`
fn inside_fields(before: &str) -> bool {
    let opened = before.matches('{').count();
    let closed = before.matches('}').count();
    opened > closed
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRIGGERS: &str = r"const triggerSet = {
  triggers: [
    {
      id: 'R12S Phase Tracker',
      type: 'StartsUsing',
      netRegex: { id: Object.keys(phaseMap), source: 'Lindwurm' },
    },
    {
      id: 'R12S Arcadian Hell',
      type: 'StartsUsing',
      netRegex: { id: ['B533', 'B534'], source: 'Lindwurm', capture: false },
      response: Responses.aoe(),
    },
    {
      id: 'R12S Tether',
      type: 'Tether',
      netRegex: { id: '0001', source: 'Blood Vessel' },
    },
    {
      id: 'R12S Staging',
      // type: 'StartsUsing' in a comment does not count
      type: 'StartsUsing',
      netRegex: { source: 'lindwurm', id: 'B4E1' },
    },
  ],
};
";

    const TIMELINE: &str = r#"hideall "--Reset--"
0.0 "--sync--" InCombat { inGameEventType: "1" } window 0,1
# "Commented Name"
10.2 "Arcadian Hell" Ability { id: "B533", source: "Lindwurm" }
20.5 "Burst" Ability { id: "B4E1", source: "Blood Vessel" }
30.0 "Arcadian Hell" Ability { id: "B533", source: "Lindwurm" }
"#;

    #[test]
    fn test_codes_only_from_starts_using() {
        let codes = starts_using_codes(TRIGGERS);
        assert_eq!(codes, vec![0xB533, 0xB534, 0xB4E1]);
        let bounds = Bounds::from_codes(codes).unwrap();
        assert_eq!(bounds, Bounds { min: 0xB4E1, max: 0xB534 });
    }

    #[test]
    fn test_loose_scope_when_unbalanced() {
        let text = "{ type: 'StartsUsing', netRegex: { id: '64' } ";
        assert_eq!(starts_using_codes(text), vec![0x64]);
    }

    #[test]
    fn test_codes_scoped_loosely_past_regex_literal() {
        let text = "const triggerSet = {
  triggers: [
    {
      id: 'Cast',
      type: 'StartsUsing',
      netRegex: { id: ['B533', 'B534'], source: 'Lindwurm' },
      condition: (_data, matches) => /'/.test(matches.source),
    },
  ],
};
";
        assert_eq!(starts_using_codes(text), vec![0xB533, 0xB534]);
    }

    #[test]
    fn test_no_codes_no_bounds() {
        let refs = extract_references("const t = { triggers: [] };", TIMELINE);
        assert!(refs.codes.is_empty());
        assert!(refs.bounds.is_none());
    }

    #[test]
    fn test_sync_names_case_insensitive() {
        let names = sync_names([TRIGGERS, TIMELINE]);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["Lindwurm".to_string(), "Blood Vessel".to_string()]
        );
    }

    #[test]
    fn test_sync_names_from_lists() {
        let names = sync_names(["netRegex: { source: ['Lindwurm', \"Lindschlange\"] }"]);
        assert_eq!(names.len(), 2);
        assert!(names.contains("Lindschlange"));
    }

    #[test]
    fn test_timeline_names_skip_markers_and_fields() {
        let names = timeline_names(TIMELINE);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["Arcadian Hell".to_string(), "Burst".to_string()]
        );
    }

    #[test]
    fn test_timeline_names_ignore_comments_and_field_values() {
        let timeline = "# \"Commented Out\" Ability { id: \"1\" }
  # -ic \"Striking Distance\"
10.0 \"Wave\" Ability { id: \"B4D8\", source: \"Lindwurm\" }
20.0 \"Wave\" Ability { id: [\"B4D9\", \"B4DA\"] } jump \"Loop\"
";
        let names: Vec<String> = timeline_names(timeline).into_iter().collect();
        assert_eq!(names, vec!["Wave".to_string(), "Loop".to_string()]);

        let actors = sync_names([timeline]);
        assert!(actors.iter().any(|name| name == "Lindwurm"));
    }

    #[test]
    fn test_bounds_distance_and_window() {
        let bounds = Bounds { min: 100, max: 105 };
        assert_eq!(bounds.distance(104), 0);
        assert_eq!(bounds.distance(90), 10);
        assert_eq!(bounds.distance(9000), 8895);
        assert!(bounds.window_contains(0, 100));
        assert!(bounds.window_contains(205, 100));
        assert!(!bounds.window_contains(206, 100));
    }
}
