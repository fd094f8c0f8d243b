//! Lookaround guards for overlapping `replaceText` keys
//!
//! Keys are applied as regexes over timeline text, so a short key such as
//! `Ice` also fires inside `Ice Storm`. For every key that is a strict prefix
//! or suffix of another key, the neighbouring character in the longer key is
//! collected, and the short key is wrapped in a negative lookbehind and/or
//! lookahead over those characters:
//!
//! ```text
//! Ice, Ice Storm         ->  Ice(?![ ])
//! Burst, Visceral Burst  ->  (?<![ ])Burst
//! ```

use std::collections::BTreeSet;

use indexmap::IndexMap;

use super::table::OrderedTable;

const LOOKBEHIND_OPEN: &str = "(?<![";
const LOOKAHEAD_OPEN: &str = "(?![";
const GUARD_CLOSE: &str = "])";

/// Characters that must not touch a key on either side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collisions {
    pub not_preceded_by: BTreeSet<char>,
    pub not_followed_by: BTreeSet<char>,
}

impl Collisions {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.not_preceded_by.is_empty() && self.not_followed_by.is_empty()
    }
}

/// A new key that an existing key, as authored, will also match inside
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub new_key: String,
    pub existing_key: String,
}

/// `key` with any leading lookbehind and trailing lookahead guard removed
#[must_use]
pub fn bare_key(key: &str) -> &str {
    split_guards(key).1
}

/// `(lookbehind class, bare key, lookahead class)`; class bodies are raw
fn split_guards(key: &str) -> (Option<&str>, &str, Option<&str>) {
    let mut bare = key;
    let mut behind = None;
    let mut ahead = None;

    if let Some(rest) = bare.strip_prefix(LOOKBEHIND_OPEN) {
        if let Some(end) = class_end(rest) {
            behind = Some(&rest[..end]);
            bare = &rest[end + GUARD_CLOSE.len()..];
        }
    }
    if let Some(start) = bare.rfind(LOOKAHEAD_OPEN) {
        let class = &bare[start + LOOKAHEAD_OPEN.len()..];
        if class_end(class).is_some_and(|end| end + GUARD_CLOSE.len() == class.len()) {
            ahead = Some(&class[..class.len() - GUARD_CLOSE.len()]);
            bare = &bare[..start];
        }
    }
    (behind, bare, ahead)
}

/// Byte offset of the `])` closing a character class body, skipping escapes
fn class_end(class: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in class.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ']' && class[i..].starts_with(GUARD_CLOSE) {
            return Some(i);
        }
    }
    None
}

/// Whether a character class body matches `target`; understands escapes
/// and `a-z` ranges
fn class_contains(body: &str, target: char) -> bool {
    let mut members: Vec<char> = Vec::new();
    let mut range_pending = false;
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        let (c, escaped) = if c == '\\' {
            (chars.next().unwrap_or('\\'), true)
        } else {
            (c, false)
        };
        if c == '-' && !escaped && !members.is_empty() && !range_pending {
            range_pending = true;
            continue;
        }
        if range_pending {
            range_pending = false;
            if members.last().is_some_and(|&start| (start..=c).contains(&target)) {
                return true;
            }
        }
        members.push(c);
    }

    (range_pending && target == '-') || members.contains(&target)
}

/// Whether `prior`, as authored, also fires inside `key`
fn fires_inside(prior: &str, key: &str) -> bool {
    let (behind, bare, ahead) = split_guards(prior);
    if bare.is_empty() || bare.len() >= key.len() {
        return false;
    }
    if let Some(tail) = key.strip_prefix(bare) {
        let blocked = tail
            .chars()
            .next()
            .is_some_and(|c| ahead.is_some_and(|body| class_contains(body, c)));
        if !blocked {
            return true;
        }
    }
    if let Some(head) = key.strip_suffix(bare) {
        let blocked = head
            .chars()
            .next_back()
            .is_some_and(|c| behind.is_some_and(|body| class_contains(body, c)));
        if !blocked {
            return true;
        }
    }
    false
}

/// Neighbouring characters of `key` inside every longer key that starts or
/// ends with it
#[must_use]
pub fn collisions<S: AsRef<str>>(key: &str, others: &[S]) -> Collisions {
    let mut found = Collisions::default();
    if key.is_empty() {
        return found;
    }

    for other in others {
        let other = other.as_ref();
        if other.len() <= key.len() {
            continue;
        }
        if let Some(head) = other.strip_suffix(key) {
            if let Some(c) = head.chars().next_back() {
                found.not_preceded_by.insert(c);
            }
        }
        if let Some(tail) = other.strip_prefix(key) {
            if let Some(c) = tail.chars().next() {
                found.not_followed_by.insert(c);
            }
        }
    }
    found
}

fn escape_class(chars: &BTreeSet<char>) -> String {
    let mut out = String::new();
    for &c in chars {
        if ".*+?^${}()|[]\\-".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wrap `key` in the guards `collisions` calls for
#[must_use]
pub fn guard(key: &str, collisions: &Collisions) -> String {
    let mut out = String::with_capacity(key.len() + 16);
    if !collisions.not_preceded_by.is_empty() {
        out.push_str(LOOKBEHIND_OPEN);
        out.push_str(&escape_class(&collisions.not_preceded_by));
        out.push_str(GUARD_CLOSE);
    }
    out.push_str(key);
    if !collisions.not_followed_by.is_empty() {
        out.push_str(LOOKAHEAD_OPEN);
        out.push_str(&escape_class(&collisions.not_followed_by));
        out.push_str(GUARD_CLOSE);
    }
    out
}

/// Emission-safe form of every key in `keys`, keyed by the original
///
/// Keys that overlap nothing map to themselves.
#[must_use]
pub fn disambiguate<S: AsRef<str>>(keys: &[S]) -> IndexMap<String, String> {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            (key.to_string(), guard(key, &collisions(key, keys)))
        })
        .collect()
}

/// Guard the entries of `table` from `first_new` on.
///
/// Collisions for new entries are measured against the bare form of every
/// key in the table. An earlier key that would still fire inside a new key
/// gets its authored guards widened just enough to stop that; its position
/// and value stay as they were. Every such pair is returned for review.
pub fn guard_appended(table: &mut OrderedTable, first_new: usize) -> Vec<Overlap> {
    let bare: Vec<String> = table.iter().map(|o| bare_key(&o.key).to_string()).collect();
    let existing: Vec<String> = table
        .iter()
        .take(first_new)
        .map(|o| o.key.clone())
        .collect();
    let appended = bare.get(first_new..).unwrap_or_default();

    let mut overlaps = Vec::new();
    for (index, prior) in existing.iter().enumerate() {
        let fired: Vec<&String> = appended
            .iter()
            .filter(|key| fires_inside(prior, key))
            .collect();
        if fired.is_empty() {
            continue;
        }
        overlaps.extend(fired.iter().map(|key| Overlap {
            new_key: (*key).clone(),
            existing_key: prior.clone(),
        }));

        let widened = widen_guards(prior, &collisions(bare_key(prior), &fired));
        if !table.rename_at(index, widened.clone()) {
            tracing::debug!("guarded key {widened} already present, leaving {prior} as is");
        }
    }

    for (index, key) in bare.iter().enumerate().skip(first_new) {
        let found = collisions(key, &bare);
        if found.is_empty() {
            continue;
        }
        let guarded = guard(key, &found);
        if !table.rename_at(index, guarded.clone()) {
            tracing::debug!("guarded key {guarded} already present, leaving {key} bare");
        }
    }
    overlaps
}

/// `key` with `extra` merged into its lookaround classes
fn widen_guards(key: &str, extra: &Collisions) -> String {
    let (behind, bare, ahead) = split_guards(key);
    let mut out = String::with_capacity(key.len() + 16);
    push_class(&mut out, LOOKBEHIND_OPEN, behind, &extra.not_preceded_by);
    out.push_str(bare);
    push_class(&mut out, LOOKAHEAD_OPEN, ahead, &extra.not_followed_by);
    out
}

fn push_class(out: &mut String, open: &str, authored: Option<&str>, extra: &BTreeSet<char>) {
    let missing: BTreeSet<char> = extra
        .iter()
        .copied()
        .filter(|&c| !authored.is_some_and(|body| class_contains(body, c)))
        .collect();
    if authored.is_none() && missing.is_empty() {
        return;
    }
    out.push_str(open);
    out.push_str(authored.unwrap_or_default());
    out.push_str(&escape_class(&missing));
    out.push_str(GUARD_CLOSE);
}
