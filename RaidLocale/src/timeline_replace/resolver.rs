//! Resolve English names to catalog ids
//!
//! Ability names are common across content ("Stack", "Enrage"), so they are
//! resolved inside a window around the file's own ability codes. Actor names
//! are not windowed: actor ids are numbered independently of abilities.

use std::sync::LazyLock;

use regex::Regex;

use super::references::Bounds;
use crate::catalog::{CanonicalId, NameIndex};

/// How far outside a file's code bounds an ability id may lie
pub const DEFAULT_PADDING: u32 = 100;

/// Actor prefixes recognised by default (`Clone 2 Fireball`)
pub const DEFAULT_ACTOR_PREFIXES: &[&str] = &["Clone"];

/// Ordinal, multiplier, parenthetical, direction and trailing `?`/`!`,
/// in that order, all optional
static STRUCTURAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(\s+\d+)?(\s+x\d+)?(\s+\([^)]+\))?(\s+(?:Left|Right|Northeast|Northwest|Southeast|Southwest)(?:/\w+)?)?([?!])?$",
    )
    .expect("valid regex")
});

/// Outcome of resolving one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Unresolved,
    Unique(CanonicalId),
    /// Several ids share the name; ascending
    Ambiguous(Vec<CanonicalId>),
}

impl Resolution {
    /// Every candidate id, ascending
    #[must_use]
    pub fn ids(&self) -> Vec<CanonicalId> {
        match self {
            Resolution::Unresolved => Vec::new(),
            Resolution::Unique(id) => vec![*id],
            Resolution::Ambiguous(ids) => ids.clone(),
        }
    }
}

/// Best ability id for `name`: inside the padded window, nearest to the
/// bounds, smallest id on a tie.
#[must_use]
pub fn best_action_id(
    name: &str,
    index: &NameIndex,
    bounds: Bounds,
    padding: u32,
) -> Option<CanonicalId> {
    index
        .lookup(name)?
        .iter()
        .copied()
        .filter(|&id| bounds.window_contains(id, padding))
        .min_by_key(|&id| (bounds.distance(id), id))
}

/// Every actor id for `name`
#[must_use]
pub fn resolve_actor(name: &str, index: &NameIndex) -> Resolution {
    match index.lookup(name) {
        None => Resolution::Unresolved,
        Some(ids) if ids.len() == 1 => ids
            .first()
            .map_or(Resolution::Unresolved, |&id| Resolution::Unique(id)),
        Some(ids) => Resolution::Ambiguous(ids.iter().copied().collect()),
    }
}

/// Splits decorated timeline names into their base name
#[derive(Debug, Clone)]
pub struct NameSplitter {
    prefix: Option<Regex>,
}

impl NameSplitter {
    /// Splitter for the given actor prefixes (`Clone` strips `Clone 2 `)
    #[must_use]
    pub fn new<S: AsRef<str>>(actor_prefixes: &[S]) -> Self {
        let alternatives: Vec<String> = actor_prefixes
            .iter()
            .map(|p| p.as_ref().trim())
            .filter(|p| !p.is_empty())
            .map(regex::escape)
            .collect();
        let prefix = (!alternatives.is_empty()).then(|| {
            Regex::new(&format!(r"^(?:{}) \d+ ", alternatives.join("|")))
                .expect("escaped alternatives form a valid regex")
        });
        Self { prefix }
    }

    /// `name` without its actor prefix and structural suffix
    #[must_use]
    pub fn base_name<'a>(&self, name: &'a str) -> &'a str {
        let rest = self
            .prefix
            .as_ref()
            .and_then(|re| re.find(name))
            .map_or(name, |m| &name[m.end()..]);

        STRUCTURAL_SUFFIX
            .find(rest)
            .map_or(rest, |m| &rest[..m.start()])
    }
}

impl Default for NameSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_ACTOR_PREFIXES)
    }
}

/// Resolves a file's timeline names against the ability index
#[derive(Debug)]
pub struct ActionResolver<'a> {
    index: &'a NameIndex,
    bounds: Bounds,
    padding: u32,
    splitter: &'a NameSplitter,
}

impl<'a> ActionResolver<'a> {
    #[must_use]
    pub fn new(index: &'a NameIndex, bounds: Bounds, padding: u32, splitter: &'a NameSplitter) -> Self {
        Self {
            index,
            bounds,
            padding,
            splitter,
        }
    }

    /// The key to record and its id.
    ///
    /// The key is the name itself when it resolves directly, otherwise its
    /// base name when that resolves.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(String, CanonicalId)> {
        if let Some(id) = best_action_id(name, self.index, self.bounds, self.padding) {
            return Some((name.to_string(), id));
        }

        let base = self.splitter.base_name(name);
        if base.is_empty() || base == name {
            return None;
        }
        best_action_id(base, self.index, self.bounds, self.padding).map(|id| (base.to_string(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, CanonicalId)]) -> NameIndex {
        entries.iter().map(|&(name, id)| (name, id)).collect()
    }

    #[test]
    fn test_window_prefers_near_id() {
        let index = index(&[("Fireball", 104), ("Fireball", 9000)]);
        let bounds = Bounds { min: 100, max: 105 };
        assert_eq!(best_action_id("fireball", &index, bounds, DEFAULT_PADDING), Some(104));
    }

    #[test]
    fn test_outside_window_unresolved() {
        let index = index(&[("Fireball", 9000)]);
        let bounds = Bounds { min: 100, max: 105 };
        assert_eq!(best_action_id("Fireball", &index, bounds, DEFAULT_PADDING), None);
    }

    #[test]
    fn test_tie_breaks() {
        let bounds = Bounds { min: 100, max: 200 };
        let inside = index(&[("Stack", 150), ("Stack", 120)]);
        assert_eq!(best_action_id("Stack", &inside, bounds, 100), Some(120));

        let outside = index(&[("Stack", 95), ("Stack", 205)]);
        assert_eq!(best_action_id("Stack", &outside, bounds, 100), Some(95));

        let nearer = index(&[("Stack", 90), ("Stack", 203)]);
        assert_eq!(best_action_id("Stack", &nearer, bounds, 100), Some(203));
    }

    #[test]
    fn test_base_name() {
        let splitter = NameSplitter::default();
        assert_eq!(splitter.base_name("Fireball 2"), "Fireball");
        assert_eq!(splitter.base_name("Fireball x3"), "Fireball");
        assert_eq!(splitter.base_name("Fireball (cast)"), "Fireball");
        assert_eq!(splitter.base_name("Cruel Coil Northeast/Southwest"), "Cruel Coil");
        assert_eq!(splitter.base_name("Grand Entrance?"), "Grand Entrance");
        assert_eq!(splitter.base_name("Clone 2 Fireball left"), "Fireball");
        assert_eq!(splitter.base_name("Fireball"), "Fireball");
    }

    #[test]
    fn test_custom_prefixes() {
        let splitter = NameSplitter::new(&["Clone", "Shade"]);
        assert_eq!(splitter.base_name("Shade 1 Burst"), "Burst");
        let none = NameSplitter::new::<&str>(&[]);
        assert_eq!(none.base_name("Clone 2 Burst"), "Clone 2 Burst");
    }

    #[test]
    fn test_resolver_falls_back_to_base_name() {
        let index = index(&[("Fireball", 104), ("Fireball 2", 500)]);
        let splitter = NameSplitter::default();
        let resolver = ActionResolver::new(&index, Bounds { min: 100, max: 105 }, 100, &splitter);

        assert_eq!(resolver.resolve("Fireball"), Some(("Fireball".to_string(), 104)));
        assert_eq!(resolver.resolve("Fireball 2"), Some(("Fireball".to_string(), 104)));
        assert_eq!(resolver.resolve("Fireball (Right)"), Some(("Fireball".to_string(), 104)));
        assert_eq!(resolver.resolve("Icicle"), None);
    }

    #[test]
    fn test_resolve_actor() {
        let index = index(&[("Lindwurm", 14378), ("Lindwurm", 14380), ("Blood Vessel", 14379)]);
        assert_eq!(resolve_actor("lindwurm", &index), Resolution::Ambiguous(vec![14378, 14380]));
        assert_eq!(resolve_actor("Blood Vessel", &index), Resolution::Unique(14379));
        assert_eq!(resolve_actor("Nobody", &index), Resolution::Unresolved);
        assert_eq!(Resolution::Unique(7).ids(), vec![7]);
    }
}
