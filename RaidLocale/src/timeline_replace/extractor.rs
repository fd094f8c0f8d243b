//! Recover the existing `timelineReplace` table from trigger source
//!
//! The array span and each element's extent come from the delimiter
//! scanner; inside an element, the locale code, the review marker and the
//! two sub-maps are picked out with small patterns. Any scanner failure
//! degrades to "no prior overrides" with the reason recorded, so the caller
//! can regenerate the table and say so.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::literal;
use super::scanner::{self, ScanError};
use super::table::{LocaleBlock, OrderedTable, TableKind};
use crate::catalog::Locale;

static TABLE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"timelineReplace\s*:\s*\[").expect("valid regex"));

/// Used only when the scanner cannot find the end of the array
static LOOSE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"timelineReplace\s*:\s*\[[\s\S]*?\n\s*\],?").expect("valid regex")
});

static LOCALE_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?locale['"]?\s*:\s*['"](\w+)['"]"#).expect("valid regex")
});

static REVIEW_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?missingTranslations['"]?\s*:\s*true\b"#).expect("valid regex")
});

static SYNC_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?replaceSync['"]?\s*:\s*\{"#).expect("valid regex")
});

static TEXT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"['"]?replaceText['"]?\s*:\s*\{"#).expect("valid regex")
});

/// `'key': 'value'` in either quote style, escapes allowed inside
static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?:'((?:[^'\\\n]|\\.)*)'|"((?:[^"\\\n]|\\.)*)")\s*:\s*(?:'((?:[^'\\\n]|\\.)*)'|"((?:[^"\\\n]|\\.)*)")"#,
    )
    .expect("valid regex")
});

/// Where the table literal sits in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableSpan {
    /// No `timelineReplace` property at all
    Absent,
    /// Byte range from `timelineReplace` through `]` and a trailing comma
    Located(Range<usize>),
    /// The marker exists but its extent could not be determined
    Unlocatable,
}

/// One element of the recovered array
#[derive(Debug, Clone)]
pub struct ExistingBlock {
    /// Locale code as written (may be unknown to us)
    pub locale_code: String,
    pub locale: Option<Locale>,
    pub block: LocaleBlock,
    /// Exact source text of the element, `{` through `}`
    pub raw: String,
    /// Comment lines between the previous element and this one, trimmed
    pub leading: Vec<String>,
}

/// The recovered table
#[derive(Debug, Clone)]
pub struct ExistingTable {
    pub span: TableSpan,
    /// Elements in file order
    pub blocks: Vec<ExistingBlock>,
    /// Comment lines after the last element
    pub trailing: Vec<String>,
    /// Why recovery fell back to an empty result, if it did
    pub degraded: Option<String>,
}

impl ExistingTable {
    fn empty(span: TableSpan, degraded: Option<String>) -> Self {
        Self {
            span,
            blocks: Vec::new(),
            trailing: Vec::new(),
            degraded,
        }
    }

    /// The prior overrides for `locale`
    ///
    /// Only the first element for a locale counts, and an element with no
    /// entries (boilerplate) counts as absent.
    #[must_use]
    pub fn get(&self, locale: Locale) -> Option<&LocaleBlock> {
        self.first_index(locale)
            .map(|i| &self.blocks[i].block)
            .filter(|block| !block.is_empty())
    }

    /// Index of the first element whose locale is `locale`
    #[must_use]
    pub fn first_index(&self, locale: Locale) -> Option<usize> {
        self.blocks.iter().position(|b| b.locale == Some(locale))
    }
}

/// Find and parse the `timelineReplace` table in `text`
#[must_use]
pub fn extract_table(text: &str) -> ExistingTable {
    let Some(marker) = TABLE_MARKER
        .find_iter(text)
        .find(|m| scanner::is_code_at(text, m.start()))
    else {
        return ExistingTable::empty(TableSpan::Absent, None);
    };

    let open = marker.end() - 1;
    match parse_elements(text, open) {
        Ok(Elements {
            blocks,
            trailing,
            close,
        }) => {
            let span = marker.start()..include_trailing_comma(text, close + 1);
            ExistingTable {
                span: TableSpan::Located(span),
                blocks,
                trailing,
                degraded: None,
            }
        }
        Err(e) => {
            tracing::debug!("timelineReplace scan failed: {e}");
            let span = LOOSE_TABLE
                .find_at(text, marker.start())
                .filter(|m| m.start() == marker.start())
                .map_or(TableSpan::Unlocatable, |m| TableSpan::Located(m.range()));
            ExistingTable::empty(span, Some(e.to_string()))
        }
    }
}

fn include_trailing_comma(text: &str, after_close: usize) -> usize {
    if text[after_close..].starts_with(',') {
        after_close + 1
    } else {
        after_close
    }
}

struct Elements {
    blocks: Vec<ExistingBlock>,
    trailing: Vec<String>,
    close: usize,
}

fn parse_elements(text: &str, open: usize) -> Result<Elements, ScanError> {
    let close = scanner::matching_close(text, open)?;
    let mut blocks = Vec::new();
    let mut gap_start = open + 1;

    for range in scanner::child_objects(text, open)? {
        let leading = gap_comments(&text[gap_start..range.start]);
        gap_start = range.end;
        let raw = &text[range.clone()];
        let Some(locale_code) = LOCALE_FIELD
            .captures(raw)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        let block = LocaleBlock {
            replace_sync: parse_sub_map(raw, TableKind::Sync)?,
            replace_text: parse_sub_map(raw, TableKind::Text)?,
            needs_review: REVIEW_FLAG.is_match(raw),
        };

        blocks.push(ExistingBlock {
            locale: Locale::from_code(&locale_code),
            locale_code,
            block,
            raw: raw.to_string(),
            leading,
        });
    }

    Ok(Elements {
        blocks,
        trailing: gap_comments(&text[gap_start..close]),
        close,
    })
}

/// Non-blank lines of the text between two elements, minus separators
fn gap_comments(gap: &str) -> Vec<String> {
    gap.lines()
        .map(|line| line.trim().trim_start_matches(',').trim())
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_sub_map(element: &str, kind: TableKind) -> Result<OrderedTable, ScanError> {
    let field = match kind {
        TableKind::Sync => &*SYNC_FIELD,
        TableKind::Text => &*TEXT_FIELD,
    };
    let Some(m) = field.find(element) else {
        return Ok(OrderedTable::new());
    };

    let open = m.end() - 1;
    let close = scanner::matching_close(element, open)?;
    let body = &element[open + 1..close];

    Ok(KEY_VALUE
        .captures_iter(body)
        .map(|c| {
            let key = c.get(1).or_else(|| c.get(2)).map_or("", |m| m.as_str());
            let value = c.get(3).or_else(|| c.get(4)).map_or("", |m| m.as_str());
            (literal::decode(key), literal::decode(value))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TRIGGERS: &str = r"const triggerSet: TriggerSet<Data> = {
  id: 'AacHeavyweightM4Savage',
  triggers: [],
  timelineReplace: [
    {
      'locale': 'en',
      'replaceText': {
        'Netherwrath Near/Netherwrath Far': 'Netherwrath Near/Far',
      },
    },
    {
      'locale': 'de',
      'missingTranslations': true,
      'replaceSync': {
        'Lindwurm': 'Lindwurm',
      },
      'replaceText': {
        '(?<![ ])Burst': 'Detonation',
        'Sauveur {x}': 'Retter des Arkadions',
        'l\'Arcadion': 'l\'Arcadion',
      },
    },
    {
      'locale': 'fr',
      'replaceSync': {},
      'replaceText': {},
    },
  ],
};

export default triggerSet;
";

    #[test]
    fn test_extract_blocks_in_order() {
        let table = extract_table(TRIGGERS);
        let codes: Vec<_> = table.blocks.iter().map(|b| b.locale_code.as_str()).collect();
        assert_eq!(codes, vec!["en", "de", "fr"]);
        assert!(table.degraded.is_none());

        let de = table.get(Locale::De).unwrap();
        assert!(de.needs_review);
        assert_eq!(de.replace_sync.keys(), vec!["Lindwurm"]);
        assert_eq!(
            de.replace_text.keys(),
            vec!["(?<![ ])Burst", "Sauveur {x}", "l'Arcadion"]
        );
        assert_eq!(de.replace_text.get("l'Arcadion"), Some("l'Arcadion"));
    }

    #[test]
    fn test_span_covers_property_and_comma() {
        let table = extract_table(TRIGGERS);
        let TableSpan::Located(span) = table.span else {
            panic!("expected a located span");
        };
        let covered = &TRIGGERS[span];
        assert!(covered.starts_with("timelineReplace: ["));
        assert!(covered.ends_with("  ],"));
    }

    #[test]
    fn test_boilerplate_block_counts_as_absent() {
        let table = extract_table(TRIGGERS);
        assert!(table.get(Locale::Fr).is_none());
        assert_eq!(table.first_index(Locale::Fr), Some(2));
        assert!(table.get(Locale::Ja).is_none());
    }

    #[test]
    fn test_absent_table() {
        let table = extract_table("const triggerSet = { triggers: [] };\n");
        assert_eq!(table.span, TableSpan::Absent);
        assert!(table.blocks.is_empty());
    }

    #[test]
    fn test_marker_in_comment_ignored() {
        let text = "// timelineReplace: [ old ]\nconst t = {};\n";
        assert_eq!(extract_table(text).span, TableSpan::Absent);
    }

    #[test]
    fn test_unterminated_string_degrades() {
        let text = "const t = {\n  timelineReplace: [\n    {\n      'locale': 'de',\n      'replaceText': {\n        'Lindwurm's Stone': 'x',\n      },\n    },\n  ],\n};\n";
        let table = extract_table(text);
        assert!(table.blocks.is_empty());
        assert!(table.degraded.is_some());
        let TableSpan::Located(span) = table.span else {
            panic!("loose pattern should still find the span");
        };
        assert!(text[span].ends_with("  ],"));
    }

    #[test]
    fn test_comments_between_elements_recovered() {
        let text = "x = {\n  timelineReplace: [\n    // Shared with the normal mode\n    {\n      'locale': 'de',\n      'replaceText': { 'A': '1' },\n    },\n    /* check wording */ {\n      'locale': 'fr',\n      'replaceText': { 'A': '2' },\n    },\n    // end\n  ],\n};\n";
        let table = extract_table(text);
        assert_eq!(table.blocks[0].leading, vec!["// Shared with the normal mode"]);
        assert_eq!(table.blocks[1].leading, vec!["/* check wording */"]);
        assert_eq!(table.trailing, vec!["// end"]);
    }

    #[test]
    fn test_duplicate_keys_first_position_last_value() {
        let text = "x = { timelineReplace: [ { 'locale': 'ja', 'replaceText': { 'A': '1', 'B': '2', 'A': '3' } } ] };";
        let table = extract_table(text);
        let ja = table.get(Locale::Ja).unwrap();
        assert_eq!(ja.replace_text.keys(), vec!["A", "B"]);
        assert_eq!(ja.replace_text.get("A"), Some("3"));
    }
}
