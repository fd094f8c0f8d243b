//! Serialize locale blocks and patch them into the trigger file

use std::sync::LazyLock;

use regex::Regex;

use super::extractor::TableSpan;
use super::literal;
use super::table::{LocaleBlock, OrderedTable, TableKind};
use crate::error::{Error, Result};

/// `};` closing the trigger set, right before `export default <name>;`
static INSERTION_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*\};[ \t]*\r?\n\s*export\s+default\s+\w+\s*;").expect("valid regex")
});

const ELEMENT_INDENT: &str = "    ";
const FIELD_INDENT: &str = "      ";
const ENTRY_INDENT: &str = "        ";

/// Line ending to generate with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// CRLF if the file uses it anywhere
    #[must_use]
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// The element object for one locale, `{` through `}`.
///
/// Empty sub-maps are left out.
#[must_use]
pub fn render_block(locale_code: &str, block: &LocaleBlock, eol: LineEnding) -> String {
    let eol = eol.as_str();
    let mut out = String::new();

    out.push('{');
    out.push_str(eol);
    out.push_str(&format!("{FIELD_INDENT}'locale': {},{eol}", literal::quote(locale_code)));
    if block.needs_review {
        out.push_str(&format!("{FIELD_INDENT}'missingTranslations': true,{eol}"));
    }
    for kind in TableKind::ALL {
        render_sub_map(&mut out, kind, block.table(kind), eol);
    }
    out.push_str(ELEMENT_INDENT);
    out.push('}');
    out
}

fn render_sub_map(out: &mut String, kind: TableKind, table: &OrderedTable, eol: &str) {
    if table.is_empty() {
        return;
    }
    out.push_str(&format!("{FIELD_INDENT}'{}': {{{eol}", kind.field_name()));
    for entry in table.iter() {
        out.push_str(&format!(
            "{ENTRY_INDENT}{}: {},{eol}",
            literal::quote(&entry.key),
            literal::quote(&entry.value)
        ));
    }
    out.push_str(&format!("{FIELD_INDENT}}},{eol}"));
}

/// One array element with the comment lines written above it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableElement {
    pub comments: Vec<String>,
    pub text: String,
}

impl TableElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            comments: Vec::new(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn with_comments(mut self, comments: &[String]) -> Self {
        self.comments = comments.to_vec();
        self
    }
}

/// The whole `timelineReplace: [ .. ],` property.
///
/// `trailing` comment lines go after the last element.
#[must_use]
pub fn render_table(elements: &[TableElement], trailing: &[String], eol: LineEnding) -> String {
    let eol = eol.as_str();
    let mut out = format!("timelineReplace: [{eol}");
    for element in elements {
        push_comments(&mut out, &element.comments, eol);
        out.push_str(ELEMENT_INDENT);
        out.push_str(&element.text);
        out.push(',');
        out.push_str(eol);
    }
    push_comments(&mut out, trailing, eol);
    out.push_str("  ],");
    out
}

fn push_comments(out: &mut String, comments: &[String], eol: &str) {
    for line in comments {
        out.push_str(ELEMENT_INDENT);
        out.push_str(line);
        out.push_str(eol);
    }
}

/// Patched file text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub content: String,
    pub changed: bool,
}

/// Put `table` into `text`: over the existing span, or before the closing
/// `};` of the trigger set when there is none.
///
/// # Errors
/// [`Error::UnlocatableBlock`] if the existing table's extent is unknown,
/// [`Error::NoInsertionPoint`] if there is no table and no `export default`.
pub fn apply(text: &str, span: &TableSpan, table: &str) -> Result<Patch> {
    let content = match span {
        TableSpan::Located(range) => {
            let mut content = String::with_capacity(text.len() + table.len());
            content.push_str(&text[..range.start]);
            content.push_str(table);
            content.push_str(&text[range.end..]);
            content
        }
        TableSpan::Absent => {
            let at = INSERTION_POINT
                .find(text)
                .map(|m| m.start())
                .ok_or(Error::NoInsertionPoint)?;
            let eol = LineEnding::detect(text).as_str();
            let mut content = String::with_capacity(text.len() + table.len() + 4);
            content.push_str(&text[..at]);
            content.push_str("  ");
            content.push_str(table);
            content.push_str(eol);
            content.push_str(&text[at..]);
            content
        }
        TableSpan::Unlocatable => return Err(Error::UnlocatableBlock),
    };

    let changed = content != text;
    Ok(Patch { content, changed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_block() -> LocaleBlock {
        LocaleBlock {
            replace_sync: [("Lindwurm", "Lindwurm")].into_iter().collect(),
            replace_text: [("l'Arcadion", "l'Arcadion"), ("(?<![ ])Burst", "Detonation")]
                .into_iter()
                .collect(),
            needs_review: true,
        }
    }

    #[test]
    fn test_render_block_layout() {
        let rendered = render_block("de", &sample_block(), LineEnding::Lf);
        assert_eq!(
            rendered,
            "{\n      'locale': 'de',\n      'missingTranslations': true,\n      'replaceSync': {\n        'Lindwurm': 'Lindwurm',\n      },\n      'replaceText': {\n        'l\\'Arcadion': 'l\\'Arcadion',\n        '(?<![ ])Burst': 'Detonation',\n      },\n    }"
        );
    }

    #[test]
    fn test_empty_sub_map_omitted() {
        let block = LocaleBlock {
            replace_text: [("Stack", "Sammeln")].into_iter().collect(),
            ..LocaleBlock::default()
        };
        let rendered = render_block("de", &block, LineEnding::CrLf);
        assert!(!rendered.contains("replaceSync"));
        assert!(!rendered.contains("missingTranslations"));
        assert!(rendered.contains("'Stack': 'Sammeln',\r\n"));
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&[TableElement::new("{ 'locale': 'en' }")], &[], LineEnding::Lf);
        assert_eq!(table, "timelineReplace: [\n    { 'locale': 'en' },\n  ],");
    }

    #[test]
    fn test_render_table_keeps_comments() {
        let elements = [
            TableElement::new("{ 'locale': 'en' }").with_comments(&["// English overrides".to_string()]),
            TableElement::new("{ 'locale': 'de' }"),
        ];
        let trailing = ["/* more to come */".to_string()];
        let table = render_table(&elements, &trailing, LineEnding::CrLf);
        assert_eq!(
            table,
            "timelineReplace: [\r\n    // English overrides\r\n    { 'locale': 'en' },\r\n    { 'locale': 'de' },\r\n    /* more to come */\r\n  ],"
        );
    }

    #[test]
    fn test_apply_inserts_before_export() {
        let text = "const triggerSet = {\n  triggers: [],\n};\n\nexport default triggerSet;\n";
        let patch = apply(text, &TableSpan::Absent, "timelineReplace: [\n  ],").unwrap();
        assert!(patch.changed);
        assert_eq!(
            patch.content,
            "const triggerSet = {\n  triggers: [],\n  timelineReplace: [\n  ],\n};\n\nexport default triggerSet;\n"
        );
    }

    #[test]
    fn test_apply_requires_insertion_point() {
        assert!(matches!(
            apply("const x = 1;\n", &TableSpan::Absent, "timelineReplace: [],"),
            Err(Error::NoInsertionPoint)
        ));
        assert!(matches!(
            apply("x", &TableSpan::Unlocatable, ""),
            Err(Error::UnlocatableBlock)
        ));
    }

    #[test]
    fn test_apply_same_text_is_unchanged() {
        let text = "a = { timelineReplace: [\n  ], };";
        let start = text.find("timelineReplace").unwrap();
        let end = text.find("],").unwrap() + 2;
        let patch = apply(text, &TableSpan::Located(start..end), &text[start..end]).unwrap();
        assert!(!patch.changed);
        assert_eq!(patch.content, text);
    }

    #[test]
    fn test_detect_line_ending() {
        assert_eq!(LineEnding::detect("a\r\nb\n"), LineEnding::CrLf);
        assert_eq!(LineEnding::detect("a\nb\n"), LineEnding::Lf);
    }
}
