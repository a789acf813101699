//! Keyword and builtin-name normalization.
//!
//! Table-driven: every word of the program is looked up (case-insensitively)
//! in each rename table of the catalog and replaced by its QB64 spelling.
//! Counting is per table, not per rule, so the report gets at most one line
//! per table.
//!
//! A word directly followed by a type sigil is a variable (`name$`,
//! `key%`), not a keyword, unless the sigil is part of the table entry
//! (`MID$`). A word directly preceded by `.` is a TYPE member.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{Document, Pass, PassContext};
use crate::catalog::RuleTable;
use crate::report::TransformCategory;

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*[$%&!#@]*").expect("word pattern is valid")
});

/// Converts legacy keyword and builtin spellings to QB64 casing.
pub struct LexicalNormalization;

impl Pass for LexicalNormalization {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn apply(&self, mut doc: Document, ctx: &PassContext<'_>) -> Document {
        for table in ctx.catalog.tables() {
            let (text, count) = normalize(&doc.text, &table);
            if count > 0 {
                doc.text = text;
                doc.report.record(
                    TransformCategory::Lexical,
                    format!(
                        "Converted {} {}(s) from legacy casing to modern casing",
                        count, table.label
                    ),
                );
            }
        }
        doc
    }
}

/// Applies one rename table, returning the new text and the number of words
/// whose spelling actually changed.
fn normalize(text: &str, table: &RuleTable) -> (String, usize) {
    let renames: HashMap<String, &'static str> = table
        .rules()
        .map(|(legacy, modern)| (legacy.to_ascii_uppercase(), *modern))
        .collect();

    let mut count = 0;
    let result = WORD.replace_all(text, |caps: &Captures| {
        let whole = caps.get(0).map_or("", |m| m.as_str());
        let start = caps.get(0).map_or(0, |m| m.start());
        if text[..start].ends_with('.') {
            return whole.to_string();
        }
        match renames.get(&whole.to_ascii_uppercase()) {
            Some(modern) if *modern != whole => {
                count += 1;
                (*modern).to_string()
            }
            _ => whole.to_string(),
        }
    });
    (result.into_owned(), count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::porting::{PortingOptions, SourceDialect};

    fn run(source: &str, dialect: SourceDialect) -> Document {
        let options = PortingOptions {
            source_dialect: dialect,
            ..PortingOptions::default()
        };
        LexicalNormalization.apply(Document::new(source), &PassContext::new(&options))
    }

    #[test]
    fn test_keywords_counted_per_table() {
        let doc = run("PRINT X\nIF X THEN PRINT MID$(A$, 1, 2)", SourceDialect::QBasic);
        assert_eq!(doc.text, "Print X\nIf X Then Print Mid$(A$, 1, 2)");
        let records: Vec<_> = doc
            .report
            .transformations()
            .iter()
            .map(|t| t.description.clone())
            .collect();
        assert_eq!(
            records,
            vec![
                "Converted 4 keyword(s) from legacy casing to modern casing".to_string(),
                "Converted 1 string function name(s) from legacy casing to modern casing"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn test_already_modern_is_untouched() {
        let doc = run("Print Sqr(2)", SourceDialect::QBasic);
        assert_eq!(doc.text, "Print Sqr(2)");
        assert!(doc.report.is_empty());
    }

    #[test]
    fn test_sigil_variables_are_not_keywords() {
        let doc = run("key$ = \"a\": name% = 1", SourceDialect::QBasic);
        assert_eq!(doc.text, "key$ = \"a\": name% = 1");
    }

    #[test]
    fn test_whole_words_only() {
        let doc = run("PRINTER = 1: MY_PRINT = 2", SourceDialect::QBasic);
        assert_eq!(doc.text, "PRINTER = 1: MY_PRINT = 2");
    }

    #[test]
    fn test_gw_basic_skips_structured_tier() {
        let doc = run("SELECT CASE X", SourceDialect::GwBasic);
        assert_eq!(doc.text, "SELECT CASE X");
        let doc = run("SELECT CASE X", SourceDialect::QBasic);
        assert_eq!(doc.text, "Select Case X");
    }

    #[test]
    fn test_member_access_untouched() {
        let doc = run("p.TYPE = 1", SourceDialect::QBasic);
        assert_eq!(doc.text, "p.TYPE = 1");
    }
}
