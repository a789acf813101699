//! QB64-only idioms and feature injection, both gated by
//! `add_modern_features`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{newline_of, Document, Pass, PassContext, LINE_START};
use crate::report::TransformCategory;

static PI_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b4[ \t]*\*[ \t]*ATN[ \t]*\([ \t]*1[ \t]*\)|\bATN[ \t]*\([ \t]*1[ \t]*\)[ \t]*\*[ \t]*4\b",
    )
    .expect("pi pattern is valid")
});

static END_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)(^{LINE_START}|\bTHEN[ \t]+|\bELSE[ \t]+|:[ \t]*)END\b"
    ))
    .expect("END pattern is valid")
});

static RESIZE_PRESENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*\$RESIZE\b").expect("resize pattern is valid"));

static TITLE_PRESENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*_TITLE\b").expect("title pattern is valid"));

/// Rewrites legacy idioms that have a direct QB64 spelling.
pub struct ModernIdioms;

impl Pass for ModernIdioms {
    fn name(&self) -> &'static str {
        "modern-idioms"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        let (text, pi) = replace_pi(&doc.text);
        if pi > 0 {
            doc.text = text;
            doc.report.record(
                TransformCategory::Idiom,
                format!("Replaced {pi} ATN(1) * 4 expression(s) with the _Pi constant"),
            );
        }

        let (text, ends) = replace_end(&doc.text);
        if ends > 0 {
            doc.text = text;
            doc.report.record(
                TransformCategory::Idiom,
                format!("Replaced {ends} bare END statement(s) with System 0"),
            );
        }
        doc
    }
}

/// Replaces `4 * ATN(1)` and `ATN(1) * 4` where the product is a whole
/// operand: an adjacent `/`, `\` or `^` would bind part of it differently.
fn replace_pi(text: &str) -> (String, usize) {
    let mut count = 0;
    let result = PI_EXPRESSION.replace_all(text, |caps: &Captures| {
        let Some(m) = caps.get(0) else {
            return String::new();
        };
        let before = text[..m.start()].trim_end_matches([' ', '\t']).chars().last();
        let after = text[m.end()..].trim_start_matches([' ', '\t']).chars().next();
        let bound_before = matches!(before, Some('/' | '\\' | '^' | '.'));
        let bound_after = matches!(after, Some('^' | '.'))
            || matches!(text[m.end()..].chars().next(), Some(c) if c.is_ascii_digit());
        if bound_before || bound_after {
            m.as_str().to_string()
        } else {
            count += 1;
            "_Pi".to_string()
        }
    });
    (result.into_owned(), count)
}

/// Replaces `END` used as a statement (not `END IF`, `END SUB`, ...) with
/// `System 0`.
fn replace_end(text: &str) -> (String, usize) {
    let mut count = 0;
    let result = END_STATEMENT.replace_all(text, |caps: &Captures| {
        let Some(m) = caps.get(0) else {
            return String::new();
        };
        let rest = text[m.end()..].trim_start_matches([' ', '\t']);
        let terminated = match rest.chars().next() {
            None | Some(':' | '\r' | '\n' | '\u{E002}') => true,
            Some(_) => {
                rest.get(..4).is_some_and(|word| word.eq_ignore_ascii_case("ELSE"))
                    && !rest[4..]
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
            }
        };
        if terminated {
            count += 1;
            format!("{}System 0", &caps[1])
        } else {
            m.as_str().to_string()
        }
    });
    (result.into_owned(), count)
}

/// Prepends the QB64 window setup lines: `$Resize:Smooth` and a `_Title`.
pub struct ModernFeatures;

impl Pass for ModernFeatures {
    fn name(&self) -> &'static str {
        "modern-features"
    }

    fn apply(&self, mut doc: Document, ctx: &PassContext<'_>) -> Document {
        if doc.text.trim().is_empty() {
            return doc;
        }
        let newline = newline_of(&doc.text);
        let mut header = String::new();

        if !RESIZE_PRESENT.is_match(&doc.text) {
            header.push_str("$Resize:Smooth");
            header.push_str(newline);
            doc.report.record(
                TransformCategory::Modernization,
                "Added $Resize:Smooth so the window can be resized (1 line added at the top)",
            );
        }
        if !TITLE_PRESENT.is_match(&doc.text) {
            let title = ctx.options.title();
            header.push_str(&format!("_Title \"{title}\""));
            header.push_str(newline);
            doc.report.record(
                TransformCategory::Modernization,
                format!("Added _Title \"{title}\" window title (1 line added at the top)"),
            );
        }

        if !header.is_empty() {
            doc.text.insert_str(0, &header);
        }
        doc
    }
}
