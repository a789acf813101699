//! Declaration restructuring: forward declarations and mixed sigil/AS forms.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{Document, Pass, PassContext, LINE_START, NAME, SIGIL};
use crate::report::TransformCategory;

static FORWARD_DECLARATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)^({LINE_START})DECLARE[ \t]+(SUB|FUNCTION)[ \t]+({NAME}{SIGIL}*)[^:\n]*(?::([^\n]*))?(?:\n|\z)"
    ))
    .expect("forward declaration pattern is valid")
});

static DECLARATION_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)^{LINE_START}(?:DIM|REDIM|STATIC|COMMON|SHARED|SUB|FUNCTION)\b[^\n]*"
    ))
    .expect("declaration statement pattern is valid")
});

static SIGIL_WITH_AS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({NAME}){SIGIL}+([ \t]*\([^)\n]*\))?([ \t]+AS[ \t]+)"
    ))
    .expect("sigil-with-AS pattern is valid")
});

/// Removes `DECLARE SUB`/`DECLARE FUNCTION` statements, which QB64 does not
/// need. The line goes away unless other statements follow the declaration
/// after a `:`; those stay on the line.
pub struct ForwardDeclarations;

impl Pass for ForwardDeclarations {
    fn name(&self) -> &'static str {
        "forward-declarations"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        let mut removed = Vec::new();
        let text = FORWARD_DECLARATION.replace_all(&doc.text, |caps: &Captures| {
            let kind = if caps[2].eq_ignore_ascii_case("SUB") {
                "SUB"
            } else {
                "FUNCTION"
            };
            let declaration = format!("{} {}", kind, &caps[3]);
            let following = caps.get(4).map_or("", |m| m.as_str());
            if following.trim().is_empty() {
                removed.push((declaration, false));
                return String::new();
            }
            removed.push((declaration, true));
            let newline = if caps[0].ends_with('\n') { "\n" } else { "" };
            format!("{}{}{}", &caps[1], following.trim_start(), newline)
        });
        if removed.is_empty() {
            return doc;
        }
        doc.text = text.into_owned();
        for (declaration, kept_line) in removed {
            let detail = if kept_line {
                "the statements after it on the same line were kept"
            } else {
                "line removed"
            };
            doc.report.record(
                TransformCategory::Declaration,
                format!(
                    "Removed forward declaration of {} ({}; QB64 does not need DECLARE)",
                    declaration, detail
                ),
            );
        }
        doc
    }
}

/// Drops the type sigil from declarations that also carry an explicit
/// `AS` type: `DIM count% AS INTEGER` becomes `DIM count AS INTEGER`.
pub struct MixedDeclarations;

impl Pass for MixedDeclarations {
    fn name(&self) -> &'static str {
        "mixed-declarations"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        let mut count = 0;
        let text = DECLARATION_STATEMENT.replace_all(&doc.text, |statement: &Captures| {
            SIGIL_WITH_AS
                .replace_all(&statement[0], |caps: &Captures| {
                    count += 1;
                    format!(
                        "{}{}{}",
                        &caps[1],
                        caps.get(2).map_or("", |m| m.as_str()),
                        &caps[3]
                    )
                })
                .into_owned()
        });
        if count > 0 {
            doc.text = text.into_owned();
            doc.report.record(
                TransformCategory::Declaration,
                format!(
                    "Removed redundant type sigil from {} declaration(s) that also have an explicit AS type",
                    count
                ),
            );
        }
        doc
    }
}
