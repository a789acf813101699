//! Structural rewrites: `TYPE` field declarations and whole-array copies.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{line_end, split_line_ending, Document, Pass, PassContext, LINE_START, NAME, SIGIL};
use crate::report::TransformCategory;

static TYPE_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^{LINE_START}TYPE[ \t]+({NAME}){}", line_end()))
        .expect("TYPE header pattern is valid")
});

static TYPE_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^{LINE_START}END[ \t]+TYPE{}", line_end()))
        .expect("END TYPE pattern is valid")
});

static FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^([ \t]*)({NAME})[ \t]+AS[ \t]+(?:(_UNSIGNED)[ \t]+)?(_?[A-Za-z][A-Za-z0-9_]*)(?:[ \t]*\*[ \t]*([0-9]+))?{}",
        line_end()
    ))
    .expect("field pattern is valid")
});

static ARRAY_COPY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)^({LINE_START})(?:LET[ \t]+)?({NAME}{SIGIL}?)[ \t]*\([ \t]*\)[ \t]*=[ \t]*({NAME}{SIGIL}?)[ \t]*\([ \t]*\){}",
        line_end()
    ))
    .expect("array copy pattern is valid")
});

/// Loop variable used by generated array copies.
const COPY_INDEX: &str = "arrayCopyIndex&";

/// Normalizes field lines inside `TYPE ... END TYPE` blocks to
/// `name As Type`, with the type spelled the QB64 way.
pub struct TypeFields;

impl Pass for TypeFields {
    fn name(&self) -> &'static str {
        "type-fields"
    }

    fn apply(&self, mut doc: Document, ctx: &PassContext<'_>) -> Document {
        let lines: Vec<&str> = doc.text.split_inclusive('\n').collect();
        let mut output = Vec::with_capacity(lines.len());
        let mut normalized = 0;
        let mut unterminated = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let (content, _) = split_line_ending(lines[i]);
            let Some(header) = TYPE_HEADER.captures(content) else {
                output.push(lines[i].to_string());
                i += 1;
                continue;
            };
            let Some(end) = (i + 1..lines.len())
                .find(|&j| TYPE_END.is_match(split_line_ending(lines[j]).0))
            else {
                unterminated.push(header[1].to_string());
                output.push(lines[i].to_string());
                i += 1;
                continue;
            };

            output.push(lines[i].to_string());
            for line in &lines[i + 1..end] {
                let (content, ending) = split_line_ending(line);
                match normalize_field(content, ctx) {
                    Some(field) if field != content => {
                        normalized += 1;
                        output.push(format!("{field}{ending}"));
                    }
                    _ => output.push(line.to_string()),
                }
            }
            output.push(lines[end].to_string());
            i = end + 1;
        }

        for name in unterminated {
            doc.report.error(format!(
                "TYPE {name} has no matching END TYPE; its fields were left unchanged"
            ));
        }
        if normalized > 0 {
            doc.text = output.concat();
            doc.report.record(
                TransformCategory::Structure,
                format!("Normalized {normalized} field declaration(s) in TYPE blocks"),
            );
        }
        doc
    }
}

/// Rebuilds one field line, or `None` when it is not a field declaration.
fn normalize_field(content: &str, ctx: &PassContext<'_>) -> Option<String> {
    let caps = FIELD.captures(content)?;
    let base = &caps[4];
    let mut field_type = ctx.catalog.field_type(base).unwrap_or(base).to_string();
    if caps.get(3).is_some() {
        field_type = format!("_Unsigned {field_type}");
    }
    if let Some(length) = caps.get(5) {
        field_type = format!("{field_type} * {}", length.as_str());
    }
    Some(format!("{}{} As {}{}", &caps[1], &caps[2], field_type, &caps[6]))
}

/// Rewrites whole-array assignment `a() = b()` as an element-wise loop.
pub struct ArrayCopies;

impl Pass for ArrayCopies {
    fn name(&self) -> &'static str {
        "array-copy"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        let mut destinations = Vec::new();
        let text = ARRAY_COPY.replace_all(&doc.text, |caps: &Captures| {
            let (target, source) = (&caps[2], &caps[3]);
            destinations.push(target.to_string());
            format!(
                "{prefix}For {i} = LBound({source}) To UBound({source}): \
                 {target}({i}) = {source}({i}): Next {i}{tail}",
                prefix = &caps[1],
                i = COPY_INDEX,
                tail = &caps[4],
            )
        });
        if destinations.is_empty() {
            return doc;
        }
        doc.text = text.into_owned();
        doc.report.record(
            TransformCategory::Structure,
            format!(
                "Converted {} whole-array assignment(s) to element-wise For loops",
                destinations.len()
            ),
        );
        doc.report.warn(format!(
            "Array copy target(s) {} must already be dimensioned to cover the source bounds",
            destinations.join(", ")
        ));
        doc
    }
}
