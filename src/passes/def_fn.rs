//! Legacy `DEF FN` extraction.
//!
//! `DEF FN` defines a module-level inline function. QB64 still parses the
//! single-line form but the idiomatic replacement is a `FUNCTION` procedure,
//! and the multi-line `DEF FN ... END DEF` form is not supported at all.
//!
//! Both variants are handled:
//!
//! ```text
//! DEF FNArea!(r!)              Function Area (r As Single) As Single
//!     FNArea! = 3.14 * r! * r!     Area = 3.14 * r * r
//! END DEF                      End Function
//!
//! DEF FNSquare(x#) = x# * x#   Function Square (x As Double)
//!                                  Square = x * x
//!                              End Function
//! ```
//!
//! The `FN` prefix is stripped from the name, a name sigil becomes an
//! explicit return type, and parameter sigils become `As` clauses. Once all
//! definitions are rewritten, a second sweep over the whole document strips
//! `FN` from every call site, because call sites are textually unrelated to
//! the definition and have to be found independently.
//!
//! The block variant runs first so that a block header is never read as a
//! single-line definition.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{
    line_end, newline_of, split_line_ending, Document, Pass, PassContext, LINE_START, NAME, SIGIL,
};
use crate::catalog::{split_sigil, TypeSigil};
use crate::report::TransformCategory;

static BLOCK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^({LINE_START})DEF[ \t]*FN({NAME})({SIGIL})?[ \t]*(?:\(([^)\n]*)\))?{}",
        line_end()
    ))
    .expect("DEF FN block header pattern is valid")
});

static BLOCK_END: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^({LINE_START})END[ \t]+DEF{}", line_end()))
        .expect("END DEF pattern is valid")
});

static EXIT_DEF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bEXIT[ \t]+DEF\b").expect("EXIT DEF pattern is valid"));

static SINGLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)^({LINE_START})DEF[ \t]*FN({NAME})({SIGIL})?[ \t]*(?:\(([^)\n]*)\))?[ \t]*=[ \t]*([^\n]*?){}",
        line_end()
    ))
    .expect("single-line DEF FN pattern is valid")
});

const BODY_INDENT: &str = "    ";

/// A parameter of a `DEF FN` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Parameter {
    name: String,
    sigil: Option<TypeSigil>,
    /// The parameter text when it is not a plain `name[sigil]`.
    verbatim: Option<String>,
}

impl Parameter {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (name, sigil) = split_sigil(raw);
        let plain = !name.is_empty()
            && name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if plain {
            Self {
                name: name.to_string(),
                sigil,
                verbatim: None,
            }
        } else {
            Self {
                name: raw.to_string(),
                sigil: None,
                verbatim: Some(raw.to_string()),
            }
        }
    }

    fn declaration(&self) -> String {
        match (&self.verbatim, self.sigil) {
            (Some(text), _) => text.clone(),
            (None, Some(sigil)) => format!("{} As {}", self.name, sigil.explicit_type()),
            (None, None) => self.name.clone(),
        }
    }
}

/// One `DEF FN` definition, as read from its header.
#[derive(Debug, Clone)]
struct Definition {
    name: String,
    sigil: Option<TypeSigil>,
    parameters: Vec<Parameter>,
}

impl Definition {
    fn from_captures(caps: &Captures) -> Self {
        let sigil = caps
            .get(3)
            .and_then(|m| m.as_str().chars().next())
            .and_then(TypeSigil::from_char);
        let parameters = caps
            .get(4)
            .map(|m| {
                m.as_str()
                    .split(',')
                    .filter(|p| !p.trim().is_empty())
                    .map(Parameter::parse)
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: caps[2].to_string(),
            sigil,
            parameters,
        }
    }

    /// `FNName$` as it was written, for messages.
    fn legacy_name(&self) -> String {
        match self.sigil {
            Some(sigil) => format!("FN{}{}", self.name, sigil),
            None => format!("FN{}", self.name),
        }
    }

    fn signature(&self, prefix: &str) -> String {
        let mut line = format!("{}Function {}", prefix, self.name);
        if !self.parameters.is_empty() {
            let params: Vec<_> = self.parameters.iter().map(Parameter::declaration).collect();
            line.push_str(&format!(" ({})", params.join(", ")));
        }
        if let Some(sigil) = self.sigil {
            line.push_str(" As ");
            line.push_str(sigil.explicit_type());
        }
        line
    }

    /// Drops parameter sigils inside the body: with `x As Double` declared,
    /// `x#` becomes `x`.
    fn rewrite_body(&self, body: &str) -> String {
        let mut body = EXIT_DEF.replace_all(body, "Exit Function").into_owned();
        for param in &self.parameters {
            if let (None, Some(sigil)) = (&param.verbatim, param.sigil) {
                let pattern = format!(
                    r"(?i)\b{}{}",
                    regex::escape(&param.name),
                    regex::escape(&sigil.to_string())
                );
                if let Ok(re) = Regex::new(&pattern) {
                    body = re.replace_all(&body, param.name.as_str()).into_owned();
                }
            }
        }
        body
    }
}

/// Strips the `FN` prefix from every call of the converted functions.
/// Returns the new text and the number of call sites rewritten.
fn strip_call_prefixes(text: &str, definitions: &[Definition]) -> (String, usize) {
    let mut text = text.to_string();
    let mut count = 0;
    for def in definitions {
        let pattern = format!(r"(?i)\bFN{}\b{}?", regex::escape(&def.name), SIGIL);
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        let rewritten = re.replace_all(&text, |_: &Captures| {
            count += 1;
            def.name.clone()
        });
        text = rewritten.into_owned();
    }
    (text, count)
}

/// Splits a single-line body at its first `:` outside parentheses.
/// Returns the expression and, when present, the statements after it.
fn split_statement(body: &str) -> (&str, Option<&str>) {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                let following = body[i + 1..].trim();
                return (&body[..i], (!following.is_empty()).then_some(following));
            }
            _ => {}
        }
    }
    (body, None)
}

fn name_list(definitions: &[Definition]) -> String {
    definitions
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn record_call_sites(doc: &mut Document, definitions: &[Definition]) {
    let (text, count) = strip_call_prefixes(&doc.text, definitions);
    if count > 0 {
        doc.text = text;
        doc.report.record(
            TransformCategory::Declaration,
            format!(
                "Removed the FN prefix from {} call site(s) of converted DEF FN function(s)",
                count
            ),
        );
    }
}

/// Converts `DEF FN ... END DEF` blocks to `FUNCTION` procedures.
pub struct DefFnBlocks;

impl Pass for DefFnBlocks {
    fn name(&self) -> &'static str {
        "def-fn-block"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        let lines: Vec<&str> = doc.text.split_inclusive('\n').collect();
        let mut out = String::with_capacity(doc.text.len());
        let mut converted = Vec::new();
        let mut errors = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let (content, ending) = split_line_ending(lines[i]);
            let Some(caps) = BLOCK_HEADER.captures(content) else {
                out.push_str(lines[i]);
                i += 1;
                continue;
            };
            let def = Definition::from_captures(&caps);

            // First END DEF wins; reaching another header first means this
            // block is unterminated.
            let close = lines[i + 1..]
                .iter()
                .position(|l| {
                    let (c, _) = split_line_ending(l);
                    BLOCK_END.is_match(c) || BLOCK_HEADER.is_match(c)
                })
                .map(|offset| i + 1 + offset)
                .filter(|&j| BLOCK_END.is_match(split_line_ending(lines[j]).0));

            let Some(j) = close else {
                errors.push(format!(
                    "DEF {} has no matching END DEF; the definition was left unchanged",
                    def.legacy_name()
                ));
                out.push_str(lines[i]);
                i += 1;
                continue;
            };

            let tail = caps.get(5).map_or("", |m| m.as_str());
            out.push_str(&def.signature(&caps[1]));
            out.push_str(tail);
            out.push_str(ending);

            let base_indent: String = content
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            for body in &lines[i + 1..j] {
                let (body_content, body_ending) = split_line_ending(body);
                let trimmed = body_content.trim();
                if !trimmed.is_empty() {
                    out.push_str(&base_indent);
                    out.push_str(BODY_INDENT);
                    out.push_str(&def.rewrite_body(trimmed));
                }
                out.push_str(body_ending);
            }

            let (end_content, end_ending) = split_line_ending(lines[j]);
            if let Some(end_caps) = BLOCK_END.captures(end_content) {
                out.push_str(&end_caps[1]);
                out.push_str("End Function");
                out.push_str(end_caps.get(2).map_or("", |m| m.as_str()));
            }
            out.push_str(end_ending);

            converted.push(def);
            i = j + 1;
        }

        for error in errors {
            doc.report.error(error);
        }
        if converted.is_empty() {
            return doc;
        }

        doc.text = out;
        doc.report.record(
            TransformCategory::Declaration,
            format!(
                "Converted {} multi-line DEF FN definition(s) to FUNCTION procedures: {}",
                converted.len(),
                name_list(&converted)
            ),
        );
        record_call_sites(&mut doc, &converted);
        doc
    }
}

/// Converts single-line `DEF FNname(params) = expr` definitions.
pub struct DefFnLines;

impl Pass for DefFnLines {
    fn name(&self) -> &'static str {
        "def-fn-line"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        let newline = newline_of(&doc.text);
        let mut converted = Vec::new();
        let mut moved_statements = 0;

        let text = SINGLE_LINE.replace_all(&doc.text, |caps: &Captures| {
            let def = Definition::from_captures(caps);
            let prefix = &caps[1];
            let base_indent: String = prefix
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .collect();
            let tail = caps.get(6).map_or("", |m| m.as_str());
            let carriage_return = if tail.ends_with('\r') { "\r" } else { "" };
            let (body, following) = split_statement(&caps[5]);

            let mut block = format!(
                "{}{}{nl}{}{}{} = {}{nl}{}End Function",
                def.signature(prefix),
                tail.trim_end(),
                base_indent,
                BODY_INDENT,
                def.name,
                def.rewrite_body(body.trim()),
                base_indent,
                nl = newline,
            );
            if let Some(following) = following {
                moved_statements += 1;
                block.push_str(newline);
                block.push_str(&base_indent);
                block.push_str(following);
            }
            block.push_str(carriage_return);
            converted.push(def);
            block
        });

        if converted.is_empty() {
            return doc;
        }
        doc.text = text.into_owned();
        let mut description = format!(
            "Converted {} single-line DEF FN definition(s) to FUNCTION procedures: {} \
             (each definition now spans 3 lines)",
            converted.len(),
            name_list(&converted)
        );
        if moved_statements > 0 {
            description.push_str(&format!(
                "; statements following {moved_statements} definition(s) were moved to their own line after End Function"
            ));
        }
        doc.report.record(TransformCategory::Declaration, description);
        record_call_sites(&mut doc, &converted);
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SIGILS;
    use crate::porting::PortingOptions;
    use pretty_assertions::assert_eq;

    fn run(pass: &dyn Pass, source: &str) -> Document {
        let options = PortingOptions::default();
        pass.apply(Document::new(source), &PassContext::new(&options))
    }

    #[test]
    fn test_single_line_definition() {
        let doc = run(&DefFnLines, "DEF FNSquare(x#) = x# * x#\nPRINT FNSquare(3)\n");
        assert_eq!(
            doc.text,
            "Function Square (x As Double)\n    Square = x * x\nEnd Function\nPRINT Square(3)\n"
        );
        let records = doc.report.transformations();
        assert_eq!(records.len(), 2);
        assert!(records[0].description.contains("Converted 1 single-line DEF FN"));
        assert!(records[1].description.contains("1 call site(s)"));
    }

    #[test]
    fn test_single_line_with_return_sigil_and_no_params() {
        let doc = run(&DefFnLines, "DEF FNRate! = 0.05");
        assert_eq!(doc.text, "Function Rate As Single\n    Rate = 0.05\nEnd Function");
    }

    #[test]
    fn test_block_definition() {
        let source = "\
DEF FNArea!(r!)
  IF r! < 0 THEN EXIT DEF
  FNArea! = 3.14 * r! * r!
END DEF
PRINT FNArea!(2)
";
        let doc = run(&DefFnBlocks, source);
        assert_eq!(
            doc.text,
            "\
Function Area (r As Single) As Single
    IF r < 0 THEN Exit Function
    Area = 3.14 * r * r
End Function
PRINT Area(2)
"
        );
        assert_eq!(doc.text.lines().count(), source.lines().count());
    }

    #[test]
    fn test_block_is_not_taken_for_single_line() {
        let source = "DEF FNTwice(n%)\n  FNTwice = n% * 2\nEND DEF\n";
        let doc = run(&DefFnLines, source);
        assert_eq!(doc.text, source);
        assert!(doc.report.is_empty());
    }

    #[test]
    fn test_unterminated_block_is_an_error() {
        let source = "DEF FNBroken(a)\n  FNBroken = a\nPRINT 1\n";
        let doc = run(&DefFnBlocks, source);
        assert_eq!(doc.text, source);
        assert_eq!(doc.report.errors().count(), 1);
        assert!(doc.report.transformations().is_empty());
    }

    #[test]
    fn test_non_greedy_first_end_def() {
        let source = "DEF FNA\n  FNA = 1\nEND DEF\nDEF FNB\n  FNB = 2\nEND DEF\n";
        let doc = run(&DefFnBlocks, source);
        assert_eq!(
            doc.text,
            "Function A\n    A = 1\nEnd Function\nFunction B\n    B = 2\nEnd Function\n"
        );
    }

    #[test]
    fn test_call_sweep_respects_word_boundaries() {
        let doc = run(&DefFnLines, "DEF FNF(x) = x + 1\nPRINT FNF(1) + FNFX(2)\n");
        assert!(doc.text.contains("PRINT F(1) + FNFX(2)"));
    }

    #[test]
    fn test_every_sigil_becomes_an_explicit_type() {
        for sigil in SIGILS {
            let source = format!("DEF FNv{0}(p{0}) = p{0}", sigil);
            let doc = run(&DefFnLines, &source);
            let expected = format!(
                "Function v (p As {0}) As {0}",
                sigil.explicit_type()
            );
            assert!(doc.text.starts_with(&expected), "{}", doc.text);
            assert!(!doc.text.contains(sigil.as_char()), "{}", doc.text);
        }
    }

    #[test]
    fn test_statements_after_definition_stay_at_module_level() {
        let doc = run(&DefFnLines, "DEF FNA(X) = X * 2: PRINT FNA(1): CLS\r\nEND\r\n");
        assert_eq!(
            doc.text,
            "Function A (X)\r\n    A = X * 2\r\nEnd Function\r\nPRINT A(1): CLS\r\nEND\r\n"
        );
        assert!(doc.report.transformations()[0]
            .description
            .ends_with("statements following 1 definition(s) were moved to their own line after End Function"));
    }

    #[test]
    fn test_split_statement_ignores_nested_colons() {
        assert_eq!(split_statement("f(a: b) + 1"), ("f(a: b) + 1", None));
        assert_eq!(split_statement("x * 2:  "), ("x * 2", None));
        assert_eq!(split_statement("x * 2: CLS"), ("x * 2", Some("CLS")));
    }

    #[test]
    fn test_line_number_prefix_kept() {
        let doc = run(&DefFnLines, "10 DEF FNA(X) = X * 2\n20 PRINT FNA(4)\n");
        assert!(doc.text.starts_with("10 Function A (X)\n    A = X * 2\nEnd Function\n"));
        assert!(doc.text.ends_with("20 PRINT A(4)\n"));
    }
}
