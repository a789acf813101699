//! GOSUB/RETURN legalization.
//!
//! A `GOSUB Label` subroutine becomes a named `SUB`:
//!
//! ```text
//! GOSUB DrawBox        DrawBox
//! ...                  ...
//! DrawBox:             Sub DrawBox
//!   LINE ...             LINE ...
//! RETURN               End Sub
//! ```
//!
//! The last bare `RETURN` line before the next routine closes the `SUB`;
//! any earlier `RETURN`, including one inside `IF ... THEN RETURN`, becomes
//! `Exit Sub`.
//!
//! The conversion is heuristic. Nothing checks that the code above a label
//! cannot fall into it, or that the routine does not rely on module-level
//! variables a `SUB` cannot see, so every application carries a
//! "requires manual verification" warning. The rewrite is still applied:
//! leaving `GOSUB` in place is worse for QB64 code.
//!
//! Targets that cannot be converted are reported as errors and left alone:
//! line-number targets, targets without a `Label:` line, routines without a
//! `RETURN` before the next routine, routines that `RETURN` to a label, and
//! labels reached through a computed `ON ... GOSUB` dispatch.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{line_end, split_line_ending, Document, Pass, PassContext, LINE_START};
use crate::report::TransformCategory;

static ON_GOSUB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bON\b[^\n:]*?\bGOSUB[ \t]+([^\n:]*)")
        .expect("ON GOSUB pattern is valid")
});

static GOSUB_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bGOSUB[ \t]+([A-Za-z0-9][A-Za-z0-9_.]*)")
        .expect("GOSUB pattern is valid")
});

static LABEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^([ \t]*)([A-Za-z][A-Za-z0-9_.]*):{}", line_end()))
        .expect("label pattern is valid")
});

static RETURN_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)^({LINE_START})RETURN{}", line_end()))
        .expect("RETURN pattern is valid")
});

/// Any `RETURN` statement, with the word after it (a label target or `ELSE`).
static RETURN_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bRETURN\b(?:[ \t]+([A-Za-z0-9_.]+))?")
        .expect("RETURN statement pattern is valid")
});

/// A routine that will be converted.
#[derive(Debug)]
struct Routine {
    /// The label as spelled on its definition line.
    name: String,
    label_line: usize,
    return_line: usize,
}

/// Converts `GOSUB`/`RETURN` subroutines to `SUB` procedures.
pub struct GosubLegalization;

impl Pass for GosubLegalization {
    fn name(&self) -> &'static str {
        "gosub"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        // Computed dispatches: remember their spans and targets.
        let mut dispatch_spans = Vec::new();
        let mut dispatched = HashSet::new();
        for caps in ON_GOSUB.captures_iter(&doc.text) {
            if let Some(m) = caps.get(0) {
                dispatch_spans.push(m.range());
            }
            for target in caps[1].split(',') {
                let target = target.trim();
                if !target.is_empty() {
                    dispatched.insert(target.to_ascii_uppercase());
                }
            }
        }
        if !dispatch_spans.is_empty() {
            doc.report.error(format!(
                "Left {} computed ON...GOSUB dispatch(es) unchanged; their target labels cannot become SUB procedures",
                dispatch_spans.len()
            ));
        }

        let in_dispatch = |pos: usize| dispatch_spans.iter().any(|span| span.contains(&pos));

        // Plain call targets in first-seen order.
        let mut targets: Vec<String> = Vec::new();
        for caps in GOSUB_CALL.captures_iter(&doc.text) {
            let Some(m) = caps.get(0) else { continue };
            if in_dispatch(m.start()) {
                continue;
            }
            let target = caps[1].to_string();
            if !targets.iter().any(|t| t.eq_ignore_ascii_case(&target)) {
                targets.push(target);
            }
        }
        if targets.is_empty() {
            return doc;
        }

        let lines: Vec<&str> = doc.text.split_inclusive('\n').collect();
        let contents: Vec<&str> = lines.iter().map(|l| split_line_ending(l).0).collect();

        // Label line index per target.
        let label_index = |target: &str| {
            contents.iter().position(|c| {
                LABEL_LINE
                    .captures(c)
                    .is_some_and(|caps| caps[2].eq_ignore_ascii_case(target))
            })
        };

        let mut numeric = Vec::new();
        let mut missing_label = Vec::new();
        let mut candidates = Vec::new();
        for target in &targets {
            if target.chars().all(|c| c.is_ascii_digit()) {
                numeric.push(target.clone());
            } else if dispatched.contains(&target.to_ascii_uppercase()) {
                continue;
            } else if let Some(index) = label_index(target) {
                candidates.push(index);
            } else {
                missing_label.push(target.clone());
            }
        }
        candidates.sort_unstable();

        // A routine ends where the next GOSUB target's label starts,
        // including labels only reached through ON ... GOSUB.
        let mut boundaries = candidates.clone();
        boundaries.extend(
            dispatched
                .iter()
                .filter_map(|target| label_index(target.as_str())),
        );
        boundaries.sort_unstable();

        let mut routines = Vec::new();
        let mut missing_return = Vec::new();
        let mut labeled_return = Vec::new();
        for &label_line in &candidates {
            let name = LABEL_LINE
                .captures(contents[label_line])
                .map(|caps| caps[2].to_string())
                .unwrap_or_default();
            // The routine must return before the next routine starts.
            let limit = boundaries
                .iter()
                .copied()
                .find(|&b| b > label_line)
                .unwrap_or(contents.len());
            let Some(return_line) =
                (label_line + 1..limit).rfind(|&i| RETURN_LINE.is_match(contents[i]))
            else {
                missing_return.push(name);
                continue;
            };
            if (label_line + 1..return_line).any(|i| returns_to_label(contents[i])) {
                labeled_return.push(name);
                continue;
            }
            routines.push(Routine {
                name,
                label_line,
                return_line,
            });
        }

        if !numeric.is_empty() {
            doc.report.error(format!(
                "GOSUB to line number(s) {} cannot be converted to SUB procedures automatically",
                numeric.join(", ")
            ));
        }
        if !missing_label.is_empty() {
            doc.report.error(format!(
                "GOSUB target(s) {} have no label line of their own and were left unchanged",
                missing_label.join(", ")
            ));
        }
        if !missing_return.is_empty() {
            doc.report.error(format!(
                "GOSUB routine(s) {} have no RETURN before the next routine and were left unchanged",
                missing_return.join(", ")
            ));
        }
        if !labeled_return.is_empty() {
            doc.report.error(format!(
                "GOSUB routine(s) {} RETURN to a label, which a SUB cannot do, and were left unchanged",
                labeled_return.join(", ")
            ));
        }
        if routines.is_empty() {
            return doc;
        }

        // Label, early RETURN and final RETURN lines.
        let mut rewritten: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        let mut early_returns = 0;
        for routine in &routines {
            for i in routine.label_line + 1..routine.return_line {
                rewritten[i] = RETURN_STATEMENT
                    .replace_all(lines[i], |caps: &Captures| {
                        early_returns += 1;
                        format!("Exit Sub{}", &caps[0]["RETURN".len()..])
                    })
                    .into_owned();
            }
            let (_, ending) = split_line_ending(lines[routine.label_line]);
            if let Some(caps) = LABEL_LINE.captures(contents[routine.label_line]) {
                rewritten[routine.label_line] =
                    format!("{}Sub {}{}{}", &caps[1], routine.name, &caps[3], ending);
            }
            let (_, ending) = split_line_ending(lines[routine.return_line]);
            if let Some(caps) = RETURN_LINE.captures(contents[routine.return_line]) {
                rewritten[routine.return_line] =
                    format!("{}End Sub{}{}", &caps[1], &caps[2], ending);
            }
        }
        let text = rewritten.concat();

        // Call sites, skipping computed dispatches.
        let mut calls = 0;
        let spans: Vec<_> = ON_GOSUB
            .find_iter(&text)
            .map(|m| m.range())
            .collect();
        let text = GOSUB_CALL
            .replace_all(&text, |caps: &Captures| {
                let whole = &caps[0];
                let start = caps.get(0).map_or(0, |m| m.start());
                if spans.iter().any(|span| span.contains(&start)) {
                    return whole.to_string();
                }
                match routines
                    .iter()
                    .find(|r| r.name.eq_ignore_ascii_case(&caps[1]))
                {
                    Some(routine) => {
                        calls += 1;
                        routine.name.clone()
                    }
                    None => whole.to_string(),
                }
            })
            .into_owned();

        let names: Vec<_> = routines.iter().map(|r| r.name.as_str()).collect();
        let mut description = format!(
            "Converted {} GOSUB routine(s) to SUB procedures ({}) and {} GOSUB call(s) to direct calls",
            routines.len(),
            names.join(", "),
            calls
        );
        if early_returns > 0 {
            description.push_str(&format!("; {early_returns} early RETURN(s) became Exit Sub"));
        }
        doc.report.record(TransformCategory::ControlFlow, description);
        doc.report.warn(format!(
            "GOSUB conversion of {} requires manual verification: code above each label may fall \
             through into the new SUB, and a SUB only sees module-level variables declared SHARED",
            names.join(", ")
        ));
        doc.text = text;
        doc
    }
}

/// Whether `line` holds a `RETURN label`, which has no `SUB` equivalent.
fn returns_to_label(line: &str) -> bool {
    RETURN_STATEMENT.captures_iter(line).any(|caps| {
        caps.get(1)
            .is_some_and(|word| !word.as_str().eq_ignore_ascii_case("ELSE"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::porting::PortingOptions;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Document {
        let options = PortingOptions::default();
        GosubLegalization.apply(Document::new(source), &PassContext::new(&options))
    }

    #[test]
    fn test_gosub_becomes_sub() {
        let source = "\
CLS
GOSUB DrawBox
IF done THEN GOSUB DrawBox
END

DrawBox:
  LINE (0, 0)-(10, 10)
RETURN
";
        let doc = run(source);
        assert_eq!(
            doc.text,
            "\
CLS
DrawBox
IF done THEN DrawBox
END

Sub DrawBox
  LINE (0, 0)-(10, 10)
End Sub
"
        );
        assert_eq!(doc.text.lines().count(), source.lines().count());
        let warnings: Vec<_> = doc.report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("requires manual verification"));
        let record = &doc.report.transformations()[0];
        assert_eq!(record.category, TransformCategory::ControlFlow);
        assert!(record.description.contains("2 GOSUB call(s)"));
    }

    #[test]
    fn test_early_returns_become_exit_sub() {
        let source = "\
GOSUB Check
END
Check:
IF x < 0 THEN
  RETURN
END IF
IF x = 0 THEN RETURN ELSE PRINT \"nonzero\"
PRINT x
RETURN
";
        let doc = run(source);
        assert_eq!(
            doc.text,
            "\
Check
END
Sub Check
IF x < 0 THEN
  Exit Sub
END IF
IF x = 0 THEN Exit Sub ELSE PRINT \"nonzero\"
PRINT x
End Sub
"
        );
        assert!(doc.report.transformations()[0]
            .description
            .ends_with("; 2 early RETURN(s) became Exit Sub"));
    }

    #[test]
    fn test_return_to_label_is_an_error() {
        let source = "GOSUB A\nEND\nA:\nIF k THEN RETURN Done\nRETURN\nDone:\nPRINT 1\n";
        let doc = run(source);
        assert_eq!(doc.text, source);
        assert!(doc.report.errors().next().unwrap().contains("RETURN to a label"));
        assert!(doc.report.transformations().is_empty());
    }

    #[test]
    fn test_line_number_target_is_an_error() {
        let source = "10 GOSUB 100\n20 END\n100 PRINT \"x\"\n110 RETURN\n";
        let doc = run(source);
        assert_eq!(doc.text, source);
        assert_eq!(doc.report.errors().count(), 1);
        assert_eq!(doc.report.warnings().count(), 0);
    }

    #[test]
    fn test_missing_return_is_an_error() {
        let source = "GOSUB A\nEND\nA:\nPRINT 1\n";
        let doc = run(source);
        assert_eq!(doc.text, source);
        assert!(doc.report.errors().next().unwrap().contains("no RETURN"));
    }

    #[test]
    fn test_fall_through_into_next_routine_is_an_error() {
        let source = "GOSUB A\nGOSUB B\nEND\nA:\nPRINT 1\nB:\nPRINT 2\nRETURN\n";
        let doc = run(source);
        assert!(doc.text.contains("Sub B\n"));
        assert!(doc.text.contains("A:\n"));
        assert!(doc.text.contains("GOSUB A"));
        assert_eq!(doc.report.errors().count(), 1);
    }

    #[test]
    fn test_computed_dispatch_left_alone() {
        let source = "ON choice GOSUB One, Two\nEND\nOne:\nRETURN\nTwo:\nRETURN\n";
        let doc = run(source);
        assert_eq!(doc.text, source);
        assert_eq!(doc.report.errors().count(), 1);
        assert!(doc.report.transformations().is_empty());
    }

    #[test]
    fn test_no_gosub_no_change() {
        let doc = run("PRINT 1\nRETURN\n");
        assert_eq!(doc.text, "PRINT 1\nRETURN\n");
        assert!(doc.report.is_empty());
    }
}
