//! Residual-risk diagnostics.
//!
//! A non-mutating scan over the rewritten program. Each rule counts its
//! occurrences and produces at most one warning, with the count embedded in
//! the message:
//!
//! - several `IF ... THEN` statements chained on one physical line
//! - a `DIM`/`REDIM` statement declaring more than one array
//! - a `FUNCTION` declared with an explicit `AS` return type
//!
//! With `optimize_performance` two advisories are added: `DO` loops in a
//! program that never calls `_Limit`, and empty `FOR ... NEXT` delay loops.
//!
//! [`analyze`] runs the same rules, plus the hardware-access check, over
//! arbitrary text without porting it.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::lexer::{MaskedSource, COMMENT_TAIL};
use crate::passes::{scan_hardware_access, LINE_START, NAME, SIGIL};
use crate::porting::PortingOptions;
use crate::report::{assess, Compatibility, Diagnostic, Severity};

static CHAINED_IF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)\bIF\b[^\n]*?\bTHEN\b[^\n]*?:[ \t]*IF\b[^\n]*?\bTHEN\b")
        .expect("chained IF pattern is valid")
});

static DIM_STATEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?im)^{LINE_START}(?:DIM|REDIM)\b([^\n:]*)"))
        .expect("DIM pattern is valid")
});

static TYPED_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)^{LINE_START}FUNCTION[ \t]+{NAME}[ \t]*(?:\((?:[^()\n]|\([^()\n]*\))*\))?[ \t]+AS[ \t]+_?{NAME}"
    ))
    .expect("typed FUNCTION pattern is valid")
});

static DO_LOOP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?im)^{LINE_START}DO\b")).expect("DO pattern is valid")
});

static LIMIT_CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b_LIMIT\b").expect("_Limit pattern is valid"));

static EMPTY_FOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?im)\bFOR[ \t]+{NAME}{SIGIL}?[ \t]*=[^\n:]*?\bTO\b[^\n:]*(?::[ \t]*|{COMMENT_TAIL}\n{LINE_START})NEXT\b"
    ))
    .expect("empty FOR pattern is valid")
});

/// Scans already-masked program text.
///
/// Used by the porting pipeline, whose text is masked for the whole run.
pub(crate) fn scan_masked(text: &str, options: &PortingOptions) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    let mut warn_if = |count: usize, message: String| {
        if count > 0 {
            found.push(Diagnostic::warning(message));
        }
    };

    let chained = CHAINED_IF.find_iter(text).count();
    warn_if(
        chained,
        format!(
            "Found {chained} line(s) with chained IF...THEN statements; \
             consider rewriting them as block IF statements"
        ),
    );

    let multi_array = DIM_STATEMENT
        .captures_iter(text)
        .filter(|caps| array_count(&caps[1]) > 1)
        .count();
    warn_if(
        multi_array,
        format!(
            "Found {multi_array} DIM statement(s) declaring several arrays at once; \
             consider one array per DIM"
        ),
    );

    let typed = TYPED_FUNCTION.find_iter(text).count();
    warn_if(
        typed,
        format!(
            "Found {typed} FUNCTION(s) with an explicit AS return type; \
             QB64 style prefers a type sigil on the function name"
        ),
    );

    if options.optimize_performance {
        let loops = if LIMIT_CALL.is_match(text) {
            0
        } else {
            DO_LOOP.find_iter(text).count()
        };
        warn_if(
            loops,
            format!(
                "Found {loops} DO loop(s) in a program that never calls _Limit; \
                 add _Limit to keep the loop from using a whole CPU core"
            ),
        );

        let delays = EMPTY_FOR.find_iter(text).count();
        warn_if(
            delays,
            format!(
                "Found {delays} empty FOR...NEXT delay loop(s); their speed depends on the CPU, \
                 use _Delay instead"
            ),
        );
    }

    debug!("diagnostics found {} warning(s)", found.len());
    found
}

/// Counts the top-level items of a declaration list that have a dimension
/// list, e.g. `a(10), b, c(1 TO 5) AS LONG` has two.
fn array_count(declarations: &str) -> usize {
    let mut depth = 0usize;
    let mut arrays = 0;
    let mut in_item_array = false;
    for c in declarations.chars() {
        match c {
            '(' => {
                if depth == 0 && !in_item_array {
                    in_item_array = true;
                    arrays += 1;
                }
                depth += 1;
            }
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => in_item_array = false,
            _ => {}
        }
    }
    arrays
}

/// Scans program text for residual risks.
///
/// String literals and comments are masked first, so text inside them is
/// never reported.
///
/// # Example
///
/// ```
/// use qb64port::diagnostics::scan;
/// use qb64port::porting::PortingOptions;
///
/// let warnings = scan("IF a THEN b = 1: IF c THEN d = 2\n", &PortingOptions::default());
/// assert_eq!(warnings.len(), 1);
/// ```
pub fn scan(text: &str, options: &PortingOptions) -> Vec<Diagnostic> {
    let masked = MaskedSource::new(text);
    scan_masked(masked.text(), options)
}

/// The outcome of a dry run: what porting would report, without porting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// Residual-risk warnings.
    pub warnings: Vec<String>,
    /// Constructs that cannot be ported.
    pub errors: Vec<String>,
    /// The rating these findings amount to.
    pub compatibility: Compatibility,
    /// One-line human-readable verdict.
    pub summary: String,
}

/// Dry run: diagnoses `text` as it stands, without rewriting it.
///
/// Uses the same rules as the porting pipeline plus the hardware-access
/// check.
pub fn analyze(text: &str, options: &PortingOptions) -> Analysis {
    let masked = MaskedSource::new(text);
    let mut diagnostics = scan_hardware_access(masked.text());
    diagnostics.extend(scan_masked(masked.text(), options));

    let messages = |severity: Severity| -> Vec<String> {
        diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.message.clone())
            .collect()
    };
    let warnings = messages(Severity::Warning);
    let errors = messages(Severity::Error);
    let compatibility = assess(warnings.len(), errors.len());
    let summary = format!(
        "Analysis found {} warning(s) and {} error(s) (compatibility: {}).",
        warnings.len(),
        errors.len(),
        compatibility
    );
    Analysis {
        warnings,
        errors,
        compatibility,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warnings(source: &str, options: &PortingOptions) -> Vec<String> {
        scan(source, options).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_chained_if_one_warning_with_count() {
        let source = "\
IF a THEN x = 1: IF b THEN y = 2
PRINT 1
IF c THEN x = 3: IF d THEN y = 4
";
        let found = warnings(source, &PortingOptions::default());
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("Found 2 line(s) with chained IF...THEN"));
    }

    #[test]
    fn test_single_if_is_fine() {
        assert!(warnings("IF a THEN x = 1: y = 2\n", &PortingOptions::default()).is_empty());
    }

    #[test]
    fn test_text_in_literals_is_ignored() {
        let source = "PRINT \"IF a THEN b: IF c THEN d\" ' IF x THEN y: IF z THEN w\n";
        assert!(warnings(source, &PortingOptions::default()).is_empty());
    }

    #[test]
    fn test_multiple_arrays_in_one_dim() {
        let options = PortingOptions::default();
        let found = warnings("DIM a(10), b(1 TO 5, 2) AS LONG\nDIM c(3), d\n", &options);
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("Found 1 DIM statement(s)"));
    }

    #[test]
    fn test_array_count() {
        assert_eq!(array_count(" a(10), b, c(1 TO 5) AS LONG"), 2);
        assert_eq!(array_count(" grid(LEN(s), 3)"), 1);
        assert_eq!(array_count(" x, y"), 0);
    }

    #[test]
    fn test_typed_function() {
        let options = PortingOptions::default();
        let found = warnings(
            "FUNCTION Area (w AS SINGLE, h()) AS SINGLE\nEND FUNCTION\nFUNCTION Plain% (x)\n",
            &options,
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].starts_with("Found 1 FUNCTION(s)"));
    }

    #[test]
    fn test_performance_advisories_need_the_flag() {
        let source = "DO\n  FOR i = 1 TO 10000: NEXT\nLOOP\nFOR j = 1 TO 500\nNEXT j\n";
        assert!(warnings(source, &PortingOptions::default()).is_empty());

        let options = PortingOptions {
            optimize_performance: true,
            ..PortingOptions::default()
        };
        let found = warnings(source, &options);
        assert_eq!(found.len(), 2);
        assert!(found[0].starts_with("Found 1 DO loop(s)"));
        assert!(found[1].starts_with("Found 2 empty FOR...NEXT"));

        let found = warnings("DO\n  _Limit 60\nLOOP\n", &options);
        assert!(found.is_empty());
    }

    #[test]
    fn test_analyze_rates_without_rewriting() {
        let analysis = analyze("DEF SEG = 0\nPOKE 1047, 0\n", &PortingOptions::default());
        assert_eq!(analysis.errors.len(), 2);
        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.compatibility, Compatibility::Low);
        assert!(analysis.summary.contains("2 error(s)"));
    }
}
