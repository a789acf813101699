//! Direct hardware access detection.
//!
//! QB64 runs in a protected-mode process: absolute memory, I/O ports and
//! DOS interrupts are unavailable, so there is nothing to rewrite these
//! into. The pass only reports them, one error per category.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Document, Pass, PassContext};
use crate::report::Diagnostic;

/// A kind of hardware access and how to recognize it.
struct HardwareCategory {
    pattern: Regex,
    what: &'static str,
    advice: &'static str,
}

static CATEGORIES: Lazy<Vec<HardwareCategory>> = Lazy::new(|| {
    let category = |pattern: &str, what: &'static str, advice: &'static str| HardwareCategory {
        pattern: Regex::new(pattern).expect("hardware pattern is valid"),
        what,
        advice,
    };
    vec![
        category(
            r"(?i)\bDEF[ \t]+SEG\b",
            "DEF SEG statement(s)",
            "segmented memory addressing does not exist in QB64",
        ),
        category(
            r"(?i)\b(?:PEEK[ \t]*\(|POKE[ \t])",
            "PEEK/POKE memory access(es)",
            "replace them with _MEM blocks or ordinary variables",
        ),
        category(
            r"(?i)\b(?:OUT|WAIT)[ \t]+[^\n:,]+,|\bINP[ \t]*\(",
            "OUT/INP/WAIT port I/O statement(s)",
            "I/O ports are not accessible from QB64 programs",
        ),
        category(
            r"(?i)\bCALL[ \t]+ABSOLUTE\b",
            "CALL ABSOLUTE machine-code call(s)",
            "embedded machine code must be rewritten in BASIC or a DECLARE LIBRARY",
        ),
        category(
            r"(?i)\bCALL[ \t]+INTERRUPTX?\b",
            "CALL INTERRUPT DOS/BIOS call(s)",
            "use the QB64 equivalents of the DOS or BIOS service",
        ),
    ]
});

/// Scans `text` for direct hardware access, returning one error per
/// category found.
///
/// # Example
///
/// ```
/// use qb64port::passes::scan_hardware_access;
///
/// let errors = scan_hardware_access("DEF SEG = &HB800\nPOKE 0, 65\n");
/// assert_eq!(errors.len(), 2);
/// ```
pub fn scan_hardware_access(text: &str) -> Vec<Diagnostic> {
    CATEGORIES
        .iter()
        .filter_map(|category| {
            let count = category.pattern.find_iter(text).count();
            (count > 0).then(|| {
                Diagnostic::error(format!(
                    "Found {} {}: {}",
                    count, category.what, category.advice
                ))
            })
        })
        .collect()
}

/// Reports direct hardware access; never changes the text.
pub struct HardwareAccess;

impl Pass for HardwareAccess {
    fn name(&self) -> &'static str {
        "hardware-access"
    }

    fn apply(&self, mut doc: Document, _ctx: &PassContext<'_>) -> Document {
        let errors = scan_hardware_access(&doc.text);
        doc.report.extend_diagnostics(errors);
        doc
    }
}
