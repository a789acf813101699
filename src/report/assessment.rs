//! Compatibility assessment.
//!
//! The rating depends on the number of warnings and errors and on nothing
//! else: not input size, not dialect, not which passes ran.

use serde::Serialize;
use std::fmt;

/// Above this many warnings (with no errors) the rating drops to medium.
pub const MEDIUM_WARNING_THRESHOLD: usize = 3;

/// Three-tier confidence that the ported program behaves like the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    /// At least one construct could not be ported.
    Low,
    /// Ported, with more than a handful of points to review.
    Medium,
    /// Ported with little or nothing to review.
    High,
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Compatibility::High => "high",
            Compatibility::Medium => "medium",
            Compatibility::Low => "low",
        };
        write!(f, "{}", label)
    }
}

/// Rates a result from its warning and error counts.
///
/// Any error gives [`Compatibility::Low`], whatever the warning count.
///
/// ```
/// use qb64port::report::{assess, Compatibility};
///
/// assert_eq!(assess(3, 0), Compatibility::High);
/// assert_eq!(assess(4, 0), Compatibility::Medium);
/// assert_eq!(assess(0, 1), Compatibility::Low);
/// ```
pub fn assess(warnings: usize, errors: usize) -> Compatibility {
    if errors > 0 {
        Compatibility::Low
    } else if warnings > MEDIUM_WARNING_THRESHOLD {
        Compatibility::Medium
    } else {
        Compatibility::High
    }
}

/// Builds the one-paragraph summary shown to the user.
pub fn summarize(
    compatibility: Compatibility,
    transformations: usize,
    warnings: usize,
    errors: usize,
) -> String {
    let verdict = match compatibility {
        Compatibility::High => "Port completed; the result should run as-is",
        Compatibility::Medium => "Port completed; review the warnings before running",
        Compatibility::Low => "Port completed with unported constructs; manual work is required",
    };
    format!(
        "{} (compatibility: {}). Applied {} transformation(s) with {} warning(s) and {} error(s).",
        verdict, compatibility, transformations, warnings, errors
    )
}
