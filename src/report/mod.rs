//! The audit trail produced while porting.
//!
//! A [`Report`] accumulates, in application order:
//!
//! - [`Transformation`] records, one per summarized change a pass made
//! - [`Diagnostic`]s, either warnings (change applied, or risk spotted, that
//!   needs a human look) or errors (construct left unchanged because it is
//!   unsafe to rewrite)
//!
//! Nothing here is ever thrown. The only way to see "failure" is to inspect
//! the errors and the resulting [`Compatibility`] rating.

mod assessment;

pub use assessment::{assess, summarize, Compatibility, MEDIUM_WARNING_THRESHOLD};

use serde::Serialize;
use std::fmt;

/// Coarse category of a transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformCategory {
    /// Keyword and builtin-name spelling.
    Lexical,
    /// Declarations: forward declarations, DEF FN, mixed sigil/AS forms.
    Declaration,
    /// GOSUB/RETURN legalization.
    ControlFlow,
    /// TYPE blocks and array syntax.
    Structure,
    /// Idiom replacement (pi, program exit).
    Idiom,
    /// Timing and graphics idioms.
    Graphics,
    /// Injected QB64 metacommands and window setup.
    Modernization,
}

impl TransformCategory {
    /// The risk tier of every transformation in this category.
    pub fn risk(&self) -> RiskTier {
        match self {
            TransformCategory::ControlFlow => RiskTier::BestEffort,
            _ => RiskTier::Mechanical,
        }
    }
}

impl fmt::Display for TransformCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformCategory::Lexical => "lexical",
            TransformCategory::Declaration => "declaration",
            TransformCategory::ControlFlow => "control-flow",
            TransformCategory::Structure => "structure",
            TransformCategory::Idiom => "idiom",
            TransformCategory::Graphics => "graphics",
            TransformCategory::Modernization => "modernization",
        };
        write!(f, "{}", name)
    }
}

/// How much a transformation can be trusted without review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// A purely mechanical rewrite that preserves meaning.
    Mechanical,
    /// A heuristic rewrite that may change behavior.
    BestEffort,
}

/// One entry of the transformation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transformation {
    /// What kind of change this was.
    pub category: TransformCategory,
    /// Human-readable description.
    pub description: String,
}

impl Transformation {
    /// Creates a transformation record.
    pub fn new(category: TransformCategory, description: impl Into<String>) -> Self {
        Self {
            category,
            description: description.into(),
        }
    }

    /// The risk tier implied by the category.
    pub fn risk(&self) -> RiskTier {
        self.category.risk()
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.category, self.description)
    }
}

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Rewrite applied with residual risk, or risk flagged without rewrite.
    Warning,
    /// Construct recognized as unsafe to rewrite; left unchanged.
    Error,
}

/// A warning or error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Warning or error.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    /// Creates an error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// The accumulator threaded through every pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    transformations: Vec<Transformation>,
    diagnostics: Vec<Diagnostic>,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transformation record.
    pub fn record(&mut self, category: TransformCategory, description: impl Into<String>) {
        self.transformations
            .push(Transformation::new(category, description));
    }

    /// Appends a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(message));
    }

    /// Appends an error.
    pub fn error(&mut self, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(message));
    }

    /// Appends already-built diagnostics.
    pub fn extend_diagnostics(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    /// Transformation records in application order.
    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    /// All diagnostics in the order they were raised.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Warning messages in order.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.messages(Severity::Warning)
    }

    /// Error messages in order.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.messages(Severity::Error)
    }

    /// Number of entries of any kind. Used to tell what a pass appended.
    pub fn len(&self) -> usize {
        self.transformations.len() + self.diagnostics.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn messages(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
            .map(|d| d.message.as_str())
    }
}
