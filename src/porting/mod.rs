//! The porting pipeline.
//!
//! [`Porter`] masks the program's string literals, comments and `DATA`
//! payloads, folds the document through every enabled pass, runs the
//! diagnostics over the result, restores the masked regions, and rates the
//! outcome.
//!
//! # Example
//!
//! ```
//! use qb64port::porting::{transform, PortingOptions};
//! use qb64port::report::Compatibility;
//!
//! let result = transform("DEF FNSquare(x#) = x# * x#\n", &PortingOptions::default()).unwrap();
//!
//! assert!(result.ported_code().contains("Function Square (x As Double)"));
//! assert_eq!(result.compatibility(), Compatibility::High);
//! ```

mod error;
mod options;

pub use error::OptionsError;
pub use options::{PortingOptions, SourceDialect, DEFAULT_WINDOW_TITLE};

use log::{debug, info};
use serde::Serialize;

use crate::diagnostics;
use crate::lexer::MaskedSource;
use crate::passes::{pipeline, Document, Pass, PassContext};
use crate::report::{assess, summarize, Compatibility, Report, RiskTier, Transformation};

/// A configured pipeline, reusable across any number of programs.
pub struct Porter {
    options: PortingOptions,
    passes: Vec<Box<dyn Pass>>,
}

impl Porter {
    /// Validates `options` and builds the pass list they select.
    pub fn new(options: PortingOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        if !options.preserve_comments {
            debug!("preserve_comments is off, but comments are never rewritten");
        }
        let passes = pipeline(&options);
        Ok(Self { options, passes })
    }

    /// The options this porter was built with.
    pub fn options(&self) -> &PortingOptions {
        &self.options
    }

    /// Ports one program. Never fails: anything that cannot be ported is
    /// left as it is and reported in the result.
    pub fn transform(&self, source: &str) -> PortingResult {
        let masked = MaskedSource::new(source);
        debug!(
            "masked {} literal/comment region(s) in {} byte(s) of {} source",
            masked.region_count(),
            source.len(),
            self.options.source_dialect
        );

        let ctx = PassContext::new(&self.options);
        let doc = self
            .passes
            .iter()
            .fold(Document::new(masked.text()), |doc, pass| {
                let before = doc.report.len();
                let doc = pass.apply(doc, &ctx);
                debug!(
                    "pass {} appended {} report entr(ies)",
                    pass.name(),
                    doc.report.len() - before
                );
                doc
            });

        let Document { text, mut report } = doc;
        report.extend_diagnostics(diagnostics::scan_masked(&text, &self.options));
        let ported_code = masked.restore(&text);

        let result = PortingResult::new(source.to_string(), ported_code, report);
        info!(
            "ported with {} compatibility ({} transformation(s), {} warning(s), {} error(s))",
            result.compatibility,
            result.transformations.len(),
            result.warnings.len(),
            result.errors.len()
        );
        result
    }
}

/// Validates `options` and ports `source` in one call.
pub fn transform(source: &str, options: &PortingOptions) -> Result<PortingResult, OptionsError> {
    Ok(Porter::new(options.clone())?.transform(source))
}

/// Everything one porting run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortingResult {
    original_code: String,
    ported_code: String,
    transformations: Vec<Transformation>,
    warnings: Vec<String>,
    errors: Vec<String>,
    compatibility: Compatibility,
    summary: String,
}

impl PortingResult {
    fn new(original_code: String, ported_code: String, report: Report) -> Self {
        let warnings: Vec<String> = report.warnings().map(str::to_string).collect();
        let errors: Vec<String> = report.errors().map(str::to_string).collect();
        let transformations = report.transformations().to_vec();
        let compatibility = assess(warnings.len(), errors.len());
        let summary = summarize(
            compatibility,
            transformations.len(),
            warnings.len(),
            errors.len(),
        );
        Self {
            original_code,
            ported_code,
            transformations,
            warnings,
            errors,
            compatibility,
            summary,
        }
    }

    /// The input program, unchanged.
    pub fn original_code(&self) -> &str {
        &self.original_code
    }

    /// The ported program.
    pub fn ported_code(&self) -> &str {
        &self.ported_code
    }

    /// Every rewrite applied, in application order.
    pub fn transformations(&self) -> &[Transformation] {
        &self.transformations
    }

    /// Rewrites whose correctness could not be established mechanically.
    pub fn best_effort_transformations(&self) -> impl Iterator<Item = &Transformation> {
        self.transformations
            .iter()
            .filter(|t| t.risk() == RiskTier::BestEffort)
    }

    /// Points to review by hand.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Constructs that were left unported.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The overall rating.
    pub fn compatibility(&self) -> Compatibility {
        self.compatibility
    }

    /// One-line human-readable verdict.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Whether the ported code differs from the input.
    pub fn is_changed(&self) -> bool {
        self.original_code != self.ported_code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::TransformCategory;

    #[test]
    fn test_invalid_options_rejected() {
        let options = PortingOptions {
            window_title: Some("\"".to_string()),
            ..PortingOptions::default()
        };
        assert!(Porter::new(options).is_err());
    }

    #[test]
    fn test_literals_and_comments_survive() {
        let source = "PRINT \"GOSUB here; print this\" ' PRINT in a comment\nREM PRINT\n";
        let result = transform(source, &PortingOptions::default()).unwrap();
        assert_eq!(
            result.ported_code(),
            "Print \"GOSUB here; print this\" ' PRINT in a comment\nREM PRINT\n"
        );
    }

    #[test]
    fn test_best_effort_filter() {
        let source = "GOSUB Beep1\nEND\nBeep1:\nBEEP\nRETURN\n";
        let result = transform(source, &PortingOptions::default()).unwrap();
        let best_effort: Vec<_> = result.best_effort_transformations().collect();
        assert_eq!(best_effort.len(), 1);
        assert_eq!(best_effort[0].category, TransformCategory::ControlFlow);
        assert!(result.ported_code().contains("Sub Beep1"));
    }

    #[test]
    fn test_porter_is_reusable() {
        let porter = Porter::new(PortingOptions::default()).unwrap();
        let first = porter.transform("PRINT 1\n");
        let second = porter.transform("PRINT 1\n");
        assert_eq!(first, second);
        assert!(first.is_changed());
    }
}
