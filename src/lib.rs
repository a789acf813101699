//! # qb64port
//!
//! Ports QBasic, QuickBASIC and GW-BASIC programs to QB64, with an audit
//! trail of every change and a compatibility rating.
//!
//! ## Architecture
//!
//! Porting is a fixed sequence of text-rewriting passes:
//!
//! ```text
//! Source (.bas) → Mask literals/comments → Passes → Diagnostics → Restore → Assessment
//! ```
//!
//! Each piece lives in its own module:
//!
//! - [`lexer`] - Finds string literals, comments and `DATA` payloads and masks them
//! - [`catalog`] - Static rename tables, sigil types and screen modes
//! - [`passes`] - The rewriting passes and the pipeline order
//! - [`diagnostics`] - Non-mutating residual-risk scan, also usable as a dry run
//! - [`report`] - Transformation records, diagnostics and the compatibility rating
//! - [`porting`] - Options and the [`Porter`](porting::Porter) orchestrator
//!
//! No syntax tree is built. Legacy BASIC has no single grammar, and every
//! pass recognizes only the narrow shapes it rewrites, leaving anything else
//! untouched.
//!
//! ## Example
//!
//! ```
//! use qb64port::prelude::*;
//!
//! let source = "DECLARE SUB Greet ()\nCLS\nSLEEP 1\n";
//! let result = transform(source, &PortingOptions::default()).unwrap();
//!
//! assert_eq!(result.ported_code(), "Cls\n_Delay 1\n");
//! for t in result.transformations() {
//!     println!("{}", t);
//! }
//! ```

pub mod catalog;
pub mod diagnostics;
pub mod lexer;
pub mod passes;
pub mod porting;
pub mod report;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::diagnostics::{analyze, Analysis};
    pub use crate::porting::{
        transform, OptionsError, Porter, PortingOptions, PortingResult, SourceDialect,
    };
    pub use crate::report::{Compatibility, Diagnostic, Severity, TransformCategory, Transformation};
}
