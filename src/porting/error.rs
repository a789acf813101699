//! Option validation errors.
//!
//! Porting itself never fails: unrecognized input is left alone and reported
//! through diagnostics. The only thing that can be rejected is a malformed
//! [`PortingOptions`](super::PortingOptions).

use thiserror::Error;

/// A rejected porting option.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionsError {
    /// The dialect name is not one of the supported dialects.
    #[error("unknown source dialect '{0}' (expected qbasic, quickbasic or gwbasic)")]
    UnknownDialect(String),

    /// The window title cannot be embedded in a `_Title` string literal.
    #[error("invalid window title {title:?}: {reason}")]
    InvalidTitle {
        /// The rejected title.
        title: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}
