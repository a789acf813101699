//! Porting configuration.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use super::OptionsError;

/// Window title injected by the modern-features pass when none is given.
pub const DEFAULT_WINDOW_TITLE: &str = "Ported Program";

/// The BASIC dialect a program was written for.
///
/// The dialect selects which keyword tiers the lexical pass applies:
/// GW-BASIC has no structured statements, and only QuickBASIC has the
/// compiler-specific ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceDialect {
    /// Microsoft QBasic 1.x.
    #[default]
    QBasic,
    /// Microsoft QuickBASIC 4.x.
    QuickBasic,
    /// GW-BASIC and other line-numbered interpreters.
    GwBasic,
}

impl fmt::Display for SourceDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceDialect::QBasic => "qbasic",
            SourceDialect::QuickBasic => "quickbasic",
            SourceDialect::GwBasic => "gwbasic",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for SourceDialect {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "qbasic" => Ok(SourceDialect::QBasic),
            "quickbasic" | "qb45" => Ok(SourceDialect::QuickBasic),
            "gwbasic" => Ok(SourceDialect::GwBasic),
            _ => Err(OptionsError::UnknownDialect(s.to_string())),
        }
    }
}

/// Options for one porting run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortingOptions {
    /// Dialect of the input program.
    pub source_dialect: SourceDialect,
    /// Rewrite QB64-only idioms and inject `$Resize`/`_Title`.
    pub add_modern_features: bool,
    /// Advisory. Comments are never rewritten whatever this is set to.
    pub preserve_comments: bool,
    /// Convert `SLEEP`, retrace waits and legacy `SCREEN` modes.
    pub convert_graphics: bool,
    /// Add performance advisories to the diagnostics.
    pub optimize_performance: bool,
    /// Title for the injected `_Title` line.
    pub window_title: Option<String>,
}

impl Default for PortingOptions {
    fn default() -> Self {
        Self {
            source_dialect: SourceDialect::QBasic,
            add_modern_features: false,
            preserve_comments: true,
            convert_graphics: true,
            optimize_performance: false,
            window_title: None,
        }
    }
}

impl PortingOptions {
    /// The title the modern-features pass injects.
    pub fn title(&self) -> &str {
        self.window_title.as_deref().unwrap_or(DEFAULT_WINDOW_TITLE)
    }

    /// Checks that the options can be used for a run.
    ///
    /// A window title ends up inside a BASIC string literal, which can hold
    /// neither a double quote nor a line break.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if let Some(title) = &self.window_title {
            let reason = if title.contains('"') {
                Some("contains a double quote")
            } else if title.contains(['\n', '\r']) {
                Some("contains a line break")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(OptionsError::InvalidTitle {
                    title: title.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }
}
