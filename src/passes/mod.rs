//! Rewriting passes.
//!
//! Each pass performs one narrow category of rewrite over the masked program
//! text and appends what it did to the [`Report`]. Passes are composed as a
//! fold: every pass takes a [`Document`] (text plus report) by value and
//! returns the next one, so no pass can observe another pass's output before
//! its turn.
//!
//! # Pipeline
//!
//! ```text
//! lexical → forward-declarations → def-fn-block → def-fn-line → mixed-declarations
//!   → gosub → type-fields → array-copy → [modern-idioms] → [timing-graphics]
//!   → hardware-access → [modern-features]
//! ```
//!
//! Bracketed passes are enabled by [`PortingOptions`] flags.
//!
//! # Contract
//!
//! A pass never fails. Input it does not recognize is left alone; input it
//! recognizes but cannot rewrite safely is left alone *and* reported as an
//! error. Any text change must be accompanied by a transformation record or
//! a warning.

mod control_flow;
mod declarations;
mod def_fn;
mod hardware;
mod idioms;
mod lexical;
mod structure;
mod timing;

pub use control_flow::GosubLegalization;
pub use declarations::{ForwardDeclarations, MixedDeclarations};
pub use def_fn::{DefFnBlocks, DefFnLines};
pub use hardware::{scan_hardware_access, HardwareAccess};
pub use idioms::{ModernFeatures, ModernIdioms};
pub use lexical::LexicalNormalization;
pub use structure::{ArrayCopies, TypeFields};
pub use timing::TimingGraphics;

use crate::catalog::RuleCatalog;
use crate::lexer::COMMENT_TAIL;
use crate::porting::PortingOptions;
use crate::report::Report;

/// Regex fragment for the start of a statement line: indentation and an
/// optional GW-BASIC style line number.
pub(crate) const LINE_START: &str = r"[ \t]*(?:[0-9]+[ \t]+)?";

/// Regex fragment for an identifier without sigil.
pub(crate) const NAME: &str = r"[A-Za-z][A-Za-z0-9_.]*";

/// Regex fragment for an optional single type sigil.
pub(crate) const SIGIL: &str = r"[%&!#@$]";

/// Regex fragment for the end of a statement line, capturing any trailing
/// whitespace and masked comment so a rewrite can put them back.
pub(crate) fn line_end() -> String {
    format!("({COMMENT_TAIL})$")
}

/// The value threaded through the pipeline: current text and the report so far.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// The (masked) program text.
    pub text: String,
    /// Everything recorded so far.
    pub report: Report,
}

impl Document {
    /// Starts a document with an empty report.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            report: Report::new(),
        }
    }
}

/// Read-only inputs shared by all passes of one run.
#[derive(Debug, Clone, Copy)]
pub struct PassContext<'a> {
    /// The caller's options.
    pub options: &'a PortingOptions,
    /// The catalog view for the selected dialect.
    pub catalog: RuleCatalog,
}

impl<'a> PassContext<'a> {
    /// Builds the context for `options`.
    pub fn new(options: &'a PortingOptions) -> Self {
        Self {
            options,
            catalog: RuleCatalog::for_dialect(options.source_dialect),
        }
    }
}

/// A single pipeline stage.
pub trait Pass {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Rewrites the document and returns it with any new report entries.
    fn apply(&self, doc: Document, ctx: &PassContext<'_>) -> Document;
}

/// Builds the ordered pass list for `options`.
///
/// The order matters: DEF FN extraction introduces declarations that the
/// mixed-declaration pass must see, and the hardware check runs after the
/// timing pass so that rewritten `WAIT` idioms are not reported.
pub fn pipeline(options: &PortingOptions) -> Vec<Box<dyn Pass>> {
    let mut passes: Vec<Box<dyn Pass>> = vec![
        Box::new(LexicalNormalization),
        Box::new(ForwardDeclarations),
        Box::new(DefFnBlocks),
        Box::new(DefFnLines),
        Box::new(MixedDeclarations),
        Box::new(GosubLegalization),
        Box::new(TypeFields),
        Box::new(ArrayCopies),
    ];
    if options.add_modern_features {
        passes.push(Box::new(ModernIdioms));
    }
    if options.convert_graphics {
        passes.push(Box::new(TimingGraphics));
    }
    passes.push(Box::new(HardwareAccess));
    if options.add_modern_features {
        passes.push(Box::new(ModernFeatures));
    }
    passes
}

/// The newline convention of `text`, used for lines a pass inserts.
pub(crate) fn newline_of(text: &str) -> &'static str {
    if text.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Splits a line into its content and its line ending (`\n`, `\r\n` or none).
pub(crate) fn split_line_ending(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\n', '\r']);
    (content, &line[content.len()..])
}
