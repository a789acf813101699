//! Token definitions for the porting scanner.
//!
//! The porter never builds a syntax tree. It only needs to know which byte
//! ranges of a program are *not* code, so that no rewrite ever lands inside
//! them:
//!
//! - String literals (`"..."`, closed by the quote or by the end of the line)
//! - Comments (`'` and `REM` styles)
//! - `DATA` payloads, whose unquoted items are literal text
//!
//! Identifiers and numbers are still tokenized so that words like `PREMIUM`
//! or `REMAIN` are not mistaken for a `REM` comment.
//!
//! ## Design Notes
//!
//! As in the compiler lexer this is built on `logos`. Keywords are not
//! recognized here; keyword handling is table-driven in [`crate::catalog`].

use logos::Logos;
use std::fmt;

/// A token with its location in the source code.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// Byte offset range of the token in the source
    pub span: std::ops::Range<usize>,
    /// The original text of the token
    pub text: String,
}

impl Token {
    /// Create a new token with the given kind, span, and text.
    pub fn new(kind: TokenKind, span: std::ops::Range<usize>, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }

    /// Returns true if this token covers text that rewrites must not touch.
    pub fn is_protected(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::StringLiteral | TokenKind::Comment | TokenKind::RemComment | TokenKind::Data
        )
    }
}

/// Token kinds recognized by the porting scanner.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
pub enum TokenKind {
    // ==================== Protected Regions ====================

    /// String literal. BASIC strings cannot span lines, so an unterminated
    /// literal ends at the newline.
    #[regex(r#""[^"\n]*"?"#)]
    StringLiteral,

    /// Comment - starts with '
    #[regex(r"'[^\n]*")]
    Comment,

    /// REM comment. Longest match keeps `REMARK` an identifier.
    #[regex(r"(?i:REM)([ \t][^\n]*)?", priority = 10)]
    RemComment,

    /// DATA statement. The payload runs to the end of the line or the next
    /// statement separator.
    #[regex(r"(?i:DATA)[ \t][^\n:]*", priority = 10)]
    Data,

    // ==================== Code ====================

    /// Identifier, with optional dotted member access and type sigils
    #[regex(r"[A-Za-z_][A-Za-z0-9_.]*[$%&!#@]*")]
    Identifier,

    /// Numeric literal (decimal, float, or `&H`/`&O`/`&B` prefixed)
    #[regex(r"[0-9]+(\.[0-9]*)?([EeDd][+-]?[0-9]+)?[%&!#@]?")]
    #[regex(r"\.[0-9]+([EeDd][+-]?[0-9]+)?[%&!#@]?")]
    #[regex(r"&[HhOoBb][0-9A-Fa-f]+")]
    Number,

    /// : statement separator
    #[token(":")]
    Colon,

    /// Newline - significant in BASIC (ends statements)
    #[token("\n")]
    Newline,

    /// Any other punctuation or operator character
    #[regex(r"[-+*/\\^=<>(),;.#$%&!@?\[\]{}|~`]")]
    Symbol,
}

impl TokenKind {
    /// Returns the number of leading bytes of the token that stay visible to
    /// rewrites. For `DATA` the keyword itself is code, only the payload is
    /// protected.
    pub fn visible_prefix(&self) -> usize {
        match self {
            TokenKind::Data => "DATA".len(),
            _ => 0,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::StringLiteral => write!(f, "string literal"),
            TokenKind::Comment | TokenKind::RemComment => write!(f, "comment"),
            TokenKind::Data => write!(f, "DATA payload"),
            TokenKind::Newline => write!(f, "newline"),
            _ => write!(f, "{:?}", self),
        }
    }
}
