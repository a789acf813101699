//! Lexical scanning for the porter.
//!
//! This module finds the regions of a BASIC program that rewrites must never
//! touch and hides them behind sentinels while the passes run:
//!
//! - String literals
//! - Comments (both `'` and `REM` styles)
//! - `DATA` payloads
//!
//! ## Example
//!
//! ```
//! use qb64port::lexer::MaskedSource;
//!
//! let masked = MaskedSource::new(r#"PRINT "GOSUB inside a string" ' and a comment"#);
//! assert!(!masked.text().contains("GOSUB"));
//! assert_eq!(masked.restore(masked.text()), masked.original());
//! ```
//!
//! ## Design Notes
//!
//! The scanner is built on [`logos`](https://docs.rs/logos). Masking is done
//! once per document by the orchestrator, so every pass sees the same
//! protected view and none of them needs its own literal/comment detection.

mod mask;
mod token;

pub use mask::{MaskedSource, COMMENT_TAIL};
pub use token::{Token, TokenKind};

use logos::Logos;

/// The scanner for BASIC source code.
///
/// Wraps a `logos` lexer and yields [`Token`]s with their byte spans.
///
/// ## Example
///
/// ```
/// use qb64port::lexer::{Lexer, TokenKind};
///
/// let tokens: Vec<_> = Lexer::new("PRINT \"hi\"").collect();
///
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
/// assert_eq!(tokens[1].span, 6..10);
/// ```
pub struct Lexer<'source> {
    inner: logos::Lexer<'source, TokenKind>,
}

impl<'source> Lexer<'source> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'source str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
        }
    }

    /// Get the next token, if any.
    ///
    /// Characters the scanner does not recognize are skipped; they can never
    /// start a protected region, so nothing is lost for masking.
    pub fn next_token(&mut self) -> Option<Token> {
        loop {
            match self.inner.next()? {
                Ok(kind) => {
                    let span = self.inner.span();
                    let text = self.inner.slice().to_string();
                    return Some(Token::new(kind, span, text));
                }
                Err(()) => continue,
            }
        }
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Convenience function returning only the protected tokens of `source`.
///
/// # Example
///
/// ```
/// use qb64port::lexer::{protected_tokens, TokenKind};
///
/// let tokens = protected_tokens("x = 1 ' note");
/// assert_eq!(tokens.len(), 1);
/// assert_eq!(tokens[0].kind, TokenKind::Comment);
/// ```
pub fn protected_tokens(source: &str) -> Vec<Token> {
    Lexer::new(source).filter(Token::is_protected).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_spans() {
        let tokens: Vec<_> = Lexer::new("PRINT 42").collect();
        assert_eq!(tokens[0].span, 0..5);
        assert_eq!(tokens[1].span, 6..8);
        assert_eq!(tokens[1].text, "42");
    }

    #[test]
    fn test_protected_tokens_multiline() {
        let source = "REM header\nPRINT \"a\": PRINT 'tail\nDATA 1, 2";
        let kinds: Vec<_> = protected_tokens(source).into_iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::RemComment,
                TokenKind::StringLiteral,
                TokenKind::Comment,
                TokenKind::Data,
            ]
        );
    }

    #[test]
    fn test_unknown_characters_are_skipped() {
        let tokens: Vec<_> = Lexer::new("x\u{7} = 1").collect();
        assert_eq!(tokens.len(), 3);
    }
}
