//! Sentinel masking of protected source regions.
//!
//! Each protected region is replaced by a short run of private-use
//! characters: an opening marker, the region's index spelled with private-use
//! digits, and a closing marker. None of these characters are word
//! characters, digits, or whitespace, so no pass pattern can match into or
//! across a sentinel.
//!
//! String literals and `DATA` payloads use one pair of markers, comments use
//! another, which lets line-anchored patterns accept a trailing comment via
//! [`COMMENT_TAIL`] without also accepting a trailing string.
//!
//! Source text that already contains characters from the sentinel range has
//! each such character masked as a region of its own, so that restoring can
//! never mistake it for a sentinel.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::token::TokenKind;
use super::Lexer;

const LITERAL_OPEN: char = '\u{E000}';
const LITERAL_CLOSE: char = '\u{E001}';
const COMMENT_OPEN: char = '\u{E002}';
const COMMENT_CLOSE: char = '\u{E003}';
const DIGIT_BASE: u32 = 0xE010;
const RESERVED: std::ops::RangeInclusive<char> = '\u{E000}'..='\u{E019}';

/// Regex fragment matching optional trailing whitespace and an optional
/// masked comment at the end of a line.
pub const COMMENT_TAIL: &str = r"[ \t]*(?:\x{E002}[\x{E010}-\x{E019}]+\x{E003})?[ \t\r]*";

static SENTINEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\x{E000}\x{E002}]([\x{E010}-\x{E019}]+)[\x{E001}\x{E003}]")
        .expect("sentinel pattern is valid")
});

/// A source document with its literals, comments, and `DATA` payloads
/// replaced by sentinels.
#[derive(Debug, Clone)]
pub struct MaskedSource {
    original: String,
    masked: String,
    regions: Vec<String>,
}

impl MaskedSource {
    /// Scans `source` and masks every protected region.
    pub fn new(source: &str) -> Self {
        let mut masked = String::with_capacity(source.len());
        let mut regions = Vec::new();
        let mut cursor = 0;

        for token in Lexer::new(source).filter(|t| t.is_protected()) {
            let start = token.span.start + token.kind.visible_prefix();
            if start >= token.span.end {
                continue;
            }
            push_unprotected(&mut masked, &mut regions, &source[cursor..start]);
            let (open, close) = match token.kind {
                TokenKind::Comment | TokenKind::RemComment => (COMMENT_OPEN, COMMENT_CLOSE),
                _ => (LITERAL_OPEN, LITERAL_CLOSE),
            };
            push_region(
                &mut masked,
                &mut regions,
                (open, close),
                &source[start..token.span.end],
            );
            cursor = token.span.end;
        }
        push_unprotected(&mut masked, &mut regions, &source[cursor..]);

        Self {
            original: source.to_string(),
            masked,
            regions,
        }
    }

    /// The masked text that passes operate on.
    pub fn text(&self) -> &str {
        &self.masked
    }

    /// The unmodified source text.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Number of protected regions found.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Puts the protected regions back into `text`, which is normally the
    /// masked text after some passes have rewritten it. Sentinels removed by a
    /// pass (for example with a deleted line) are simply gone.
    pub fn restore(&self, text: &str) -> String {
        SENTINEL
            .replace_all(text, |caps: &Captures| {
                decode_index(&caps[1])
                    .and_then(|index| self.regions.get(index))
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn push_region(
    masked: &mut String,
    regions: &mut Vec<String>,
    markers: (char, char),
    text: &str,
) {
    masked.push(markers.0);
    masked.push_str(&encode_index(regions.len()));
    masked.push(markers.1);
    regions.push(text.to_string());
}

/// Copies `text` into `masked`, hiding any character a sentinel is made of.
fn push_unprotected(masked: &mut String, regions: &mut Vec<String>, text: &str) {
    let mut rest = text;
    while let Some(at) = rest.find(|c: char| RESERVED.contains(&c)) {
        masked.push_str(&rest[..at]);
        let reserved = rest[at..].chars().next().map_or(0, char::len_utf8);
        push_region(
            masked,
            regions,
            (LITERAL_OPEN, LITERAL_CLOSE),
            &rest[at..at + reserved],
        );
        rest = &rest[at + reserved..];
    }
    masked.push_str(rest);
}

fn encode_index(index: usize) -> String {
    index
        .to_string()
        .bytes()
        .filter_map(|digit| char::from_u32(DIGIT_BASE + u32::from(digit - b'0')))
        .collect()
}

fn decode_index(encoded: &str) -> Option<usize> {
    let digits: String = encoded
        .chars()
        .filter_map(|c| char::from_digit((c as u32).checked_sub(DIGIT_BASE)?, 10))
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_is_identity() {
        let source = "REM top\nPRINT \"GOSUB x\"; a$ ' trailing\nDATA PRINT, 3: END\n";
        let masked = MaskedSource::new(source);
        assert_eq!(masked.region_count(), 4);
        assert_eq!(masked.restore(masked.text()), source);
    }

    #[test]
    fn test_protected_words_are_hidden() {
        let masked = MaskedSource::new("x = 1 ' GOSUB Foo\nPRINT \"RETURN\"");
        assert!(!masked.text().contains("GOSUB"));
        assert!(!masked.text().contains("RETURN"));
        assert!(masked.text().starts_with("x = 1 "));
    }

    #[test]
    fn test_data_keyword_stays_visible() {
        let masked = MaskedSource::new("DATA goto, gosub");
        assert!(masked.text().starts_with("DATA"));
        assert!(!masked.text().contains("goto"));
    }

    #[test]
    fn test_comment_tail_matches_masked_comment() {
        let masked = MaskedSource::new("RETURN ' back to caller");
        let re = Regex::new(&format!("^RETURN{}$", COMMENT_TAIL)).unwrap();
        assert!(re.is_match(masked.text()));
    }

    #[test]
    fn test_many_regions_index_correctly() {
        let source: String = (0..12).map(|i| format!("PRINT \"{}\"\n", i)).collect();
        let masked = MaskedSource::new(&source);
        assert_eq!(masked.region_count(), 12);
        assert_eq!(masked.restore(masked.text()), source);
    }

    #[test]
    fn test_sentinel_lookalikes_in_source_survive() {
        let source = "x = 1 \u{E000}\u{E010}\u{E001}\nPRINT \"secret\"\n";
        let masked = MaskedSource::new(source);
        assert_eq!(masked.region_count(), 4);
        assert_eq!(masked.restore(masked.text()), source);
        let rewritten = masked.text().replace("PRINT", "Print");
        assert_eq!(
            masked.restore(&rewritten),
            "x = 1 \u{E000}\u{E010}\u{E001}\nPrint \"secret\"\n"
        );
    }

    #[test]
    fn test_rewrites_survive_restore() {
        let masked = MaskedSource::new("PRINT \"hi\" ' c");
        let rewritten = masked.text().replace("PRINT", "Print");
        assert_eq!(masked.restore(&rewritten), "Print \"hi\" ' c");
    }
}
