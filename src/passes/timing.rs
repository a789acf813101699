//! Timing and graphics modernization, gated by `convert_graphics`.
//!
//! - `SLEEP n` becomes `_Delay n`, which accepts fractions of a second and
//!   is not cut short by a key press. A literal `SLEEP 0` waits for a key,
//!   like bare `SLEEP`, and is kept.
//! - The vertical-retrace wait `WAIT &H3DA, 8` (alone, or as the classic
//!   `WAIT &H3DA, 8, 8: WAIT &H3DA, 8` pair) becomes `_Limit 60`.
//! - `SCREEN m` for the legacy modes 7, 9, 12 and 13 opens an equivalent
//!   `_NewImage` canvas.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{Document, Pass, PassContext, NAME, SIGIL};
use crate::report::TransformCategory;

static SLEEP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\bSLEEP[ \t]+([0-9]+(?:\.[0-9]+)?|\.[0-9]+|{NAME}{SIGIL}?)"
    ))
    .expect("SLEEP pattern is valid")
});

static RETRACE_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\bWAIT[ \t]+&H3DA[ \t]*,[ \t]*8[ \t]*,[ \t]*8[ \t]*:[ \t]*WAIT[ \t]+&H3DA[ \t]*,[ \t]*8\b",
    )
    .expect("retrace pair pattern is valid")
});

static RETRACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bWAIT[ \t]+&H3DA[ \t]*,[ \t]*8\b").expect("retrace pattern is valid")
});

static SCREEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bSCREEN[ \t]+([0-9]+)\b").expect("SCREEN pattern is valid")
});

/// QB64 frame cap standing in for a vertical-retrace wait.
const RETRACE_LIMIT: &str = "_Limit 60";

/// Converts timing statements and legacy screen modes.
pub struct TimingGraphics;

impl Pass for TimingGraphics {
    fn name(&self) -> &'static str {
        "timing-graphics"
    }

    fn apply(&self, mut doc: Document, ctx: &PassContext<'_>) -> Document {
        let mut sleeps = 0;
        let text = SLEEP
            .replace_all(&doc.text, |caps: &Captures| {
                if waits_for_key(&caps[1]) {
                    return caps[0].to_string();
                }
                sleeps += 1;
                format!("_Delay {}", &caps[1])
            })
            .into_owned();

        let mut waits = 0;
        let text = RETRACE_PAIR
            .replace_all(&text, |_: &Captures| {
                waits += 1;
                RETRACE_LIMIT
            })
            .into_owned();
        let text = replace_unless_continued(&RETRACE, &text, |_| {
            waits += 1;
            Some(RETRACE_LIMIT.to_string())
        });

        let mut modes = Vec::new();
        let text = replace_unless_continued(&SCREEN, &text, |caps| {
            let mode = caps[1].parse::<u8>().ok()?;
            let screen = ctx.catalog.screen_mode(mode)?;
            modes.push(mode.to_string());
            Some(format!(
                "Screen _NewImage({}, {}, {})",
                screen.width, screen.height, screen.mode
            ))
        });

        doc.text = text;
        if sleeps > 0 {
            doc.report.record(
                TransformCategory::Graphics,
                format!("Converted {sleeps} SLEEP statement(s) to _Delay"),
            );
        }
        if waits > 0 {
            doc.report.record(
                TransformCategory::Graphics,
                format!("Replaced {waits} vertical-retrace WAIT(s) with {RETRACE_LIMIT}"),
            );
        }
        if !modes.is_empty() {
            doc.report.record(
                TransformCategory::Graphics,
                format!(
                    "Converted {} SCREEN statement(s) to _NewImage canvases (mode {})",
                    modes.len(),
                    modes.join(", ")
                ),
            );
        }
        doc
    }
}

/// `SLEEP 0` waits for a key press indefinitely.
fn waits_for_key(duration: &str) -> bool {
    duration.parse::<f64>().is_ok_and(|seconds| seconds == 0.0)
}

/// Replaces matches of `pattern` with `rewrite`'s result, keeping any match
/// followed by a `,` (more arguments than the pattern covers) or for which
/// `rewrite` declines.
fn replace_unless_continued(
    pattern: &Regex,
    text: &str,
    mut rewrite: impl FnMut(&Captures) -> Option<String>,
) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            let Some(m) = caps.get(0) else {
                return String::new();
            };
            let continued = text[m.end()..]
                .trim_start_matches([' ', '\t'])
                .starts_with(',');
            if continued {
                return m.as_str().to_string();
            }
            rewrite(caps).unwrap_or_else(|| m.as_str().to_string())
        })
        .into_owned()
}
