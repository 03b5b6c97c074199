//! Typographic replacements applied to prose text.
//!
//! Quotes, dashes and `...` are handled by the parser's smart punctuation.
//! This module covers the remaining substitutions: symbol shorthands and
//! punctuation runs.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static SYMBOLS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\((c|r|tm)\)").unwrap());
static DOTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.{2,}").unwrap());
static EXCITED_ELLIPSIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([?!])…").unwrap());
static QUESTION_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\?{4,}").unwrap());
static BANG_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!{4,}").unwrap());
static COMMA_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",{2,}").unwrap());

/// Characters that can start a replacement.
fn has_candidates(text: &str) -> bool {
    text.contains(['(', '+', '.', '?', '!', ','])
}

/// Apply typographic replacements to a run of prose text.
///
/// ```
/// use mdpage_renderer::typography::replace;
///
/// assert_eq!(replace("(c) 2024 Acme(TM)"), "© 2024 Acme™");
/// assert_eq!(replace("plain text"), "plain text");
/// ```
#[must_use]
pub fn replace(text: &str) -> Cow<'_, str> {
    if !has_candidates(text) {
        return Cow::Borrowed(text);
    }

    let mut out = SYMBOLS
        .replace_all(text, |caps: &Captures<'_>| {
            match caps[1].to_ascii_lowercase().as_str() {
                "c" => "©",
                "r" => "®",
                _ => "™",
            }
        })
        .replace("+-", "±");
    out = DOTS.replace_all(&out, "…").into_owned();
    out = EXCITED_ELLIPSIS.replace_all(&out, "$1..").into_owned();
    out = QUESTION_RUN.replace_all(&out, "???").into_owned();
    out = BANG_RUN.replace_all(&out, "!!!").into_owned();
    out = COMMA_RUN.replace_all(&out, ",").into_owned();

    if out == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(out)
    }
}
