//! Bare URL and e-mail detection in prose text.

use std::sync::LazyLock;

use regex::Regex;

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?xi)
        \b(?:https?://|ftp://|www\.)[^\s<>]+
        |
        \b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b
        ",
    )
    .unwrap()
});

/// A piece of text split by [`linkify`].
#[derive(Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text.
    Text(&'a str),
    /// Detected link with its display text and target.
    Link { text: &'a str, href: String },
}

/// Strip trailing characters that end a sentence rather than the URL.
fn trim_link(candidate: &str) -> &str {
    let mut end = candidate.len();
    loop {
        let current = &candidate[..end];
        let Some(last) = current.chars().last() else {
            return current;
        };
        let trim = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '\'' | '"' | '*' | '_' | '~' => true,
            ')' => current.matches(')').count() > current.matches('(').count(),
            _ => false,
        };
        if !trim {
            return current;
        }
        end -= last.len_utf8();
    }
}

fn link_target(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    if lower.contains("://") {
        // A bare scheme with nothing after it is not a link.
        let rest = &text[text.find("://")? + 3..];
        (!rest.is_empty()).then(|| text.to_owned())
    } else if lower.starts_with("www.") {
        (text.len() > 4 && text[4..].contains('.')).then(|| format!("http://{text}"))
    } else {
        Some(format!("mailto:{text}"))
    }
}

/// Split text into plain and link segments.
///
/// ```
/// use mdpage_renderer::linkify::{Segment, linkify};
///
/// let segments = linkify("see www.example.com.");
/// assert_eq!(segments[1], Segment::Link {
///     text: "www.example.com",
///     href: "http://www.example.com".to_owned(),
/// });
/// ```
#[must_use]
pub fn linkify(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for found in LINK.find_iter(text) {
        let candidate = trim_link(found.as_str());
        let Some(href) = link_target(candidate) else {
            continue;
        };
        let start = found.start();
        if start > last {
            segments.push(Segment::Text(&text[last..start]));
        }
        segments.push(Segment::Link {
            text: candidate,
            href,
        });
        last = start + candidate.len();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }
    segments
}
