//! Table of contents markup.
//!
//! Headings form a tree by document order: a heading nests under the closest
//! preceding heading with a lower level. Only levels in the selected set are
//! listed; listed descendants of an unlisted heading are hoisted into the
//! enclosing list.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::options::HeadingLevels;
use crate::state::{TocEntry, escape_html};

/// Paragraph text that requests a table of contents.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:\[\[?_?toc_?\]?\]|\$\{toc\})$").unwrap());

/// Check whether a paragraph's text is a table of contents marker.
///
/// ```
/// use mdpage_renderer::is_toc_marker;
///
/// assert!(is_toc_marker("[TOC]"));
/// assert!(is_toc_marker("[[_TOC_]]"));
/// assert!(!is_toc_marker("see [TOC] below"));
/// ```
#[must_use]
pub fn is_toc_marker(text: &str) -> bool {
    MARKER.is_match(text.trim())
}

struct Node<'a> {
    entry: &'a TocEntry,
    children: Vec<Node<'a>>,
}

/// Build the nested heading tree.
fn build_tree(entries: &[TocEntry]) -> Vec<Node<'_>> {
    fn attach<'a>(siblings: &mut Vec<Node<'a>>, entry: &'a TocEntry) {
        match siblings.last_mut() {
            Some(last) if entry.level > last.entry.level => attach(&mut last.children, entry),
            _ => siblings.push(Node {
                entry,
                children: Vec::new(),
            }),
        }
    }

    let mut roots = Vec::new();
    for entry in entries {
        attach(&mut roots, entry);
    }
    roots
}

fn write_items(nodes: &[Node<'_>], levels: HeadingLevels, out: &mut String) {
    for node in nodes {
        if levels.contains(node.entry.level) {
            let _ = write!(
                out,
                r##"<li class="toc-item"><a class="toc-link" href="#{}">{}</a>"##,
                escape_html(&node.entry.id),
                escape_html(&node.entry.title)
            );
            write_list(&node.children, levels, out);
            out.push_str("</li>");
        } else {
            write_items(&node.children, levels, out);
        }
    }
}

fn write_list(nodes: &[Node<'_>], levels: HeadingLevels, out: &mut String) {
    let mut items = String::new();
    write_items(nodes, levels, &mut items);
    if !items.is_empty() {
        let _ = write!(out, r#"<ul class="toc-list">{items}</ul>"#);
    }
}

/// Render table of contents entries as a nested list.
///
/// Returns `None` when no entry falls within `levels`.
#[must_use]
pub fn render_toc(entries: &[TocEntry], levels: HeadingLevels) -> Option<String> {
    let tree = build_tree(entries);
    let mut out = String::new();
    write_list(&tree, levels, &mut out);
    (!out.is_empty()).then_some(out)
}
