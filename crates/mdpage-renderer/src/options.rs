//! Renderer configuration.

use std::fmt;

/// A set of heading levels (1-6).
///
/// ```
/// use mdpage_renderer::HeadingLevels;
///
/// let levels = HeadingLevels::from_levels([2, 3]);
/// assert!(levels.contains(2));
/// assert!(!levels.contains(4));
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct HeadingLevels(u8);

impl HeadingLevels {
    /// All six heading levels.
    pub const ALL: Self = Self(0b0111_1110);

    /// Build a set from level numbers. Values outside 1-6 are ignored.
    #[must_use]
    pub fn from_levels(levels: impl IntoIterator<Item = u8>) -> Self {
        let bits = levels
            .into_iter()
            .filter(|level| (1..=6).contains(level))
            .fold(0, |bits, level| bits | (1 << level));
        Self(bits)
    }

    /// Check whether a level is in the set.
    #[must_use]
    pub fn contains(self, level: u8) -> bool {
        (1..=6).contains(&level) && self.0 & (1 << level) != 0
    }

    /// Check whether every level of `other` is also in this set.
    #[must_use]
    pub fn is_superset(self, other: Self) -> bool {
        other.0 & !self.0 == 0
    }

    /// Iterate over the contained levels in ascending order.
    pub fn iter(self) -> impl Iterator<Item = u8> {
        (1..=6).filter(move |&level| self.contains(level))
    }
}

impl fmt::Debug for HeadingLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Code block highlighting options.
#[derive(Clone, Copy, Debug)]
pub struct HighlightOptions {
    /// Wrap code tokens in `hljs-*` spans.
    pub enabled: bool,
    /// Guess the language when a block has none or an unknown one.
    pub auto_detect: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_detect: true,
        }
    }
}

/// Heading anchor options.
#[derive(Clone, Debug)]
pub struct AnchorOptions {
    /// Heading levels that receive an `id`.
    pub levels: HeadingLevels,
    /// Whether to add a permalink after the heading text.
    pub permalink: bool,
    /// Permalink text.
    pub symbol: String,
}

impl Default for AnchorOptions {
    fn default() -> Self {
        Self {
            levels: HeadingLevels::ALL,
            permalink: true,
            symbol: "#".to_owned(),
        }
    }
}

/// Table of contents options.
#[derive(Clone, Copy, Debug)]
pub struct TocOptions {
    /// Heading levels listed in the table of contents.
    pub levels: HeadingLevels,
}

impl Default for TocOptions {
    fn default() -> Self {
        Self {
            levels: HeadingLevels::from_levels([2, 3]),
        }
    }
}

/// Options for [`MarkdownRenderer`](crate::MarkdownRenderer).
///
/// The defaults enable every feature: HTML passthrough, linkify, typographic
/// substitutions, GFM tables and strikethrough, highlighting with language
/// detection, anchors on all heading levels and a level 2-3 table of contents.
#[derive(Clone, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderOptions {
    /// Pass raw HTML through unescaped.
    pub html: bool,
    /// Turn bare URLs and e-mail addresses into links.
    pub linkify: bool,
    /// Smart quotes, dashes, ellipses and symbol replacements.
    pub typographer: bool,
    /// GFM tables.
    pub tables: bool,
    /// GFM strikethrough.
    pub strikethrough: bool,
    pub highlight: HighlightOptions,
    pub anchors: AnchorOptions,
    pub toc: TocOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            html: true,
            linkify: true,
            typographer: true,
            tables: true,
            strikethrough: true,
            highlight: HighlightOptions::default(),
            anchors: AnchorOptions::default(),
            toc: TocOptions::default(),
        }
    }
}
