//! Generic markdown renderer with pluggable backend.

use std::fmt::Write;
use std::marker::PhantomData;
use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

use crate::backend::RenderBackend;
use crate::error::RenderError;
use crate::highlight::Highlighter;
use crate::linkify::{Segment, linkify};
use crate::options::RenderOptions;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocEntry, escape_html};
use crate::toc::{is_toc_marker, render_toc};
use crate::typography;
use crate::util::heading_level_to_num;

/// Language attribute written right after inline code, as in `` `x`{.js} ``.
static INLINE_LANG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\.([\w+#-]+)\}").unwrap());

/// Result of rendering markdown.
#[derive(Clone, Debug, Default)]
pub struct RenderResult {
    /// Rendered HTML content, without the table of contents.
    pub html: String,
    /// Table of contents markup, if a marker was found and it lists anything.
    pub toc_html: Option<String>,
    /// Every rendered heading in document order.
    pub toc: Vec<TocEntry>,
    /// Plain text of the first H1 heading.
    pub title: Option<String>,
}

/// Generic markdown renderer with pluggable backend.
///
/// Uses the [`RenderBackend`] trait to delegate the shape of code blocks,
/// permalinks, blockquotes and images while handling headings, tables, lists,
/// links and inline formatting generically.
///
/// # Example
///
/// ```
/// use mdpage_renderer::{HtmlBackend, MarkdownRenderer, RenderOptions};
///
/// let options = RenderOptions::default();
/// let result = MarkdownRenderer::<HtmlBackend>::new(&options)
///     .render_markdown("[TOC]\n\n## Usage\n\nRun it.")
///     .unwrap();
///
/// assert!(result.html.contains(r#"<h2 id="usage" tabindex="-1">"#));
/// assert!(result.toc_html.unwrap().contains(r##"href="#usage""##));
/// ```
pub struct MarkdownRenderer<'a, B: RenderBackend> {
    options: &'a RenderOptions,
    highlighter: Highlighter,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    pending_image: Option<(String, String)>,
    /// Link types of the markdown links currently open.
    links: Vec<LinkType>,
    /// Depth of `<a>` elements opened by inline HTML.
    html_links: usize,
    toc_requested: bool,
    _backend: PhantomData<B>,
}

impl<'a, B: RenderBackend> MarkdownRenderer<'a, B> {
    #[must_use]
    pub fn new(options: &'a RenderOptions) -> Self {
        Self {
            options,
            highlighter: Highlighter::new(options.highlight),
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            pending_image: None,
            links: Vec::new(),
            html_links: 0,
            toc_requested: false,
            _backend: PhantomData,
        }
    }

    /// Get parser options for the configured markdown features.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.options.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.options.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.options.typographer {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        options
    }

    /// Render markdown text.
    ///
    /// Each call starts from a clean state, so a renderer can be reused and
    /// produces the same anchors for the same input.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::Highlight` if a code grammar fails on its input.
    pub fn render_markdown(&mut self, markdown: &str) -> Result<RenderResult, RenderError> {
        self.reset();

        let events: Vec<Event<'_>> =
            TextMergeStream::new(Parser::new_ext(markdown, self.parser_options())).collect();

        let mut i = 0;
        while i < events.len() {
            if let Some(len) = toc_marker_len(&events[i..]) {
                self.toc_requested = true;
                i += len;
                continue;
            }

            if let [Event::Code(code), Event::Text(next), ..] = &events[i..]
                && let Some(caps) = INLINE_LANG.captures(next)
            {
                self.highlighted_inline_code(&caps[1], code)?;
                self.text(&next[caps[0].len()..]);
                i += 2;
                continue;
            }

            self.process_event(&events[i])?;
            i += 1;
        }

        let toc = self.heading.take_toc();
        let toc_html = if self.toc_requested {
            render_toc(&toc, self.options.toc.levels)
        } else {
            None
        };
        tracing::debug!(
            headings = toc.len(),
            toc_requested = self.toc_requested,
            has_toc = toc_html.is_some(),
            "Rendered markdown"
        );

        Ok(RenderResult {
            html: std::mem::take(&mut self.output),
            toc_html,
            toc,
            title: self.heading.take_title(),
        })
    }

    fn reset(&mut self) {
        self.output.clear();
        self.code = CodeBlockState::default();
        self.table = TableState::default();
        self.image = ImageState::default();
        self.heading = HeadingState::default();
        self.pending_image = None;
        self.links.clear();
        self.html_links = 0;
        self.toc_requested = false;
    }

    /// Push content to output or heading buffer based on context.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            // Alt text keeps only the text
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: &Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(*tag)?,
            Event::Text(text) => self.text(text),
            Event::Code(code) => self.inline_code(code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => {
                let mut html = String::new();
                B::hard_break(&mut html);
                self.push_inline(&html);
            }
            Event::Rule => B::horizontal_rule(&mut self.output),
            Event::TaskListMarker(_)
            | Event::FootnoteReference(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn start_tag(&mut self, tag: &Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the ID is known
                self.heading.start_heading(heading_level_to_num(*level));
            }
            Tag::BlockQuote(_) => B::blockquote_start(&mut self.output),
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => fence_language(info),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang.map(str::to_owned));
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>\n"),
                Some(n) => {
                    let _ = writeln!(self.output, r#"<ol start="{n}">"#);
                }
                None => self.output.push_str("<ul>\n"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>\n"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments.clone());
                self.output.push_str("<table>\n");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead>\n<tr>\n");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>\n");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                let _ = write!(self.output, "<{tag}{align}>");
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let scheme = if *link_type == LinkType::Email {
                    "mailto:"
                } else {
                    ""
                };
                let mut link = format!(r#"<a href="{scheme}{}""#, escape_html(dest_url));
                if !title.is_empty() {
                    let _ = write!(link, r#" title="{}""#, escape_html(title));
                }
                link.push('>');
                self.links.push(*link_type);
                self.push_inline(&link);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the end tag
                self.image.start();
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
            }
        }
    }

    #[allow(clippy::too_many_lines)]
    fn end_tag(&mut self, tag: TagEnd) -> Result<(), RenderError> {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>\n"),
            TagEnd::Heading(_) => self.end_heading(),
            TagEnd::BlockQuote(_) => B::blockquote_end(&mut self.output),
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                let code = self.highlighter.highlight(lang.as_deref(), &content)?;
                B::code_block(
                    code.language.as_deref(),
                    code.highlighted,
                    &code.html,
                    &mut self.output,
                );
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
            }
            TagEnd::Item => self.output.push_str("</li>\n"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>\n"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>\n"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>\n"),
            TagEnd::Table => self.output.push_str("</tbody>\n</table>\n"),
            TagEnd::TableHead => {
                self.output.push_str("</tr>\n</thead>\n<tbody>\n");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>\n"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>\n"
                } else {
                    "</td>\n"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => {
                self.links.pop();
                self.push_inline("</a>");
            }
            TagEnd::Image => {
                let alt = self.image.end();
                if self.heading.is_active() {
                    self.heading.push_text(&alt);
                }
                if let Some((src, title)) = self.pending_image.take() {
                    let mut html = String::new();
                    B::image(&src, &alt, &title, &mut html);
                    self.push_inline(&html);
                }
            }
        }
        Ok(())
    }

    fn end_heading(&mut self) {
        let Some(heading) = self.heading.complete_heading() else {
            return;
        };
        let level = heading.level;
        let anchors = &self.options.anchors;

        if anchors.levels.contains(level) {
            let _ = write!(
                self.output,
                r#"<h{level} id="{}" tabindex="-1">{}"#,
                escape_html(&heading.id),
                heading.html.trim()
            );
            if anchors.permalink {
                B::heading_permalink(&heading.id, &anchors.symbol, &mut self.output);
            }
            let _ = writeln!(self.output, "</h{level}>");
        } else {
            let _ = writeln!(self.output, "<h{level}>{}</h{level}>", heading.html.trim());
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.code.is_active() {
            self.code.push_str(text);
            return;
        }

        let in_autolink = self
            .links
            .iter()
            .any(|kind| matches!(kind, LinkType::Autolink | LinkType::Email));
        let typographer = self.options.typographer && !in_autolink;
        let replace = |text: &str| -> String {
            if typographer {
                typography::replace(text).into_owned()
            } else {
                text.to_owned()
            }
        };

        if self.image.is_active() {
            self.image.push_str(&replace(text));
            return;
        }

        let segments = if self.options.linkify && self.links.is_empty() && self.html_links == 0 {
            linkify(text)
        } else {
            vec![Segment::Text(text)]
        };

        let mut plain = String::new();
        let mut html = String::new();
        for segment in segments {
            match segment {
                Segment::Text(text) => {
                    let text = replace(text);
                    html.push_str(&escape_html(&text));
                    plain.push_str(&text);
                }
                Segment::Link { text, href } => {
                    let _ = write!(
                        html,
                        r#"<a href="{}">{}</a>"#,
                        escape_html(&href),
                        escape_html(text)
                    );
                    plain.push_str(text);
                }
            }
        }

        if self.heading.is_active() {
            self.heading.push_text(&plain);
        }
        self.push_inline(&html);
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let mut html = String::new();
        B::inline_code(None, &escape_html(code), &mut html);
        self.push_inline(&html);
    }

    fn highlighted_inline_code(&mut self, lang: &str, code: &str) -> Result<(), RenderError> {
        if self.image.is_active() {
            self.image.push_str(code);
            return Ok(());
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let highlighted = self.highlighter.highlight(Some(lang), code)?;
        let mut html = String::new();
        B::inline_code(Some(lang), &highlighted.html, &mut html);
        self.push_inline(&html);
        Ok(())
    }

    fn raw_html(&mut self, html: &str) {
        if !self.options.html {
            let escaped = escape_html(html);
            self.push_inline(&escaped);
            return;
        }

        let tag = html.trim_start().to_ascii_lowercase();
        if tag.starts_with("<a ") || tag.starts_with("<a>") {
            self.html_links += 1;
        } else if tag.starts_with("</a") {
            self.html_links = self.html_links.saturating_sub(1);
        }
        self.push_inline(html);
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else if self.heading.is_active() {
            self.heading.push_text(" ");
            self.heading.push_html("\n");
        } else {
            self.output.push('\n');
        }
    }
}

/// Number of events making up a paragraph that holds only a TOC marker.
///
/// `[[_TOC_]]` parses as emphasis, so emphasis delimiters are read back as `_`.
fn toc_marker_len(events: &[Event<'_>]) -> Option<usize> {
    let [Event::Start(Tag::Paragraph), rest @ ..] = events else {
        return None;
    };
    let mut text = String::new();
    for (index, event) in rest.iter().enumerate() {
        match event {
            Event::Text(part) => text.push_str(part),
            Event::Start(Tag::Emphasis) | Event::End(TagEnd::Emphasis) => text.push('_'),
            Event::End(TagEnd::Paragraph) => return is_toc_marker(&text).then_some(index + 2),
            _ => return None,
        }
    }
    None
}

/// Language of a fenced code block: the first word of its info string.
fn fence_language(info: &str) -> Option<&str> {
    info.split_whitespace().next().filter(|lang| !lang.is_empty())
}
