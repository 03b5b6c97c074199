//! Syntax highlighting with highlight.js-compatible class names.
//!
//! Code is tokenized with syntect's bundled grammars. Each token's scope stack
//! is mapped, innermost scope first, onto the `hljs-*` class vocabulary so the
//! page stylesheet can color it. The text itself is only escaped, never
//! rewritten.

use std::fmt::Write;
use std::sync::LazyLock;

use syntect::parsing::{ParseState, Scope, ScopeStack, SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::options::HighlightOptions;
use crate::state::escape_html;

/// Grammars shared by every renderer in the process.
static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Languages tried, in order, when a block's language must be guessed.
const CANDIDATES: &[&str] = &[
    "Rust",
    "Python",
    "JavaScript",
    "Go",
    "Java",
    "C",
    "C++",
    "C#",
    "Ruby",
    "PHP",
    "Bourne Again Shell (bash)",
    "SQL",
    "JSON",
    "YAML",
    "HTML",
    "XML",
    "CSS",
];

/// Minimum relevance for a guessed language to be used.
const MIN_RELEVANCE: i64 = 3;

/// Scope prefixes and the highlight.js classes they map to.
///
/// Checked in order, so more specific prefixes come first.
const SCOPE_CLASSES: &[(&str, &str)] = &[
    ("comment.block.documentation", "hljs-doctag"),
    ("comment", "hljs-comment"),
    ("string.regexp", "hljs-regexp"),
    ("string", "hljs-string"),
    ("constant.numeric", "hljs-number"),
    ("constant.language", "hljs-literal"),
    ("constant.other.symbol", "hljs-symbol"),
    ("constant.character.escape", "hljs-string"),
    ("constant.other.placeholder", "hljs-variable"),
    ("keyword.operator", "hljs-operator"),
    ("keyword", "hljs-keyword"),
    ("storage.type.function", "hljs-keyword"),
    ("storage.type", "hljs-type"),
    ("storage", "hljs-keyword"),
    ("entity.name.function", "hljs-title function_"),
    ("entity.name.class", "hljs-title class_"),
    ("entity.name.struct", "hljs-title class_"),
    ("entity.name.enum", "hljs-title class_"),
    ("entity.name.trait", "hljs-title class_"),
    ("entity.name.type", "hljs-title class_"),
    ("entity.other.inherited-class", "hljs-title class_ inherited__"),
    ("entity.name.tag.css", "hljs-selector-tag"),
    ("entity.name.tag", "hljs-name"),
    ("entity.name.section", "hljs-section"),
    ("entity.name", "hljs-title"),
    ("entity.other.attribute-name.class", "hljs-selector-class"),
    ("entity.other.attribute-name.id", "hljs-selector-id"),
    ("entity.other.pseudo-class", "hljs-selector-pseudo"),
    ("entity.other.pseudo-element", "hljs-selector-pseudo"),
    ("entity.other.attribute-name", "hljs-attr"),
    ("meta.attribute-selector", "hljs-selector-attr"),
    ("support.type.property-name", "hljs-attribute"),
    ("support.function", "hljs-built_in"),
    ("support.class", "hljs-built_in"),
    ("support.type", "hljs-built_in"),
    ("support.constant", "hljs-built_in"),
    ("variable.language", "hljs-variable language_"),
    ("variable.function", "hljs-title function_"),
    ("variable.other.constant", "hljs-variable"),
    ("meta.preprocessor", "hljs-meta"),
    ("meta.annotation", "hljs-meta"),
    ("meta.attribute", "hljs-meta"),
    ("punctuation.definition.annotation", "hljs-meta"),
    ("markup.heading", "hljs-section"),
    ("markup.bold", "hljs-strong"),
    ("markup.italic", "hljs-emphasis"),
    ("markup.inserted", "hljs-addition"),
    ("markup.deleted", "hljs-deletion"),
    ("markup.quote", "hljs-quote"),
    ("markup.raw", "hljs-code"),
    ("markup.math", "hljs-formula"),
    ("markup.underline.link", "hljs-link"),
];

/// Error returned when a grammar fails on its input.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// The grammar's parser rejected a line.
    #[error("failed to tokenize {language} code: {message}")]
    Parse { language: String, message: String },
    /// The grammar produced an unbalanced scope stack.
    #[error("invalid scope stack while highlighting {language} code: {message}")]
    Scope { language: String, message: String },
}

/// Result of highlighting a code block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightedCode {
    /// Language used for the block, if one was given or detected.
    pub language: Option<String>,
    /// Escaped code, wrapped in `hljs-*` spans when `highlighted`.
    pub html: String,
    /// Whether `html` carries token markup.
    pub highlighted: bool,
}

/// Code highlighter.
///
/// Cheap to construct; grammars are loaded once per process on first use.
#[derive(Clone, Copy, Debug, Default)]
pub struct Highlighter {
    options: HighlightOptions,
}

impl Highlighter {
    #[must_use]
    pub fn new(options: HighlightOptions) -> Self {
        Self { options }
    }

    /// Highlight a code block.
    ///
    /// `language` is the fence annotation, if any. Known annotations are used
    /// as-is; unknown or missing ones fall back to detection when enabled.
    ///
    /// # Errors
    ///
    /// Returns `HighlightError` if a grammar fails on the input.
    pub fn highlight(
        &self,
        language: Option<&str>,
        code: &str,
    ) -> Result<HighlightedCode, HighlightError> {
        if !self.options.enabled {
            return Ok(plain(language, code, false));
        }

        if let Some(syntax) = language.and_then(|lang| SYNTAXES.find_syntax_by_token(lang)) {
            let (html, _) = tokenize(syntax, code)?;
            return Ok(HighlightedCode {
                language: language.map(str::to_owned),
                html,
                highlighted: true,
            });
        }

        if self.options.auto_detect
            && let Some((syntax, html)) = detect(code)
        {
            tracing::debug!(language = %syntax.name, "Detected code block language");
            return Ok(HighlightedCode {
                language: Some(language.map_or_else(|| language_token(syntax), str::to_owned)),
                html,
                highlighted: true,
            });
        }

        Ok(plain(language, code, true))
    }
}

fn plain(language: Option<&str>, code: &str, highlighted: bool) -> HighlightedCode {
    HighlightedCode {
        language: language.map(str::to_owned),
        html: escape_html(code),
        highlighted,
    }
}

/// Short identifier used in the `language-*` class of a detected block.
fn language_token(syntax: &SyntaxReference) -> String {
    syntax
        .file_extensions
        .first()
        .cloned()
        .unwrap_or_else(|| syntax.name.to_lowercase())
}

/// Guess the language of `code`.
///
/// A first-line match (shebang, XML declaration, ...) wins outright. Otherwise
/// every candidate tokenizes the code and the most relevant one is kept. A
/// grammar that fails on the input is skipped.
fn detect(code: &str) -> Option<(&'static SyntaxReference, String)> {
    if code.trim().is_empty() {
        return None;
    }

    if let Some(syntax) = code
        .lines()
        .next()
        .and_then(|line| SYNTAXES.find_syntax_by_first_line(line))
        && let Some((html, _)) = try_tokenize(syntax, code)
    {
        return Some((syntax, html));
    }

    let mut best: Option<(&'static SyntaxReference, String, i64)> = None;
    for syntax in CANDIDATES
        .iter()
        .filter_map(|name| SYNTAXES.find_syntax_by_name(name))
    {
        let Some((html, relevance)) = try_tokenize(syntax, code) else {
            continue;
        };
        if relevance >= MIN_RELEVANCE && best.as_ref().is_none_or(|(_, _, r)| relevance > *r) {
            best = Some((syntax, html, relevance));
        }
    }
    best.map(|(syntax, html, _)| (syntax, html))
}

fn try_tokenize(syntax: &SyntaxReference, code: &str) -> Option<(String, i64)> {
    match tokenize(syntax, code) {
        Ok(tokens) => Some(tokens),
        Err(err) => {
            tracing::debug!(language = %syntax.name, error = %err, "Skipping language candidate");
            None
        }
    }
}

/// Map the innermost classifiable scope of `stack` to a class.
fn class_for(stack: &ScopeStack) -> Option<&'static str> {
    stack.as_slice().iter().rev().find_map(scope_class)
}

fn scope_class(scope: &Scope) -> Option<&'static str> {
    let name = scope.build_string();
    SCOPE_CLASSES
        .iter()
        .find(|(prefix, _)| {
            name.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('.'))
        })
        .map(|(_, class)| *class)
}

/// How much a token of `class` says about the guessed language.
fn class_weight(class: &str) -> i64 {
    match class {
        "hljs-keyword" | "hljs-built_in" | "hljs-name" => 2,
        _ => 1,
    }
}

fn is_invalid(stack: &ScopeStack) -> bool {
    stack
        .as_slice()
        .iter()
        .any(|scope| scope.build_string().starts_with("invalid"))
}

/// Writes escaped text, opening and closing class spans as the class changes.
#[derive(Default)]
struct SpanWriter {
    out: String,
    open: Option<&'static str>,
}

impl SpanWriter {
    fn push(&mut self, class: Option<&'static str>, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.open != class {
            if self.open.is_some() {
                self.out.push_str("</span>");
            }
            if let Some(class) = class {
                let _ = write!(self.out, r#"<span class="{class}">"#);
            }
            self.open = class;
        }
        self.out.push_str(&escape_html(text));
    }

    fn finish(mut self) -> String {
        if self.open.is_some() {
            self.out.push_str("</span>");
        }
        self.out
    }
}

/// Tokenize `code` and return its highlighted HTML and relevance score.
fn tokenize(syntax: &SyntaxReference, code: &str) -> Result<(String, i64), HighlightError> {
    let mut state = ParseState::new(syntax);
    let mut stack = ScopeStack::new();
    let mut writer = SpanWriter::default();
    let mut relevance = 0;

    let mut emit = |stack: &ScopeStack, text: &str, writer: &mut SpanWriter| {
        if text.trim().is_empty() {
            writer.push(writer.open, text);
            return;
        }
        let class = class_for(stack);
        if is_invalid(stack) {
            relevance -= 10;
        } else if let Some(class) = class {
            relevance += class_weight(class);
        }
        writer.push(class, text);
    };

    for line in LinesWithEndings::from(code) {
        let ops = state
            .parse_line(line, &SYNTAXES)
            .map_err(|e| HighlightError::Parse {
                language: syntax.name.clone(),
                message: e.to_string(),
            })?;

        let mut pos = 0;
        for (index, op) in ops {
            if index > pos {
                emit(&stack, &line[pos..index], &mut writer);
                pos = index;
            }
            stack.apply(&op).map_err(|e| HighlightError::Scope {
                language: syntax.name.clone(),
                message: format!("{e:?}"),
            })?;
        }
        if pos < line.len() {
            emit(&stack, &line[pos..], &mut writer);
        }
    }

    Ok((writer.finish(), relevance))
}
