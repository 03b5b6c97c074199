//! `mdpage convert` command implementation.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use mdpage_config::{CliSettings, Config};
use mdpage_core::Converter;

use crate::error::CliError;
use crate::output::Output;

/// Title used when nothing better is available.
const FALLBACK_TITLE: &str = "Untitled";

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown file to convert (default: read stdin, also `-`).
    input: Option<PathBuf>,

    /// Output HTML file (default: write stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page title (default: first H1 heading, then input file name).
    #[arg(short, long)]
    title: Option<String>,

    /// Path to configuration file (default: auto-discover mdpage.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only add a table of contents where the document has a `[TOC]` marker.
    #[arg(long)]
    no_toc: bool,

    /// Disable syntax highlighting.
    #[arg(long)]
    no_highlight: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, reading, conversion or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            toc_always: self.no_toc.then_some(false),
            highlight_enabled: self.no_highlight.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }

        let input = self.input.filter(|path| path.as_os_str() != "-");
        let markdown = read_input(input.as_deref())?;

        let converter = Converter::new(config.converter_options());
        let rendered = converter.render(&markdown)?;
        let title = resolve_title(
            self.title.as_deref(),
            rendered.title.as_deref(),
            input.as_deref(),
        );
        tracing::info!(title = %title, headings = rendered.toc.len(), "Converted markdown");

        let html = Converter::compose(&rendered, &title);

        match self.output {
            Some(path) => {
                write_output(&path, &html)?;
                output.info(&format!("Title: {title}"));
                output.success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

/// Read markdown from a file, or from stdin when `path` is `None`.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut markdown = String::new();
            io::stdin().read_to_string(&mut markdown)?;
            Ok(markdown)
        }
    }
}

/// Write the page, creating parent directories as needed.
fn write_output(path: &Path, html: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, html)?;
    Ok(())
}

/// Pick the page title: explicit, then first H1, then file stem.
fn resolve_title(explicit: Option<&str>, heading: Option<&str>, input: Option<&Path>) -> String {
    explicit
        .or(heading.filter(|heading| !heading.is_empty()))
        .map(str::to_owned)
        .or_else(|| {
            input
                .and_then(Path::file_stem)
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| FALLBACK_TITLE.to_owned())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(input: PathBuf, output: PathBuf, config: PathBuf) -> ConvertArgs {
        ConvertArgs {
            input: Some(input),
            output: Some(output),
            title: None,
            config: Some(config),
            no_toc: false,
            no_highlight: false,
            verbose: false,
        }
    }

    #[test]
    fn test_resolve_title_prefers_explicit() {
        assert_eq!(
            resolve_title(Some("Given"), Some("Heading"), Some(Path::new("doc.md"))),
            "Given"
        );
    }

    #[test]
    fn test_resolve_title_from_heading() {
        assert_eq!(
            resolve_title(None, Some("Heading"), Some(Path::new("doc.md"))),
            "Heading"
        );
    }

    #[test]
    fn test_resolve_title_from_file_stem() {
        assert_eq!(
            resolve_title(None, None, Some(Path::new("notes/setup-guide.md"))),
            "setup-guide"
        );
        assert_eq!(
            resolve_title(None, Some(""), Some(Path::new("a.md"))),
            "a"
        );
    }

    #[test]
    fn test_resolve_title_fallback() {
        assert_eq!(resolve_title(None, None, None), "Untitled");
    }

    #[test]
    fn test_write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/page.html");
        write_output(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_input(Some(dir.path().join("missing.md").as_path()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    fn test_execute_converts_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("guide.md");
        let output = dir.path().join("site/guide.html");
        let config = dir.path().join("mdpage.toml");
        fs::write(&input, "# User Guide\n\n## Install\n\nRun it.\n").unwrap();
        fs::write(&config, "").unwrap();

        args(input, output.clone(), config).execute().unwrap();

        let html = fs::read_to_string(output).unwrap();
        assert!(html.contains("<title>User Guide</title>"));
        assert!(html.contains(r#"<div class="toc-container">"#));
        assert!(html.contains(r#"<h2 id="install" tabindex="-1">"#));
    }

    #[test]
    fn test_execute_respects_flags_and_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.md");
        let output = dir.path().join("notes.html");
        let config = dir.path().join("custom.toml");
        fs::write(&input, "## Part\n\n```rust\nfn main() {}\n```\n").unwrap();
        fs::write(&config, "[anchors]\npermalink = false\n").unwrap();

        let mut convert = args(input, output.clone(), config);
        convert.no_toc = true;
        convert.no_highlight = true;
        convert.execute().unwrap();

        let html = fs::read_to_string(output).unwrap();
        assert!(html.contains("<title>notes</title>"));
        assert!(!html.contains(r#"<div class="toc-container">"#));
        assert!(!html.contains(r#"<a class="anchor""#));
        assert!(html.contains(r#"<pre><code class="language-rust">"#));
    }

    #[test]
    fn test_execute_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.md");
        fs::write(&input, "text").unwrap();

        let result = args(
            input,
            dir.path().join("a.html"),
            dir.path().join("missing.toml"),
        )
        .execute();
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
