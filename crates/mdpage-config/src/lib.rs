//! Configuration management for mdpage.
//!
//! Parses `mdpage.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [markdown]
//! html = true
//! linkify = true
//! typographer = true
//!
//! [highlight]
//! enabled = true
//! auto_detect = true
//!
//! [anchors]
//! levels = [1, 2, 3, 4, 5, 6]
//! symbol = "#"
//!
//! [toc]
//! always = true
//! levels = [2, 3]
//! ```

use std::path::{Path, PathBuf};

use mdpage_core::ConverterOptions;
use mdpage_renderer::{
    AnchorOptions, HeadingLevels, HighlightOptions, RenderOptions, TocOptions,
};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override table of contents marker injection.
    pub toc_always: Option<bool>,
    /// Override syntax highlighting.
    pub highlight_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpage.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown feature switches.
    pub markdown: MarkdownConfig,
    /// Code highlighting.
    pub highlight: HighlightConfig,
    /// Heading anchors.
    pub anchors: AnchorsConfig,
    /// Table of contents.
    pub toc: TocConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown feature configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct MarkdownConfig {
    /// Pass raw HTML through.
    pub html: bool,
    /// Turn bare URLs into links.
    pub linkify: bool,
    /// Smart punctuation and symbol replacements.
    pub typographer: bool,
    /// GFM tables.
    pub tables: bool,
    /// GFM strikethrough.
    pub strikethrough: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            html: true,
            linkify: true,
            typographer: true,
            tables: true,
            strikethrough: true,
        }
    }
}

/// Code highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Whether code blocks are highlighted.
    pub enabled: bool,
    /// Whether to guess the language of unannotated blocks.
    pub auto_detect: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_detect: true,
        }
    }
}

/// Heading anchor configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AnchorsConfig {
    /// Heading levels that get an anchor.
    pub levels: Vec<u8>,
    /// Whether to add a permalink after the heading text.
    pub permalink: bool,
    /// Permalink text.
    pub symbol: String,
}

impl Default for AnchorsConfig {
    fn default() -> Self {
        Self {
            levels: vec![1, 2, 3, 4, 5, 6],
            permalink: true,
            symbol: "#".to_owned(),
        }
    }
}

/// Table of contents configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Insert a table of contents when the document has no `[TOC]` marker.
    pub always: bool,
    /// Heading levels listed in the table of contents.
    pub levels: Vec<u8>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            always: true,
            levels: vec![2, 3],
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a heading level list to be non-empty and within 1-6.
fn require_levels(levels: &[u8], field: &str) -> Result<(), ConfigError> {
    if levels.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    if let Some(level) = levels.iter().find(|level| !(1..=6).contains(*level)) {
        return Err(ConfigError::Validation(format!(
            "{field} contains {level}, heading levels must be between 1 and 6"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdpage.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing or
    /// validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(always) = settings.toc_always {
            self.toc.always = always;
        }
        if let Some(enabled) = settings.highlight_enabled {
            self.highlight.enabled = enabled;
        }
    }

    /// Search for config file in `start` and its parents.
    fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_anchors()?;
        self.validate_toc()?;
        Ok(())
    }

    /// Validate anchors configuration.
    fn validate_anchors(&self) -> Result<(), ConfigError> {
        require_levels(&self.anchors.levels, "anchors.levels")?;
        if self.anchors.permalink {
            require_non_empty(&self.anchors.symbol, "anchors.symbol")?;
        }
        Ok(())
    }

    /// Validate table of contents configuration.
    fn validate_toc(&self) -> Result<(), ConfigError> {
        require_levels(&self.toc.levels, "toc.levels")?;

        // TOC links point at heading anchors, so every listed level needs one
        let anchored = HeadingLevels::from_levels(self.anchors.levels.iter().copied());
        let listed = HeadingLevels::from_levels(self.toc.levels.iter().copied());
        if !anchored.is_superset(listed) {
            let missing: Vec<String> = listed
                .iter()
                .filter(|level| !anchored.contains(*level))
                .map(|level| level.to_string())
                .collect();
            return Err(ConfigError::Validation(format!(
                "toc.levels contains {}, missing from anchors.levels",
                missing.join(", ")
            )));
        }
        Ok(())
    }

    /// Build renderer options from this configuration.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            html: self.markdown.html,
            linkify: self.markdown.linkify,
            typographer: self.markdown.typographer,
            tables: self.markdown.tables,
            strikethrough: self.markdown.strikethrough,
            highlight: HighlightOptions {
                enabled: self.highlight.enabled,
                auto_detect: self.highlight.auto_detect,
            },
            anchors: AnchorOptions {
                levels: HeadingLevels::from_levels(self.anchors.levels.iter().copied()),
                permalink: self.anchors.permalink,
                symbol: self.anchors.symbol.clone(),
            },
            toc: TocOptions {
                levels: HeadingLevels::from_levels(self.toc.levels.iter().copied()),
            },
        }
    }

    /// Build converter options from this configuration.
    #[must_use]
    pub fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            render: self.render_options(),
            inject_toc_marker: self.toc.always,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.markdown.html);
        assert!(config.markdown.linkify);
        assert!(config.markdown.typographer);
        assert!(config.highlight.enabled);
        assert!(config.highlight.auto_detect);
        assert_eq!(config.anchors.levels, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(config.anchors.symbol, "#");
        assert!(config.toc.always);
        assert_eq!(config.toc.levels, vec![2, 3]);
        assert_eq!(config.config_path, None);
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.markdown.html);
        assert_eq!(config.toc.levels, vec![2, 3]);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[markdown]
html = false
linkify = false
typographer = false
tables = false
strikethrough = false

[highlight]
enabled = false
auto_detect = false

[anchors]
levels = [2, 3, 4]
permalink = false
symbol = "¶"

[toc]
always = false
levels = [2]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert!(!config.markdown.html);
        assert!(!config.markdown.linkify);
        assert!(!config.markdown.typographer);
        assert!(!config.markdown.tables);
        assert!(!config.markdown.strikethrough);
        assert!(!config.highlight.enabled);
        assert!(!config.highlight.auto_detect);
        assert_eq!(config.anchors.levels, vec![2, 3, 4]);
        assert!(!config.anchors.permalink);
        assert_eq!(config.anchors.symbol, "¶");
        assert!(!config.toc.always);
        assert_eq!(config.toc.levels, vec![2]);
    }

    #[test]
    fn test_parse_partial_section_keeps_defaults() {
        let toml = r"
[highlight]
auto_detect = false
";
        let config: Config = toml::from_str(toml).unwrap();
        assert!(config.highlight.enabled);
        assert!(!config.highlight.auto_detect);
    }

    #[test]
    fn test_parse_invalid_type() {
        let toml = r#"
[toc]
always = "yes"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            toc_always: Some(false),
            highlight_enabled: Some(false),
        });
        assert!(!config.toc.always);
        assert!(!config.highlight.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings::default());
        assert!(config.toc.always);
        assert!(config.highlight.enabled);
    }

    #[test]
    fn test_validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_level_out_of_range() {
        let mut config = Config::default();
        config.anchors.levels = vec![1, 7];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("anchors.levels contains 7"));
    }

    #[test]
    fn test_validate_empty_levels() {
        let mut config = Config::default();
        config.toc.levels = Vec::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("toc.levels cannot be empty"));
    }

    #[test]
    fn test_validate_empty_symbol() {
        let mut config = Config::default();
        config.anchors.symbol = String::new();
        assert!(config.validate().is_err());

        config.anchors.permalink = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_toc_level_without_anchor() {
        let mut config = Config::default();
        config.anchors.levels = vec![2];
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("toc.levels contains 3"));

        config.anchors.levels = vec![1];
        let err = config.validate().unwrap_err();
        assert!(
            err.to_string()
                .contains("toc.levels contains 2, 3, missing from anchors.levels")
        );
    }

    #[test]
    fn test_converter_options() {
        let mut config = Config::default();
        config.toc.always = false;
        config.toc.levels = vec![2];
        config.markdown.linkify = false;

        let options = config.converter_options();
        assert!(!options.inject_toc_marker);
        assert!(!options.render.linkify);
        assert_eq!(options.render.toc.levels, HeadingLevels::from_levels([2]));
        assert_eq!(options.render.anchors.levels, HeadingLevels::ALL);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[toc]\nalways = false\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert!(!config.toc.always);
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_applies_cli_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[toc]\nalways = true\n").unwrap();

        let settings = CliSettings {
            toc_always: Some(false),
            ..CliSettings::default()
        };
        let config = Config::load(Some(&path), Some(&settings)).unwrap();
        assert!(!config.toc.always);
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(p) if p == path));
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "[anchors]\nlevels = [0]\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        fs::write(&path, "[anchors\n").unwrap();
        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_discover_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "").unwrap();

        assert_eq!(Config::discover_config(&nested), Some(path.clone()));
        assert_eq!(Config::discover_config(dir.path()), Some(path));
    }

    #[test]
    fn test_discover_config_prefers_nearest() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "").unwrap();
        fs::write(nested.join(CONFIG_FILENAME), "").unwrap();

        assert_eq!(
            Config::discover_config(&nested),
            Some(nested.join(CONFIG_FILENAME))
        );
    }
}
