//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.linkstats.toml` files.

use crate::analysis::ValidityRules;
use crate::cli::{Args, OutputFormat};
use crate::report::RenderOptions;
use crate::source::{InputSource, LoadOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".linkstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Catalogue input settings.
    #[serde(default)]
    pub input: InputConfig,

    /// Record validity settings.
    #[serde(default)]
    pub validity: ValidityConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Where and how to load the catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// File path or http(s) URL of the catalogue.
    #[serde(default = "default_source")]
    pub source: String,

    /// Remote fetch timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Append a `t=<millis>` query pair to remote URLs.
    #[serde(default = "default_true")]
    pub cache_bust: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            timeout_seconds: default_timeout(),
            cache_bust: true,
        }
    }
}

fn default_source() -> String {
    "sources_with_metrics.json".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Extra conditions for counting a site as valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidityConfig {
    /// Require DA/PA to fall within 0-100 and spam score within 0-14.
    #[serde(default)]
    pub enforce_metric_ranges: bool,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output file path. When unset, `linkstats_report` with the
    /// extension of `format`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Default output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Show underscores in category names as spaces.
    #[serde(default = "default_true")]
    pub humanize_names: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: None,
            format: OutputFormat::default(),
            humanize_names: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.linkstats.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref input) = args.input {
            self.input.source = input.clone();
        }
        if let Some(timeout) = args.timeout {
            self.input.timeout_seconds = timeout;
        }
        if args.no_cache_bust {
            self.input.cache_bust = false;
        }

        if args.strict_ranges {
            self.validity.enforce_metric_ranges = true;
        }

        if let Some(ref output) = args.output {
            self.report.output = Some(output.display().to_string());
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if args.raw_names {
            self.report.humanize_names = false;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// The catalogue location to load.
    pub fn input_source(&self) -> InputSource {
        InputSource::parse(&self.input.source)
    }

    /// Loader options; the spinner is hidden in quiet mode.
    pub fn load_options(&self, quiet: bool) -> LoadOptions {
        LoadOptions {
            timeout_seconds: self.input.timeout_seconds,
            cache_bust: self.input.cache_bust,
            show_progress: !quiet,
        }
    }

    /// Where to write the report.
    pub fn output_path(&self) -> String {
        match self.report.output {
            Some(ref output) => output.clone(),
            None => format!("linkstats_report.{}", self.report.format.extension()),
        }
    }

    pub fn validity_rules(&self) -> ValidityRules {
        ValidityRules {
            enforce_metric_ranges: self.validity.enforce_metric_ranges,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            humanize_names: self.report.humanize_names,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.source, "sources_with_metrics.json");
        assert_eq!(config.input.timeout_seconds, 30);
        assert!(config.input.cache_bust);
        assert!(!config.validity.enforce_metric_ranges);
        assert_eq!(config.report.format, OutputFormat::Markdown);
        assert_eq!(config.output_path(), "linkstats_report.md");
        assert!(config.report.humanize_names);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[input]
source = "https://example.com/sources.json"
timeout_seconds = 5

[validity]
enforce_metric_ranges = true

[report]
output = "count.html"
format = "html"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert!(config.input_source().is_remote());
        assert_eq!(config.input.timeout_seconds, 5);
        assert!(config.input.cache_bust);
        assert!(config.validity_rules().enforce_metric_ranges);
        assert_eq!(config.output_path(), "count.html");
        assert_eq!(config.report.format, OutputFormat::Html);
        assert!(config.render_options().humanize_names);
    }

    #[test]
    fn test_merge_only_explicit_args() {
        let mut config: Config = toml::from_str(
            r#"
[input]
source = "catalogue.json"

[report]
format = "json"
"#,
        )
        .unwrap();

        let args = Args::try_parse_from(["linkstats", "--no-cache-bust", "--raw-names"]).unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.input.source, "catalogue.json");
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(!config.input.cache_bust);
        assert!(!config.render_options().humanize_names);

        let args = Args::try_parse_from([
            "linkstats",
            "-i",
            "other.json",
            "--format",
            "text",
            "--timeout",
            "9",
        ])
        .unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.input.source, "other.json");
        assert_eq!(config.report.format, OutputFormat::Text);
        assert_eq!(config.load_options(true).timeout_seconds, 9);
        assert!(!config.load_options(true).show_progress);
    }

    #[test]
    fn test_default_output_follows_format() {
        let mut config = Config::default();
        let args = Args::try_parse_from(["linkstats", "--format", "html"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.output_path(), "linkstats_report.html");

        let args = Args::try_parse_from(["linkstats", "--format", "text"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.output_path(), "linkstats_report.txt");

        let args = Args::try_parse_from(["linkstats", "-o", "count.html"]).unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.output_path(), "count.html");
        assert_eq!(config.report.format, OutputFormat::Text);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        std::fs::write(dir.path().join(CONFIG_FILE), "[report]\nhumanize_names = false\n").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert!(!config.report.humanize_names);

        std::fs::write(dir.path().join(CONFIG_FILE), "[report\n").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[input]"));
        assert!(toml_str.contains("[validity]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.input.source, "sources_with_metrics.json");
    }
}
