//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// linkstats - statistics for backlink source catalogues
///
/// Reads a JSON catalogue mapping category names to site entries, counts
/// the entries with a usable URL and metrics, and reports average domain
/// authority, page authority and spam score per category and overall.
///
/// Examples:
///   linkstats --input sources_with_metrics.json
///   linkstats --input http://localhost:8000/sources_with_metrics.json --format html -o count.html
///   linkstats --format text --stdout --expect-min 1000
///   linkstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Catalogue to analyze: a JSON file path or an http(s) URL
    ///
    /// Defaults to sources_with_metrics.json (or input.source from the config file)
    #[arg(short, long, value_name = "PATH|URL", env = "LINKSTATS_INPUT")]
    pub input: Option<String>,

    /// Output file path for the report
    ///
    /// Defaults to report.output from the config file, or linkstats_report
    /// with the extension of the chosen format
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json, html, text)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .linkstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Timeout for fetching a remote catalogue, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Do not append a `t=<millis>` cache-busting parameter to remote URLs
    #[arg(long)]
    pub no_cache_bust: bool,

    /// Only count sites whose DA/PA are within 0-100 and spam score within 0-14
    #[arg(long)]
    pub strict_ranges: bool,

    /// Keep underscores in category names instead of showing spaces
    #[arg(long)]
    pub raw_names: bool,

    /// Exit with code 2 if fewer than COUNT valid sites are found
    ///
    /// Useful in CI to catch a truncated or stale catalogue.
    #[arg(long, value_name = "COUNT")]
    pub expect_min: Option<usize>,

    /// Print the report to stdout instead of writing it to --output
    #[arg(long)]
    pub stdout: bool,

    /// Generate a default .linkstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
    /// Standalone HTML page
    Html,
    /// Plain-text summary
    Text,
}

impl OutputFormat {
    /// File extension for reports in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
            OutputFormat::Text => "txt",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref input) = self.input {
            if input.trim().is_empty() {
                return Err("Input must not be empty".to_string());
            }

            if input.starts_with("http://") || input.starts_with("https://") {
                if let Err(e) = reqwest::Url::parse(input) {
                    return Err(format!("Invalid input URL '{}': {}", input, e));
                }
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: Some("sources_with_metrics.json".to_string()),
            output: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            timeout: None,
            no_cache_bust: false,
            strict_ranges: false,
            raw_names: false,
            expect_min: None,
            stdout: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_defaults() {
        let args = Args::try_parse_from(["linkstats"]).unwrap();
        assert!(args.output.is_none());
        assert!(args.format.is_none());
        assert!(args.expect_min.is_none());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "linkstats",
            "-i",
            "https://example.com/sources.json",
            "--format",
            "html",
            "--expect-min",
            "1000",
            "--strict-ranges",
        ])
        .unwrap();

        assert_eq!(args.input.as_deref(), Some("https://example.com/sources.json"));
        assert_eq!(args.format, Some(OutputFormat::Html));
        assert_eq!(args.expect_min, Some(1000));
        assert!(args.strict_ranges);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.input = Some("http://".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
