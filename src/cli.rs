//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// LocDash - location analytics dashboard
///
/// Joins the built-in location and business datasets and reports
/// counts per category, average ratings, the most reviewed location,
/// a ratings chart and map markers.
///
/// Examples:
///   locdash
///   locdash --format markdown --output dashboard.md
///   locdash --format json > dashboard.json
///   locdash --format geojson --output markers.geojson
///   locdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Output format (text, markdown, json, geojson)
    ///
    /// Overrides the config file. Defaults to text.
    #[arg(short, long, value_name = "FORMAT", env = "LOCDASH_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Output file path for the report
    ///
    /// If not specified, the report is written to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .locdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dashboard title shown in report headers
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .locdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Terminal panels and text chart (default)
    #[default]
    Text,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
    /// GeoJSON map markers only
    Geojson,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse arguments from an explicit iterator.
    #[cfg(test)]
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref title) = self.title {
            if title.trim().is_empty() {
                return Err("Title must not be empty".to_string());
            }
        }

        // Validate output path if provided
        if let Some(ref output) = self.output {
            if output.is_dir() {
                return Err(format!("Output path is a directory: {}", output.display()));
            }
        }

        // Validate config path if provided
        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` comes from the config file; `--quiet` beats both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
