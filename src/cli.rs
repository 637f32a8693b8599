//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::validate_categories;
use crate::models::ActivityMode;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Shelfdash - library dashboard for the command line
///
/// Loads books, users and borrowings from a library backend and renders
/// category statistics, headline counts and recent activity as a
/// Markdown or JSON report.
///
/// Examples:
///   shelfdash --base-url http://localhost:8080 --token $TOKEN
///   shelfdash --username admin --password admin123 --mode borrowed
///   shelfdash --categories fiction,poetry,manga --format json -o dashboard.json
///   shelfdash --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the library backend
    ///
    /// Defaults to the config file value, or http://localhost:8080.
    #[arg(long, value_name = "URL", env = "SHELFDASH_BASE_URL")]
    pub base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long, value_name = "TOKEN", env = "SHELFDASH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Log in with this username before loading the dashboard
    #[arg(short, long, value_name = "NAME", requires = "password")]
    pub username: Option<String>,

    /// Password used with --username
    #[arg(
        short,
        long,
        value_name = "PASSWORD",
        env = "SHELFDASH_PASSWORD",
        hide_env_values = true
    )]
    pub password: Option<String>,

    /// Activity panel content (recent, borrowed)
    #[arg(long, value_name = "MODE")]
    pub mode: Option<ActivityMode>,

    /// Main categories to track individually (comma-separated)
    ///
    /// Example: --categories fiction,non-fiction,manga
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub categories: Option<Vec<String>>,

    /// Also list main categories that have no books
    #[arg(long)]
    pub show_empty_categories: bool,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of retries when the dashboard fails to load
    #[arg(long, value_name = "COUNT")]
    pub retries: Option<usize>,

    /// Exit with code 2 when any borrowing is overdue
    ///
    /// Useful for scheduled checks.
    #[arg(long)]
    pub fail_on_overdue: bool,

    /// Path to configuration file
    ///
    /// If not specified, looks for .shelfdash.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .shelfdash.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
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

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.username.is_some() != self.password.is_some() {
            return Err("--username and --password must be used together".to_string());
        }

        if let Some(ref categories) = self.categories {
            validate_categories(categories).map_err(|e| e.to_string())?;
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
    ///
    /// `config_verbose` is `[general] verbose` from the config file; `-q`
    /// still wins over it.
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
