//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.shelfdash.toml` files.

use crate::analysis::{
    default_categories, validate_categories, DEFAULT_BORROWED_LIMIT, DEFAULT_RECENT_LIMIT,
};
use crate::cli::OutputFormat;
use crate::models::ActivityMode;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".shelfdash.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Dashboard derivation settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
            format: OutputFormat::default(),
        }
    }
}

fn default_output() -> String {
    "dashboard.md".to_string()
}

/// Library backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// How many times a failed dashboard load is retried.
    #[serde(default = "default_retries")]
    pub retries: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_seconds: default_timeout(),
            retries: default_retries(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> usize {
    1
}

/// Dashboard derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Main categories tracked individually, in display order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Hide main categories that have no books.
    #[serde(default = "default_true")]
    pub hide_empty_categories: bool,

    /// Activity panel content.
    #[serde(default)]
    pub activity_mode: ActivityMode,

    /// Entries in the recent-activity feed.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Rows in the currently-borrowed view.
    #[serde(default = "default_borrowed_limit")]
    pub borrowed_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            hide_empty_categories: true,
            activity_mode: ActivityMode::default(),
            recent_limit: default_recent_limit(),
            borrowed_limit: default_borrowed_limit(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_borrowed_limit() -> usize {
    DEFAULT_BORROWED_LIMIT
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

    /// Try to load configuration from `dir/.shelfdash.toml`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Try to load configuration from the default location.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only values the user actually passed override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_url) = args.base_url {
            self.api.base_url = base_url.clone();
        }
        if let Some(ref token) = args.token {
            self.api.token = Some(token.clone());
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = timeout;
        }
        if let Some(retries) = args.retries {
            self.api.retries = retries;
        }

        if let Some(mode) = args.mode {
            self.dashboard.activity_mode = mode;
        }
        if let Some(ref categories) = args.categories {
            self.dashboard.categories = categories.clone();
        }
        if args.show_empty_categories {
            self.dashboard.hide_empty_categories = false;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check the merged settings before any request is sent.
    pub fn validate(&self) -> Result<()> {
        if self.api.timeout_seconds == 0 {
            bail!("api.timeout_seconds must be at least 1 second");
        }

        validate_categories(&self.dashboard.categories)
            .context("Invalid dashboard.categories setting")?;

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
