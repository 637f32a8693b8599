//! Shelfdash - library dashboard for the command line
//!
//! Loads books, users and borrowings from a library backend, derives
//! dashboard statistics on the client side and writes a Markdown or JSON
//! report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (config, login, or dashboard still failing after retries)
//!   2 - Overdue borrowings found with --fail-on-overdue

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use indicatif::{ProgressBar, ProgressStyle};
use shelfdash::api::{ApiClient, Credentials};
use shelfdash::cli::{Args, OutputFormat};
use shelfdash::config::{Config, CONFIG_FILE_NAME};
use shelfdash::dashboard::{Dashboard, DashboardOptions};
use shelfdash::report::{self, ReportContext};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration first so [general] verbose can set the log level
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, config.general.verbose);

    info!("Shelfdash v{}", env!("CARGO_PKG_VERSION"));
    origin.log();
    debug!("Arguments: {:?}", args);

    match run_dashboard(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .shelfdash.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the backend URL, categories and activity mode.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over -v/-q when set.
fn init_logging(args: &Args, config_verbose: bool) {
    let level = args.log_level(config_verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Load the dashboard and write the report. Returns exit code (0, 1 or 2).
async fn run_dashboard(args: Args, config: Config) -> Result<i32> {
    config.validate()?;

    let credentials = config
        .api
        .token
        .clone()
        .map(Credentials::bearer)
        .unwrap_or_else(Credentials::anonymous);

    let mut client = ApiClient::new(&config.api.base_url, config.api.timeout_seconds, credentials)
        .context("Failed to create API client")?;

    let mut context = ReportContext {
        base_url: client.base_url().to_string(),
        username: None,
    };

    // Optional login
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        let login = client
            .login(username, password)
            .await
            .with_context(|| format!("Login as {} failed", username))?;
        client = client.with_credentials(Credentials::bearer(login.token));
        context.username = login.username.or_else(|| Some(username.clone()));
    }

    if client.credentials().token().is_none() {
        warn!("No token configured; requests are sent without authorization");
    }

    let options = DashboardOptions::from(&config.dashboard);
    let retries = config.api.retries;
    let mut dashboard = Dashboard::new(client, options);
    debug!("Activity mode: {}", dashboard.options().mode);

    let spinner = loading_spinner(args.quiet);

    dashboard.load(local_now()).await;
    let mut attempt = 0;
    while dashboard.state().is_error() && attempt < retries {
        attempt += 1;
        warn!("Dashboard load failed, retry {}/{}", attempt, retries);
        dashboard.reload(local_now()).await;
    }

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let state = dashboard.state();
    if state.snapshot.activity.is_empty() {
        debug!("No activity entries to show");
    }

    // Render and save the report
    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(state, &context)?,
        OutputFormat::Markdown => report::generate_markdown_report(state, &context),
    };

    std::fs::write(&config.general.output, &output)
        .with_context(|| format!("Failed to write report to {}", config.general.output))?;

    if let Some(ref message) = state.error {
        eprintln!("\n❌ {}", message);
        eprintln!("   Report saved to: {}", config.general.output);
        return Ok(1);
    }

    let stats = &state.snapshot.stats;
    if !args.quiet {
        println!("\n📊 Library Summary:");
        println!("   Total books: {}", stats.total_books);
        println!("   Total users: {}", stats.total_users);
        println!("   Books borrowed: {}", stats.books_borrowed);
        println!("   Overdue books: {}", stats.overdue_books);
        if !state.failed_sources.is_empty() {
            println!(
                "   ⚠️  Unavailable: {}",
                state.failed_sources.join(", ")
            );
        }
        println!(
            "\n✅ Dashboard complete! Report saved to: {}",
            config.general.output
        );
    }

    if args.fail_on_overdue && stats.overdue_books > 0 {
        eprintln!(
            "\n⛔ {} overdue borrowings found. Failing (exit code 2).",
            stats.overdue_books
        );
        return Ok(2);
    }

    Ok(0)
}

/// Spinner shown while the dashboard is loading.
fn loading_spinner(quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Loading dashboard...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Where the configuration came from, logged once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Unreadable(String),
    Defaults,
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigOrigin::Unreadable(e) => warn!("Failed to load config: {}", e),
            ConfigOrigin::Defaults => debug!("No config file found, using defaults"),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigOrigin::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigOrigin::Defaults)),
        Err(e) => Ok((Config::default(), ConfigOrigin::Unreadable(format!("{:#}", e)))),
    }
}
