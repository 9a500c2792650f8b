//! LocDash - location analytics dashboard
//!
//! Joins the built-in location and business metadata datasets, derives
//! per-category counts and ratings, the most reviewed location, a ratings
//! chart and map markers, and renders them as a report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, dataset or write failure)

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use dataset::Dataset;
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
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

    // Config is loaded before logging so `[general] verbose` can apply
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("LocDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run_dashboard(&config) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .locdash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("{} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize titles, fallback text, map and chart settings.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` directives take precedence over the computed level. Logs go
/// to stderr so stdout carries only the report.
fn init_logging(args: &Args, config: &Config) {
    let level = LevelFilter::from_level(args.log_level(config.general.verbose));
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Compute the dashboard once and write the report.
fn run_dashboard(config: &Config) -> Result<()> {
    let dataset = Dataset::builtin().context("Built-in dataset is invalid")?;
    info!(
        "Loaded {} locations and {} metadata records",
        dataset.locations().len(),
        dataset.metadata().len()
    );

    let data = analysis::compute_dashboard_data(dataset.locations(), dataset.metadata());
    let report = report::build_report(&dataset, data, config);

    if report.metadata.unmatched_metadata > 0 {
        debug!(
            "{} metadata records have no matching location",
            report.metadata.unmatched_metadata
        );
    }

    let output = match config.general.format {
        OutputFormat::Text => report::generate_text_report(&report, &config.display),
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.display),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Geojson => {
            report::generate_geojson(&report.data.markers, &report.map.icons, &config.display)?
        }
    };

    match &config.general.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(output.as_bytes())
                .context("Failed to write report to stdout")?;
            stdout.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

/// Where the effective configuration came from.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    /// The default file exists but could not be loaded.
    Invalid(anyhow::Error),
}

impl ConfigSource {
    /// Report the source once logging is up.
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Invalid(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Invalid(e))),
    }
}
