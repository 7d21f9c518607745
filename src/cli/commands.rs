//! Command implementations for the FLIM summary CLI
//!
//! Sets up logging, resolves the layered configuration and hands over to
//! the summary processor.

use crate::cli::Args;
use crate::config::FlimConfig;
use crate::models::ProcessingStats;
use crate::processor::SummaryProcessor;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Main command execution entry point
///
/// 1. Set up logging
/// 2. Load configuration (defaults, config file, CLI flags)
/// 3. Run the import, summary and export pipeline
pub fn run(args: Args) -> Result<ProcessingStats> {
    setup_logging(&args)?;

    info!("Starting FLIM summary");
    debug!("Command line arguments: {:?}", args);

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let processor = SummaryProcessor::new(config).with_progress(args.show_progress());
    let stats = processor.process().with_context(|| {
        format!(
            "Failed to summarize {}",
            processor.config().root_path.display()
        )
    })?;

    info!(
        "Finished: {} measurements in {}ms",
        stats.measurements, stats.processing_time_ms
    );
    Ok(stats)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("flim_summary={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::ChronoLocal::new("%H:%M:%S".to_string()))
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration using layered approach (file -> args)
fn load_configuration(args: &Args) -> Result<FlimConfig> {
    match &args.config {
        Some(path) => info!("Using config file: {}", path.display()),
        None => match FlimConfig::default_config_path().filter(|path| path.exists()) {
            Some(path) => info!("Using config file: {}", path.display()),
            None => debug!("No config file found, using defaults"),
        },
    }

    let mut config =
        FlimConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    args.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    Ok(config)
}
