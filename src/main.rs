//! TSE Fetcher CLI application
//!
//! Command-line interface for downloading nationwide CSV files from the
//! Brazilian electoral court (TSE) open-data archive.

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use tse_fetcher::cli::{handle_cache, handle_datasets, handle_fetch, Cli, Commands};
use tse_fetcher::config::AppConfig;
use tse_fetcher::errors::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();
    let config = AppConfig::load(cli.global.config.clone()).await?;

    init_logging(&cli, &config);

    info!("TSE Fetcher v{} starting", env!("CARGO_PKG_VERSION"));
    config.log_source();

    match cli.command {
        Commands::Fetch(args) => {
            info!("Executing fetch command");
            handle_fetch(args, &config, cli.global.quiet).await
        }
        Commands::Datasets => handle_datasets(&config).await,
        Commands::Cache(args) => {
            info!("Executing cache command");
            handle_cache(args, &config).await
        }
    }
}

/// Initialize logging from CLI flags, falling back to the configured level
fn init_logging(cli: &Cli, config: &AppConfig) {
    let level = cli
        .log_level()
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| config.logging.level.clone());

    let mut filter = EnvFilter::from_default_env();
    match format!("tse_fetcher={}", level).parse() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(e) => eprintln!("Ignoring invalid log level '{}': {}", level, e),
    }

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(cli.global.very_verbose)
        .with_writer(std::io::stderr)
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
