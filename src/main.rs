use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use shorturl::ShortenerError;
use shorturl::config::StaticConfig;
use shorturl::services::Shortener;
use shorturl::storage::StorageFactory;
use shorturl::system::{ShutdownSignal, init_logging, listen_for_shutdown};

/// shorturl - URL shortener core service
#[derive(Parser)]
#[command(name = "shorturl")]
#[command(version)]
#[command(about = "URL shortener with cache and database storage", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', default_value = "config.toml")]
    config: String,

    /// Print a sample configuration and exit
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.generate_config {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    dotenvy::dotenv().ok();

    let config = match StaticConfig::load(&args.config).and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            process::exit(1);
        }
    };

    let log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            process::exit(1);
        }
    };

    let result = run(config).await;
    if let Err(e) = &result {
        error!("{}", e.format_simple());
        eprintln!("{}", e.format_colored());
    }

    // process::exit 不会执行析构，先刷新日志
    drop(log_guard);

    if result.is_err() {
        process::exit(1);
    }
    Ok(())
}

async fn run(config: StaticConfig) -> Result<(), ShortenerError> {
    let storage = StorageFactory::create(&config.storage).await?;
    let (shortener, worker) = Shortener::new(storage, &config.shortener)?;

    let shutdown = ShutdownSignal::new();
    let worker_handle = tokio::spawn(worker.run(shutdown.clone()));

    match shortener.storage_check().await {
        Ok(()) => info!("Storage health check passed"),
        Err(e) => warn!("Storage health check: {}", e),
    }

    info!("shorturl is running, press Ctrl+C to stop");
    listen_for_shutdown(shutdown).await;

    if let Err(e) = worker_handle.await {
        error!("Deletion queue task failed: {}", e);
    }

    shortener.close().await?;
    info!("Shutdown complete");
    Ok(())
}
