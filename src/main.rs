use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

use job_tracker::api::job::JobService;
use job_tracker::config;
use job_tracker::http::HttpJobStore;
use job_tracker::shutdown::run_until_interrupted;

mod cli;
mod commands;

use crate::cli::Cli;

/// Console output goes to stderr so it never mixes with tables on stdout.
/// Files rotate daily: logs/info.log.2024-12-22, logs/error.log.2024-12-22, ...
fn init_tracing(log_dir: &str) {
    let console_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    let info_file = tracing_appender::rolling::daily(log_dir, "info.log");
    let error_file = tracing_appender::rolling::daily(log_dir, "error.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(info_layer)
        .with(error_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment, then apply command-line overrides
    let mut config = config::Config::from_env().map_err(anyhow::Error::msg)?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url).map_err(anyhow::Error::msg)?;
    }

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory {}", config.log_dir))?;
    init_tracing(&config.log_dir);

    info!("Starting job-tracker");
    info!("  - API URL: {}", config.api_url);
    info!("  - Request timeout: {:?}", config.request_timeout);
    info!("  - Max import size: {} bytes", config.max_import_size);

    let store = HttpJobStore::new(&config.api_url, config.request_timeout)?;
    let service = JobService::new(Arc::new(store));

    match run_until_interrupted(commands::run(cli.command, service, &config)).await {
        Ok(result) => result,
        Err(interrupted) => {
            eprintln!("{}", interrupted);
            Ok(())
        }
    }
}
