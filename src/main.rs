// src/main.rs

use std::path::PathBuf;

use anyhow::Result;
use barista::BaristaApp;
use barista_config::{BaristaConfig, ConfigLoader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration under a bootstrap logger
    let config = tracing::subscriber::with_default(bootstrap_logger(), load_config)?;

    // Initialize logging
    init_logging(&config.app.log_level)?;

    info!("Starting barista v{}", env!("CARGO_PKG_VERSION"));

    let mut app = BaristaApp::new(config)?;
    app.run().await?;

    info!("Barista shut down successfully");
    Ok(())
}

fn default_filter(level: &str) -> String {
    format!("barista={0},{0}", level)
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into())
}

fn bootstrap_logger() -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(std::io::stderr)
        .finish()
}

fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn load_config() -> Result<BaristaConfig> {
    let path = std::env::var("BARISTA_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/barista.toml"));

    Ok(ConfigLoader::load(&path)?)
}
