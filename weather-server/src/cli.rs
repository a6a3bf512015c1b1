use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::info;

use weather_core::{
    Config, SearchLogger, WeatherService,
    search_log::SqliteSearchLog,
};

use crate::http::{AppState, create_router};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather aggregation HTTP service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server.
    Serve {
        /// Config file to use instead of the platform default.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on; overrides config and `PORT`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store the geocoding API key and search log database in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { config, port } => serve(config, port).await,
            Command::Configure => configure(),
        }
    }
}

async fn serve(config_path: Option<PathBuf>, port: Option<u16>) -> anyhow::Result<()> {
    let mut config = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    if let Some(port) = port {
        config.server.port = port;
    }
    config.validate()?;

    let logger = match config.search_log_url() {
        Some(url) => {
            let store = SqliteSearchLog::connect(url)
                .await
                .with_context(|| format!("Failed to open search log database: {url}"))?;
            let existing = store.count().await.context("Failed to read search log")?;
            info!(entries = existing, "search log opened");
            SearchLogger::new(Arc::new(store))
        }
        None => {
            info!("search logging disabled (no search_log.database_url)");
            SearchLogger::disabled()
        }
    };

    let search_log = logger.is_enabled();
    let service = WeatherService::from_config(&config, logger)?;
    let settings = service.settings();
    info!(
        search_log,
        forecast_days = settings.forecast_days,
        daily_window = ?settings.daily_window,
        timeout = ?settings.upstream_timeout,
        "weather service configured"
    );
    let state = AppState::new(Arc::new(service), config.server.port);
    let app = create_router(state, config.server.static_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server host/port")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("geocode.maps.co API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_geocode_api_key(api_key.trim().to_string());
    }

    let current_url = config.search_log.database_url.clone().unwrap_or_default();
    let database_url = inquire::Text::new("Search log database URL (empty to disable):")
        .with_default(&current_url)
        .prompt()
        .context("Failed to read database URL")?;
    config.search_log.database_url =
        Some(database_url.trim().to_string()).filter(|u| !u.is_empty());

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());

    Ok(())
}
