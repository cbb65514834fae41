mod app;

use std::{
    env,
    fs::{self, OpenOptions},
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use gamesearch_core::{
    config::{self, AppConfig},
    FileResultCache, HttpSearchApi, SearchController, SharedLocation,
};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    let share_query = env::args().nth(1).unwrap_or_default();
    info!(api = %config.api_base_url, "starting game search");

    let api = HttpSearchApi::from_config(&config).context("failed to build search client")?;
    let cache = FileResultCache::new(config.cache_path());
    let location = SharedLocation::new();
    let controller = SearchController::new(
        Arc::new(api),
        cache,
        location.clone(),
        config.controller_settings(),
    );

    let mut app = app::GameSearchApp::new(controller, location);
    app.restore(&share_query);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("gamesearch.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the UI, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
