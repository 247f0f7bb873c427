//! Song catalog server entry point.
//!
//! Startup order: configuration, logging, store bootstrap, HTTP serving.
//! A store that cannot be opened aborts the process.

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use songlib_api::SongApi;
use songlib_core::{
    core_version, init_logging, ConnectionParams, SongService, SqliteSongRepository,
};
use songlib_server::config::DEFAULT_ENV_FILE;
use songlib_server::{load_env_file, router, ServerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Song catalog HTTP server
#[derive(Parser, Debug)]
#[command(name = "songlib-server")]
#[command(about = "CRUD HTTP server for a catalog of songs")]
#[command(version)]
struct Cli {
    /// Env file to load; fails when given explicitly and missing
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Override SERVER_PORT
    #[arg(short, long)]
    port: Option<u16>,

    /// Override DB_NAME (`:memory:` for an in-memory store)
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.env_file {
        Some(path) => load_env_file(path, true)?,
        None => load_env_file(Path::new(DEFAULT_ENV_FILE), false)?,
    }

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = cli.port {
        config.bind.set_port(port);
    }
    if let Some(db) = cli.db.as_deref() {
        config.db =
            ConnectionParams::from_database_name(db).with_busy_timeout(config.db.busy_timeout);
    }

    init_logging(&config.log_level, config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;
    info!(
        "event=server_start module=server status=start version={} bind={} db_mode={}",
        core_version(),
        config.bind,
        config.db.mode()
    );

    let repo = SqliteSongRepository::initialize(&config.db)
        .context("failed to initialize song store")?;
    let api = Arc::new(SongApi::new(SongService::new(repo)));

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("event=server_start module=server status=ok bind={}", config.bind);

    axum::serve(listener, router(api))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=server_signal module=server status=error error={err}");
    }
}
