use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parla::{create_router, services, AppState, ArtifactStore, Config};
use tracing::info;

/// Two-party realtime voice translation service.
#[derive(Debug, Parser)]
#[command(name = "parla", version)]
struct Args {
    /// Path to the configuration file (without extension).
    #[arg(long, default_value = "config/parla")]
    config: String,

    /// Override the configured HTTP port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;
    let port = args.port.unwrap_or(cfg.service.http.port);

    info!("{} starting", cfg.service.name);

    let history_file = cfg
        .storage
        .save_history
        .then(|| PathBuf::from(&cfg.storage.history_file));
    let artifacts =
        ArtifactStore::open(&cfg.paths.audio_input, &cfg.paths.audio_output, history_file).await?;

    let pipeline = Arc::new(services::build_pipeline(&cfg, artifacts.clone())?);
    let state = AppState::new(pipeline, artifacts);

    let addr = format!("{}:{}", cfg.service.http.bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, create_router(state)).await?;

    Ok(())
}
