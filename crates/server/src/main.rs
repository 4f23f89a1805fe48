use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use server::{build_service, create_app, AppState};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use toolforge_core::Config;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "toolforge-server", about = "Serve registered tools over HTTP")]
struct Args {
    /// Path to the TOML config file (defaults to $CONFIG_PATH or ./toolforge.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to run the server on
    #[arg(long)]
    port: Option<u16>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Ok(Config::load_from_env().unwrap_or_else(|e| {
            warn!("Could not load config ({:#}), using development defaults", e);
            Config::default()
        })),
    }
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }

    info!("Shutdown requested, cancelling in-flight tool calls");
    shutdown.cancel();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Starting toolforge server");

    let config = load_config(args.config.as_deref())?;

    let mut server_config = config.server.with_env_overrides()?;
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }

    let service = build_service(&config).context("Failed to build tool registry")?;
    let state = AppState::new(service);
    let shutdown = state.shutdown.clone();
    let app = create_app(state);

    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {address}"))?;

    info!("Server running on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server terminated with an error")?;

    Ok(())
}
