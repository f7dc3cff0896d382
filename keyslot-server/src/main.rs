use anyhow::{Context, Result};
use clap::Parser;
use keyslot_server::logging::init_tracing;
use keyslot_server::{AppState, ServerConfig, create_router};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "keyslot-server")]
#[command(about = "Keyslot - Redis Cluster slot and topology calculator", long_about = None)]
struct Args {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listen host
    #[arg(long)]
    host: Option<String>,

    /// Override listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.logging)?;

    info!("Starting Keyslot Server v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(config.topology_generator());
    let app = create_router(state, &config.rest.prefix);

    let addr = config.server_addr();
    info!("Listening on http://{} (routes under {})", addr, config.rest.prefix);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
