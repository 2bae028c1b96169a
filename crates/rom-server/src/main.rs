//! ROM analysis server binary.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rom_core::AnalysisConfig;
use rom_server::{create_router, AppState};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "rom-server", about = "Joint range-of-motion analysis server", version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "ROM_HOST", default_value = "0.0.0.0")]
    host: String,

    /// HTTP and WebSocket port
    #[arg(long, env = "ROM_PORT", default_value = "8000")]
    port: u16,

    /// JSON analysis config; defaults are used when omitted
    #[arg(long, env = "ROM_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalysisConfig::from_json(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    config.validate().context("invalid analysis config")?;
    info!(
        smoothing_window = config.smoothing_window,
        session_ttl_secs = config.session_ttl_secs,
        "analysis config loaded"
    );

    let state = AppState::from_config(config);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("ROM server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to install CTRL+C handler");
                std::future::pending::<()>().await;
            }
            info!("Shutdown signal received");
        })
        .await
        .context("server error")?;

    Ok(())
}
