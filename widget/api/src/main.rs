//! Portfolio API - Logs, Counters and Now Playing
//!
//! Small HTTP service behind the portfolio site and its chat widget. It keeps
//! flat JSON logs of chat questions and answers, counts visits, proxies the
//! Spotify "now playing" card and serves the content JSON the site and the
//! widget read.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults (127.0.0.1:8080, content in ./data, logs in ./logs)
//! portfolio-api
//!
//! # Custom bind address and directories
//! portfolio-api --bind 0.0.0.0:3000 --content-dir ./data --store-dir /var/lib/portfolio
//!
//! # Verbose logging
//! RUST_LOG=debug portfolio-api
//! ```
//!
//! Spotify credentials are read from the environment or a `.env` file:
//! `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `SPOTIFY_REFRESH_TOKEN`.

mod routes;
mod spotify;
mod state;
mod store;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

use spotify::{SpotifyClient, SpotifyCredentials};
use state::AppState;
use store::JsonFileStore;

/// Portfolio API - chat logs, visit counter, Spotify now playing
#[derive(Parser, Debug)]
#[command(name = "portfolio-api")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on
    #[arg(short = 'b', long, env = "PORTFOLIO_API_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Directory of content JSON served under /data
    #[arg(long, env = "PORTFOLIO_CONTENT_DIR", default_value = "data", value_name = "DIR")]
    content_dir: PathBuf,

    /// Directory for the chat log, input log and visit counter
    /// (kept apart from the publicly served content)
    #[arg(long, env = "PORTFOLIO_STORE_DIR", default_value = "logs", value_name = "DIR")]
    store_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "PORTFOLIO_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("portfolio_api={level},tower_http={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Resolve on SIGTERM or SIGINT
async fn shutdown_signal() {
    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(term), Ok(int)) => (term, int),
        _ => {
            warn!("Failed to install signal handlers, falling back to Ctrl-C");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, initiating shutdown"),
        _ = sigint.recv() => info!("Received SIGINT, initiating shutdown"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in .env; a missing file is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    init_logging(&args.log_level);
    info!("Portfolio API starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let store_dir = args.store_dir;
    info!(content_dir = ?args.content_dir, store_dir = ?store_dir, "Directories");
    if store_dir == args.content_dir {
        warn!("Store shares the content directory; store files are still hidden from /data");
    }

    let spotify = SpotifyClient::new(SpotifyCredentials::from_env());
    if !spotify.is_configured() {
        warn!("Spotify proxy disabled; /api/spotify will report nothing playing");
    }

    let state = AppState::new(JsonFileStore::new(store_dir), spotify);
    let app = routes::app(state, &args.content_dir);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    info!(addr = %args.bind, "Portfolio API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server failed")?;

    info!("Portfolio API stopped cleanly");
    Ok(())
}
