//! minedu-sessions - HTTP server entry point.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use minedu_sessions::server::purge_sessions;
use minedu_sessions::{AppState, Config, GeminiClient, LessonGenerator, SessionStore, router};

/// How often expired sessions are swept from the store.
const PURGE_PERIOD: Duration = Duration::from_secs(60);

const DEFAULT_LOG_FILTER: &str = "minedu_sessions=info,tower_http=info";

/// Serve the MINEDU lesson session generator.
#[derive(Parser, Debug)]
#[command(name = "minedu-sessions")]
#[command(about = "Generate MINEDU lesson sessions with Gemini and export them to Word")]
#[command(version)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 5010)]
    port: u16,

    /// Directory holding index.html and the UI assets
    #[arg(long, env = "STATIC_DIR", default_value = ".")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the environment may already be set.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    let client = GeminiClient::new(config.gemini.clone()).context("Failed to build Gemini client")?;
    let generator = LessonGenerator::new(Arc::new(client), config.model.clone(), config.retry);
    let store = SessionStore::new(config.session_ttl);

    tokio::spawn(purge_sessions(store.clone(), PURGE_PERIOD));

    let state = AppState {
        generator,
        store,
        static_dir: cli.static_dir.clone(),
    };

    let listener = TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", cli.host, cli.port))?;
    let addr = listener.local_addr().context("Failed to read bound address")?;

    tracing::info!(
        %addr,
        model = %config.model,
        max_attempts = config.retry.max_attempts,
        static_dir = %cli.static_dir.display(),
        "Listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
