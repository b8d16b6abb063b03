//! admit-server - admissions training web service
//!
//! Trainees work through sections, answer knowledge checks, and record
//! spoken answers to parent scenarios for AI feedback. Managers register
//! trainees and review their progress.

use admit_common::config::{resolve_root_folder, RootFolder, TomlConfig, ROOT_FOLDER_ENV};
use admit_common::content::Catalog;
use admit_common::db::{init_database, settings};
use admit_server::api::BuildInfo;
use admit_server::config::{ServerConfig, DEFAULT_BIND, DEFAULT_PORT};
use admit_server::services::{AnthropicClient, AudioStore, WhisperClient};
use admit_server::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "admit-server")]
#[command(about = "Admissions training web service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "ADMIT_PORT")]
    port: u16,

    /// Address to bind
    #[arg(short, long, default_value = DEFAULT_BIND, env = "ADMIT_BIND")]
    bind: String,

    /// Root folder holding the database and recordings
    #[arg(short, long, env = ROOT_FOLDER_ENV)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "ADMIT_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "admit_server=info,admit_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting admit-server {}", BuildInfo::current());

    let args = Args::parse();

    let toml_config = TomlConfig::load_or_default(args.config.as_deref());
    let config = ServerConfig::from_toml(&toml_config);
    if config.manager_password.is_none() {
        warn!("Manager login is disabled until MANAGER_PASSWORD is set");
    }

    let root_folder = RootFolder::new(resolve_root_folder(
        args.root_folder.as_deref(),
        ROOT_FOLDER_ENV,
        &toml_config,
    ));
    root_folder
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    info!("Root folder: {}", root_folder.path().display());

    let db_path = root_folder.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database: {}", db_path.display());

    let session_secret = settings::load_or_init_session_secret(&pool)
        .await
        .context("Failed to load session secret")?;

    let catalog = Catalog::load(config.content_dir.as_deref()).context("Failed to load content")?;
    info!(
        "Loaded {} sections, {} assessment questions",
        catalog.total_sections(),
        catalog.total_questions()
    );

    let transcriber = Arc::new(
        WhisperClient::new(config.transcription.clone())
            .context("Failed to build transcription client")?,
    );
    let feedback = Arc::new(
        AnthropicClient::new(config.feedback.clone()).context("Failed to build feedback client")?,
    );
    let audio = AudioStore::new(root_folder.audio_dir());

    let state = AppState::new(
        pool,
        catalog,
        config,
        transcriber,
        feedback,
        audio,
        session_secret,
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", args.bind, args.port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
