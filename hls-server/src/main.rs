//! hls-server - HLS file server with a background stream pipeline
//!
//! Packages queued audio into the assets directory with ffmpeg and serves
//! the playlists and segments from `/assets`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hls_audio::{Audio, FfmpegEncoder, Stream};
use hls_common::config::{load_or_default, ConfigResolver};
use hls_common::logging::init_tracing;
use hls_server::config::FileConfig;
use hls_server::{build_router, pump, watcher, AppState};
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for hls-server
#[derive(Parser, Debug)]
#[command(name = "hls-server")]
#[command(about = "Serve HLS audio packaged from a queue of files")]
#[command(version)]
struct Args {
    /// Audio files to enqueue at startup
    files: Vec<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long, env = "HLS_AUDIO_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "HLS_SERVER_PORT")]
    port: Option<u16>,

    /// HLS output directory served under /assets
    #[arg(short, long, env = "HLS_SERVER_ASSETS_DIR")]
    assets_dir: Option<PathBuf>,

    /// Directory `POST /api/queue` may read audio from
    #[arg(short, long, env = "HLS_SERVER_MEDIA_DIR")]
    media_dir: Option<PathBuf>,

    /// Verbose pipeline logging
    #[arg(short, long)]
    debug: bool,
}

fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = ConfigResolver::new().resolve(args.config.as_deref());
    let mut config: FileConfig =
        load_or_default(config_path.as_deref()).context("Failed to load config file")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = &args.assets_dir {
        config.server.assets_dir = dir.clone();
    }
    if let Some(dir) = &args.media_dir {
        config.server.media_dir = dir.clone();
    }
    if args.debug {
        config.stream.debug_logging = true;
    }

    init_tracing(&config.logging, config.stream.debug_logging)
        .context("Failed to initialize logging")?;

    // Build identification first, before anything that may fail
    info!(
        "Starting hls-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    let assets_dir = config.server.assets_dir.clone();
    tokio::fs::create_dir_all(&assets_dir)
        .await
        .with_context(|| format!("Failed to create assets directory {}", assets_dir.display()))?;
    info!("Assets directory: {}", assets_dir.display());

    let media_dir = config.server.media_dir.clone();
    tokio::fs::create_dir_all(&media_dir)
        .await
        .with_context(|| format!("Failed to create media directory {}", media_dir.display()))?;
    info!("Media directory: {}", media_dir.display());

    let encoder =
        FfmpegEncoder::new(config.stream.ffmpeg_path.clone()).with_working_dir(&assets_dir);
    let stream = Stream::with_encoder(config.stream.into_config(), Arc::new(encoder))
        .context("Invalid stream configuration")?;

    let state = AppState::new(stream.clone(), &assets_dir, &media_dir);
    watcher::spawn_watcher(&stream, state.now_playing.clone());
    pump::spawn_pump(stream.clone(), state.pump.clone());

    for path in &args.files {
        let audio = Audio::open(state.next_id(), "Unknown Artist", title_from_path(path), path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        state.enqueue(audio);
    }
    if !args.files.is_empty() {
        info!("Enqueued {} file(s) from the command line", args.files.len());
    }

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("hls-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if stream.queue_size() > 0 {
        warn!("Shut down with {} item(s) left in the queue", stream.queue_size());
    }
    info!("hls-server stopped");
    Ok(())
}

/// Ctrl+C / SIGTERM
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
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
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
