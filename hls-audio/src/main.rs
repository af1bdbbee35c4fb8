//! hls-audio - command-line HLS packager
//!
//! Enqueues the given audio files, prints each one as it leaves the queue and
//! drains the queue through ffmpeg into HLS segments and playlists.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use hls_audio::{Audio, FfmpegEncoder, Stream, StreamSettings};
use hls_common::config::{load_or_default, ConfigResolver};
use hls_common::logging::{init_tracing, LoggingConfig};
use serde::Deserialize;
use tokio::signal;
use tracing::{info, warn};

/// Command-line arguments for hls-audio
#[derive(Parser, Debug)]
#[command(name = "hls-audio")]
#[command(about = "Package audio files into adaptive bitrate HLS with ffmpeg")]
#[command(version)]
struct Args {
    /// Audio files to enqueue, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long, env = "HLS_AUDIO_CONFIG")]
    config: Option<PathBuf>,

    /// Bitrate ladder, comma separated (e.g. 128k,64k)
    #[arg(short, long, value_delimiter = ',')]
    bitrates: Option<Vec<String>>,

    /// Default audio codec
    #[arg(long)]
    encoding: Option<String>,

    /// Segment duration in seconds
    #[arg(long)]
    hls_time: Option<u32>,

    /// Number of segments kept in each playlist
    #[arg(long)]
    hls_list_size: Option<u32>,

    /// Segment file template (%v = variant, %06d = segment number)
    #[arg(long)]
    segment_filename: Option<String>,

    /// Variant playlist template (%v = variant)
    #[arg(long)]
    playlist_name: Option<String>,

    /// Master playlist file name (no directory)
    #[arg(long)]
    master_playlist_name: Option<String>,

    /// How long a dequeue notification waits for a reader
    #[arg(long)]
    dequeued_timeout_ms: Option<u64>,

    /// Directory the HLS output is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// ffmpeg executable
    #[arg(long, env = "HLS_AUDIO_FFMPEG")]
    ffmpeg: Option<String>,

    /// Verbose pipeline logging
    #[arg(short, long)]
    debug: bool,
}

/// Config file layout
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    stream: StreamSettings,
    #[serde(default)]
    logging: LoggingConfig,
}

impl Args {
    /// CLI values override the config file
    fn apply(&self, settings: &mut StreamSettings) {
        if let Some(bitrates) = &self.bitrates {
            settings.bitrates = bitrates.clone();
        }
        if let Some(encoding) = &self.encoding {
            settings.encoding = encoding.clone();
        }
        if let Some(hls_time) = self.hls_time {
            settings.hls_time = hls_time;
        }
        if let Some(hls_list_size) = self.hls_list_size {
            settings.hls_list_size = hls_list_size;
        }
        if let Some(segment_filename) = &self.segment_filename {
            settings.segment_filename = segment_filename.clone();
        }
        if let Some(playlist_name) = &self.playlist_name {
            settings.playlist_name = playlist_name.clone();
        }
        if let Some(master_playlist_name) = &self.master_playlist_name {
            settings.master_playlist_name = master_playlist_name.clone();
        }
        if let Some(timeout) = self.dequeued_timeout_ms {
            settings.dequeued_timeout_ms = timeout;
        }
        if let Some(ffmpeg) = &self.ffmpeg {
            settings.ffmpeg_path = ffmpeg.clone();
        }
        if self.debug {
            settings.debug_logging = true;
        }
    }
}

/// `Artist - Title.mp3` → ("Artist", "Title"); otherwise the stem is the title
fn artist_and_title(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    match stem.split_once(" - ") {
        Some((artist, title)) => (artist.trim().to_string(), title.trim().to_string()),
        None => ("Unknown Artist".to_string(), stem),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = ConfigResolver::new().resolve(args.config.as_deref());
    let file_config: FileConfig =
        load_or_default(config_path.as_deref()).context("Failed to load config file")?;

    let mut settings = file_config.stream;
    args.apply(&mut settings);

    init_tracing(&file_config.logging, settings.debug_logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting hls-audio v{} with bitrates {:?}",
        env!("CARGO_PKG_VERSION"),
        settings.bitrates
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    let mut encoder = FfmpegEncoder::new(settings.ffmpeg_path.clone());
    if let Some(dir) = &args.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        info!("Output directory: {}", dir.display());
        encoder = encoder.with_working_dir(dir);
    }

    let stream = Stream::with_encoder(settings.into_config(), Arc::new(encoder))
        .context("Invalid stream configuration")?;

    for (i, path) in args.files.iter().enumerate() {
        let (artist, title) = artist_and_title(path);
        let audio = Audio::open(i as i64 + 1, artist, title, path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        stream.append(audio);
    }

    let dequeued = stream.dequeued();
    let watcher = stream.clone();
    tokio::spawn(async move {
        while let Ok(audio) = dequeued.recv_async().await {
            println!(
                "dequeued {:?}, {} left in the queue",
                audio.to_string(),
                watcher.queue_size()
            );
        }
    });

    tokio::select! {
        result = stream.drain() => {
            let processed = result.context("Streaming failed")?;
            info!("Finished streaming {} item(s)", processed);
        }
        _ = shutdown_signal() => {
            warn!("Interrupted with {} item(s) left in the queue", stream.queue_size());
        }
    }

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
