//! hls-server library - HLS file server driving a stream pipeline
//!
//! Serves the HLS output directory over HTTP and accepts new audio for the
//! queue. Two background tasks run beside the router:
//! - [`pump::spawn_pump`] keeps draining the queue whenever work is added
//! - [`watcher::spawn_watcher`] records the item currently being streamed

use std::path::PathBuf;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use hls_audio::Stream;
use parking_lot::RwLock;
use tokio::sync::Notify;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod config;
pub mod media;
pub mod pump;
pub mod watcher;

pub use watcher::NowPlaying;

/// Application state shared across HTTP handlers and background tasks
#[derive(Clone)]
pub struct AppState {
    pub stream: Stream,
    /// Directory served under `/assets`
    pub assets_dir: PathBuf,
    /// Root of the files `POST /api/queue` may open
    pub media_dir: PathBuf,
    /// Last item handed to the engine
    pub now_playing: Arc<RwLock<Option<NowPlaying>>>,
    /// Wakes the pump after an append
    pub pump: Arc<Notify>,
    next_id: Arc<AtomicI64>,
}

impl AppState {
    pub fn new(
        stream: Stream,
        assets_dir: impl Into<PathBuf>,
        media_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            stream,
            assets_dir: assets_dir.into(),
            media_dir: media_dir.into(),
            now_playing: Arc::new(RwLock::new(None)),
            pump: Arc::new(Notify::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Identifier for the next enqueued item
    pub fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Append to the queue and make sure the pipeline picks it up
    pub fn enqueue(&self, audio: hls_audio::Audio) -> usize {
        self.stream.append(audio);
        self.pump.notify_one();
        self.stream.queue_size()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/queue", get(api::get_queue).post(api::enqueue))
        .merge(api::health_routes())
        .nest_service("/assets", ServeDir::new(&state.assets_dir))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
