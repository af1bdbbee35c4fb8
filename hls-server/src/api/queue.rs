//! Queue endpoints
//!
//! - `GET /api/queue`: pipeline status and the item currently streaming
//! - `POST /api/queue`: open an audio file and append it to the queue
//!
//! Enqueued paths are confined to the media directory: relative paths are
//! taken from it, anything resolving outside it is refused with 403.

use std::collections::BTreeMap;
use std::path::PathBuf;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hls_audio::{Audio, PipelineState};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::media::{resolve_media_path, MediaPathError};
use crate::{AppState, NowPlaying};

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct QueueResponse {
    pub size: usize,
    pub state: PipelineState,
    pub running: bool,
    pub now_playing: Option<NowPlaying>,
}

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub path: PathBuf,
    pub artist: String,
    pub title: String,
    /// Codec for this item only
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub status: String,
    pub id: i64,
    pub queue_size: usize,
}

/// GET /api/queue
pub async fn get_queue(State(state): State<AppState>) -> Json<QueueResponse> {
    Json(QueueResponse {
        size: state.stream.queue_size(),
        state: state.stream.state(),
        running: state.stream.is_running(),
        now_playing: state.now_playing.read().clone(),
    })
}

/// POST /api/queue
pub async fn enqueue(
    State(state): State<AppState>,
    Json(req): Json<EnqueueRequest>,
) -> Result<Json<EnqueueResponse>, (StatusCode, Json<StatusResponse>)> {
    info!("Enqueue request for file: {}", req.path.display());

    let path = match resolve_media_path(&state.media_dir, &req.path).await {
        Ok(path) => path,
        Err(e) => {
            let status = match &e {
                MediaPathError::Forbidden(_) => StatusCode::FORBIDDEN,
                MediaPathError::NotFound(_) => StatusCode::NOT_FOUND,
                MediaPathError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!("Rejected enqueue request: {}", e);
            return Err((
                status,
                Json(StatusResponse {
                    status: format!("error: {}", e),
                }),
            ));
        }
    };

    let id = state.next_id();
    let audio = match Audio::open(id, req.artist, req.title, &path).await {
        Ok(audio) => audio.with_metadata(req.metadata),
        Err(e) => {
            error!("Failed to open {}: {}", path.display(), e);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: format!("error: {}", e),
                }),
            ));
        }
    };
    let audio = match req.encoding {
        Some(encoding) if !encoding.is_empty() => audio.with_encoding(encoding),
        _ => audio,
    };

    let queue_size = state.enqueue(audio);
    info!("Enqueued item {}, queue size is now {}", id, queue_size);

    Ok(Json(EnqueueResponse {
        status: "ok".to_string(),
        id,
        queue_size,
    }))
}
