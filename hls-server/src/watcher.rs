//! Now-playing tracker fed by dequeue notifications

use std::sync::Arc;

use chrono::{DateTime, Utc};
use hls_audio::{AudioInfo, Stream};
use parking_lot::RwLock;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::info;

/// Item most recently handed to the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowPlaying {
    pub id: i64,
    pub artist: String,
    pub title: String,
    pub started_at: DateTime<Utc>,
}

impl NowPlaying {
    pub fn from_info(info: &AudioInfo) -> Self {
        Self {
            id: info.id,
            artist: info.artist.clone(),
            title: info.title.clone(),
            started_at: Utc::now(),
        }
    }
}

/// Spawn the watcher task
///
/// The watcher is always waiting on the notification channel, so no event is
/// dropped while it runs.
pub fn spawn_watcher(
    stream: &Stream,
    now_playing: Arc<RwLock<Option<NowPlaying>>>,
) -> JoinHandle<()> {
    let dequeued = stream.dequeued();
    tokio::spawn(async move {
        while let Ok(audio) = dequeued.recv_async().await {
            info!("Now streaming {} (id {})", audio, audio.id);
            *now_playing.write() = Some(NowPlaying::from_info(&audio));
        }
    })
}
