//! Test helper modules for hls-audio integration tests
//!
//! Provides stand-ins for the external encoding engine:
//! - RecordingEncoder: records every invocation, optionally slow or failing
//! - ManifestEncoder: writes HLS master/variant playlists the way ffmpeg lays them out

#![allow(dead_code)]

pub mod manifest_encoder;
pub mod stub_encoder;

pub use manifest_encoder::ManifestEncoder;
pub use stub_encoder::{Invocation, RecordingEncoder};

use hls_audio::Audio;

/// Small in-memory audio item titled `Track <id>`
pub fn audio(id: i64) -> Audio {
    Audio::from_bytes(id, "Artist", format!("Track {}", id), format!("bytes-{}", id))
}
