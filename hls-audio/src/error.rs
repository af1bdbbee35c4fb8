//! Error types for hls-audio
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use crate::encoder::EncodeError;
use thiserror::Error;

/// Main error type for hls-audio
#[derive(Error, Debug)]
pub enum Error {
    /// The master playlist name points into a directory
    ///
    /// ffmpeg writes the master playlist at the root of the HLS output, so the
    /// name must be a bare file name.
    #[error("master playlist cannot have a directory, it must be root. ffmpeg limitation")]
    MasterPlaylistDirectory,

    /// Any other invalid configuration, rejected at construction
    #[error("Configuration error: {0}")]
    Config(String),

    /// There are no more audio items to stream in the queue
    ///
    /// This is the normal way for the pipeline to finish. More audio can be
    /// appended and the pipeline started again afterwards.
    #[error("no audio in queue")]
    EmptyQueue,

    /// The pipeline is already being drained by another caller
    #[error("stream pipeline is already running")]
    AlreadyRunning,

    /// The encoding engine failed for an item; the pipeline run is over
    #[error("failed to process audio {audio} in ffmpeg: {output}: {source}")]
    Encode {
        /// `Artist - Title` of the failing item
        audio: String,
        /// Captured combined engine output
        output: String,
        #[source]
        source: EncodeError,
    },

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the pipeline stopped because the queue drained
    pub fn is_empty_queue(&self) -> bool {
        matches!(self, Error::EmptyQueue)
    }
}

/// Convenience Result type using hls-audio Error
pub type Result<T> = std::result::Result<T, Error>;
