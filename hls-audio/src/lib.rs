//! # HLS Audio Stream Scheduler (hls-audio)
//!
//! Queues audio sources and packages them, one at a time, into adaptive
//! bitrate HLS output with an external encoding engine (ffmpeg).
//!
//! **Architecture:**
//! - [`AudioQueue`]: insertion-ordered work queue shared by any number of producers
//! - [`DequeueNotifier`]: best-effort, timeout-bounded "item left the queue" events
//! - [`args`]: bitrate ladder and HLS options turned into engine arguments
//! - [`Encoder`]: injectable engine seam, [`FfmpegEncoder`] in production
//! - [`Stream`]: the sequential pipeline tying them together
//!
//! ```rust,ignore
//! use hls_audio::{Audio, Stream, StreamConfig};
//!
//! let stream = Stream::new(StreamConfig::new(["128k", "64k"]))?;
//! stream.append(Audio::open(1, "Foo", "Bar", "song.mp3").await?);
//!
//! let dequeued = stream.dequeued();
//! tokio::spawn(async move {
//!     while let Ok(audio) = dequeued.recv_async().await {
//!         println!("now streaming {}", audio);
//!     }
//! });
//!
//! match stream.start().await {
//!     Err(e) if e.is_empty_queue() => println!("all done"),
//!     other => other?,
//! }
//! ```

pub mod args;
pub mod audio;
pub mod config;
pub mod encoder;
pub mod error;
pub mod notifier;
pub mod queue;
pub mod stream;

pub use audio::{Audio, AudioData, AudioInfo};
pub use config::{StreamConfig, StreamSettings};
pub use encoder::{EncodeError, Encoder, FfmpegEncoder};
pub use error::{Error, Result};
pub use notifier::{Delivery, DequeueNotifier};
pub use queue::AudioQueue;
pub use stream::{PipelineState, Stream};
