//! Stream pipeline
//!
//! A [`Stream`] owns the configuration, the pending queue, the dequeue
//! notifier and the encoding engine. Producers append from any task; one
//! caller at a time drains the queue with [`Stream::start`]:
//!
//! 1. Dequeue the head item (stop with [`Error::EmptyQueue`] when none is left)
//! 2. Fire the dequeue notification without waiting for it
//! 3. Build the engine arguments (item codec override, bitrate ladder, HLS options)
//! 4. Run the engine to completion with the item's bytes as input
//! 5. Stop with [`Error::Encode`] on failure, otherwise loop
//!
//! The queue lock is never held while the engine runs.

use crate::args::{effective_encoding, encoder_args};
use crate::audio::{Audio, AudioInfo};
use crate::config::StreamConfig;
use crate::encoder::{Encoder, FfmpegEncoder};
use crate::error::{Error, Result};
use crate::notifier::DequeueNotifier;
use crate::queue::AudioQueue;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Pipeline lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Constructed, never started
    Idle,
    /// Taking the next item off the queue
    Dequeuing,
    /// Handing the dequeue notification off
    Notifying,
    /// Waiting on the engine
    Encoding,
    /// Last run ended because the queue was empty
    Drained,
    /// Last run ended on an engine failure
    Failed,
}

impl PipelineState {
    /// True for the states a run ends in
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Drained | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Dequeuing => "dequeuing",
            PipelineState::Notifying => "notifying",
            PipelineState::Encoding => "encoding",
            PipelineState::Drained => "drained",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Debug events are opt-in per stream
macro_rules! stream_debug {
    ($stream:expr, $($arg:tt)+) => {
        if $stream.config.debug_logging {
            debug!($($arg)+);
        }
    };
}

/// Audio queue drained into HLS output by an encoding engine
///
/// Cloning yields another handle to the same stream.
#[derive(Clone)]
pub struct Stream {
    config: Arc<StreamConfig>,
    queue: AudioQueue,
    notifier: DequeueNotifier,
    encoder: Arc<dyn Encoder>,
    state: Arc<Mutex<PipelineState>>,
    running: Arc<AtomicBool>,
}

impl Stream {
    /// Create a stream encoding with the `ffmpeg` executable
    pub fn new(config: StreamConfig) -> Result<Self> {
        Self::with_encoder(config, Arc::new(FfmpegEncoder::default()))
    }

    /// Create a stream with a custom encoding engine
    ///
    /// Fails if the configuration is invalid; no stream is created then.
    pub fn with_encoder(config: StreamConfig, encoder: Arc<dyn Encoder>) -> Result<Self> {
        config.validate()?;

        let notifier = DequeueNotifier::new(config.dequeued_timeout, config.debug_logging);
        Ok(Self {
            config: Arc::new(config),
            queue: AudioQueue::new(),
            notifier,
            encoder,
            state: Arc::new(Mutex::new(PipelineState::Idle)),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Append an audio item at the back of the queue
    pub fn append(&self, audio: Audio) {
        let size = self.queue.append(audio);
        stream_debug!(self, queue_size = size, "queue size increased to {}", size);
    }

    /// Current queue length
    pub fn queue_size(&self) -> usize {
        self.queue.len()
    }

    /// Notifications of items leaving the queue
    ///
    /// Reading is optional. An event not received within the configured
    /// dequeued timeout is dropped.
    pub fn dequeued(&self) -> flume::Receiver<AudioInfo> {
        self.notifier.subscribe()
    }

    /// Current pipeline state
    pub fn state(&self) -> PipelineState {
        *self.state.lock()
    }

    /// True while a `start`/`drain` call is active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Drain the queue through the engine
    ///
    /// Returns only once the run is over: [`Error::EmptyQueue`] when every
    /// queued item has been encoded (the normal outcome), [`Error::Encode`]
    /// when the engine failed, or [`Error::AlreadyRunning`] when another call
    /// is draining this stream. After `EmptyQueue` more audio may be appended
    /// and the stream started again.
    pub async fn start(&self) -> Result<()> {
        let (_, err) = self.run().await;
        Err(err)
    }

    /// Like [`Stream::start`], but a drained queue is success
    ///
    /// Returns the number of items encoded by this run.
    pub async fn drain(&self) -> Result<usize> {
        match self.run().await {
            (processed, Error::EmptyQueue) => Ok(processed),
            (_, err) => Err(err),
        }
    }

    async fn run(&self) -> (usize, Error) {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return (0, Error::AlreadyRunning);
        }
        let _running = RunningGuard {
            running: &self.running,
            state: &self.state,
        };

        stream_debug!(self, "started to stream");
        let mut processed = 0;

        loop {
            self.set_state(PipelineState::Dequeuing);
            let audio = match self.queue.dequeue() {
                Ok(audio) => audio,
                Err(err) => {
                    self.set_state(PipelineState::Drained);
                    stream_debug!(self, processed, "queue drained");
                    return (processed, err);
                }
            };
            let (info, data) = audio.into_parts();
            stream_debug!(
                self,
                audio_id = info.id,
                queue_size = self.queue.len(),
                "dequeued {:?}, queue size is now {}",
                info.to_string(),
                self.queue.len()
            );

            self.set_state(PipelineState::Notifying);
            // Detached: delivery resolves on its own while we encode
            drop(self.notifier.notify(info.clone()));

            if let Some(encoding) = info.override_encoding.as_deref().filter(|e| !e.is_empty()) {
                stream_debug!(
                    self,
                    "overriding encoding, using {} instead of {}",
                    encoding,
                    self.config.encoding
                );
            }
            let args = encoder_args(&self.config, &info);
            stream_debug!(
                self,
                codec = effective_encoding(&self.config, &info),
                "executing ffmpeg with args: {:?}",
                args
            );

            self.set_state(PipelineState::Encoding);
            match self.encoder.encode(args, data).await {
                Ok(output) => {
                    processed += 1;
                    stream_debug!(self, "ffmpeg output: {}", String::from_utf8_lossy(&output));
                }
                Err(source) => {
                    self.set_state(PipelineState::Failed);
                    let output = String::from_utf8_lossy(source.output()).into_owned();
                    error!(
                        audio_id = info.id,
                        error = %source,
                        "failed to execute ffmpeg command for {}",
                        info
                    );
                    return (
                        processed,
                        Error::Encode {
                            audio: info.to_string(),
                            output,
                            source,
                        },
                    );
                }
            }
        }
    }

    fn set_state(&self, state: PipelineState) {
        *self.state.lock() = state;
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("config", &self.config)
            .field("queue_size", &self.queue.len())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Clears the running flag when a run ends, including when its future is dropped
struct RunningGuard<'a> {
    running: &'a AtomicBool,
    state: &'a Mutex<PipelineState>,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        {
            let mut state = self.state.lock();
            if !state.is_terminal() {
                info!("stream run cancelled while {}", *state);
                *state = PipelineState::Idle;
            }
        }
        self.running.store(false, Ordering::SeqCst);
    }
}
