//! Best-effort "item left the queue" notifications
//!
//! Events go through a rendezvous channel: an event is only handed over to an
//! observer that is actively receiving. Each delivery runs on its own task and
//! races the configured timeout; when no observer takes the event in time the
//! pending send is withdrawn and the event is dropped. Reading notifications is
//! optional and the pipeline never waits on a delivery.

use crate::audio::AudioInfo;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Outcome of a single delivery attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// An observer received the event
    Delivered,
    /// Nobody received the event before the timeout; it was dropped
    TimedOut,
    /// Every receiver is gone
    Closed,
}

/// Publishes dequeued items to optional observers
#[derive(Clone)]
pub struct DequeueNotifier {
    tx: flume::Sender<AudioInfo>,
    rx: flume::Receiver<AudioInfo>,
    timeout: Duration,
    debug_logging: bool,
}

impl DequeueNotifier {
    /// Create a notifier dropping events not taken within `timeout`
    pub fn new(timeout: Duration, debug_logging: bool) -> Self {
        let (tx, rx) = flume::bounded(0);
        Self {
            tx,
            rx,
            timeout,
            debug_logging,
        }
    }

    /// Event source of dequeued items
    ///
    /// Every receiver shares the same source; each event goes to one of them.
    pub fn subscribe(&self) -> flume::Receiver<AudioInfo> {
        self.rx.clone()
    }

    /// Delivery timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Start delivering `audio` without waiting for the outcome
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify(&self, audio: AudioInfo) -> JoinHandle<Delivery> {
        let tx = self.tx.clone();
        let timeout = self.timeout;
        let debug_logging = self.debug_logging;

        tokio::spawn(async move {
            let id = audio.id;
            match tokio::time::timeout(timeout, tx.send_async(audio)).await {
                Ok(Ok(())) => Delivery::Delivered,
                // Unreachable while the notifier holds its own receiver
                Ok(Err(_)) => Delivery::Closed,
                Err(_) => {
                    if debug_logging {
                        debug!(audio_id = id, ?timeout, "timed out sending to dequeued channel");
                    }
                    Delivery::TimedOut
                }
            }
        })
    }
}

impl std::fmt::Debug for DequeueNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DequeueNotifier")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
