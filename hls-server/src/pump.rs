//! Background pipeline driver
//!
//! Waits for appends and re-invokes the pipeline until the queue is empty.
//! A drain can finish just as a producer appends; the queue size is checked
//! again after every `EmptyQueue` so that item is not left behind.

use std::sync::Arc;

use hls_audio::{Error, Stream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Outcome of one wake-up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// Queue fully drained
    Drained,
    /// Engine failed; remaining items wait for the next append
    Failed,
    /// Another caller is draining this stream
    Busy,
}

/// Drain the stream until nothing is left or a run fails
pub async fn pump_once(stream: &Stream) -> PumpOutcome {
    loop {
        match stream.start().await {
            Err(Error::EmptyQueue) => {
                if stream.queue_size() == 0 {
                    return PumpOutcome::Drained;
                }
            }
            Err(Error::AlreadyRunning) => {
                warn!("Pipeline already running, leaving queue to the active run");
                return PumpOutcome::Busy;
            }
            Err(e) => {
                error!(
                    "Pipeline stopped: {} ({} item(s) left in the queue)",
                    e,
                    stream.queue_size()
                );
                return PumpOutcome::Failed;
            }
            Ok(()) => {}
        }
    }
}

/// Spawn the pump task
///
/// Every `notify_one` on `wake` triggers one [`pump_once`]. A notification
/// arriving mid-run is kept and handled once the run ends.
pub fn spawn_pump(stream: Stream, wake: Arc<Notify>) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Pipeline pump started");
        loop {
            wake.notified().await;
            pump_once(&stream).await;
        }
    })
}
