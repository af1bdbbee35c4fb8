//! Pending audio queue
//!
//! Insertion-ordered buffer shared between any number of producers and the
//! single pipeline consumer. The lock is only held for the push or pop itself.

use crate::audio::Audio;
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// FIFO queue of audio items
///
/// Cloning shares the same underlying buffer.
#[derive(Clone, Default)]
pub struct AudioQueue {
    items: Arc<Mutex<VecDeque<Audio>>>,
}

impl AudioQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item at the back; returns the queue length after the insert
    pub fn append(&self, audio: Audio) -> usize {
        let mut items = self.items.lock();
        items.push_back(audio);
        items.len()
    }

    /// Remove the head item
    ///
    /// Fails with [`Error::EmptyQueue`] when nothing is pending; nothing is
    /// consumed in that case.
    pub fn dequeue(&self) -> Result<Audio> {
        self.items.lock().pop_front().ok_or(Error::EmptyQueue)
    }

    /// Current queue length
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Check if queue is empty
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl std::fmt::Debug for AudioQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioQueue").field("len", &self.len()).finish()
    }
}
