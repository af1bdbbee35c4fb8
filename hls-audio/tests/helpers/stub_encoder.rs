//! Recording stub engine

use async_trait::async_trait;
use hls_audio::{AudioData, EncodeError, Encoder};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;

/// One engine invocation as seen by the stub
#[derive(Debug, Clone)]
pub struct Invocation {
    pub args: Vec<String>,
    pub input: Vec<u8>,
}

impl Invocation {
    /// Value following `flag` in the argument list
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .windows(2)
            .find(|w| w[0] == flag)
            .map(|w| w[1].as_str())
    }
}

/// Engine stub recording its invocations
#[derive(Clone, Default)]
pub struct RecordingEncoder {
    invocations: Arc<Mutex<Vec<Invocation>>>,
    delay: Option<Duration>,
    /// Zero-based invocation index that fails
    fail_at: Option<usize>,
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `delay` for every invocation
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Exit non-zero on invocation `index`
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.invocations.lock().len()
    }

    /// Titles passed via `-metadata title=...`, in invocation order
    pub fn titles(&self) -> Vec<String> {
        self.invocations()
            .iter()
            .filter_map(|i| {
                i.arg_after("-metadata")
                    .map(|t| t.trim_start_matches("title=").to_string())
            })
            .collect()
    }
}

#[async_trait]
impl Encoder for RecordingEncoder {
    async fn encode(
        &self,
        args: Vec<String>,
        mut input: AudioData,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes).await?;

        let index = {
            let mut invocations = self.invocations.lock();
            invocations.push(Invocation { args, input: bytes });
            invocations.len() - 1
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_at == Some(index) {
            return Err(EncodeError::Exit {
                code: Some(1),
                output: b"pipe:: Invalid data found when processing input".to_vec(),
            });
        }

        Ok(format!("encoded invocation {}", index).into_bytes())
    }
}
