//! Encoding engine seam
//!
//! The pipeline only needs "run the engine with these arguments on this input
//! and tell me how it went". [`FfmpegEncoder`] is the production engine; tests
//! plug in their own [`Encoder`] implementations.

use crate::audio::AudioData;
use crate::config::DEFAULT_FFMPEG_PATH;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::warn;

/// Engine invocation errors
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The engine process could not be started
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran and exited unsuccessfully
    #[error("{}", exit_description(.code))]
    Exit {
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// Captured stdout followed by stderr
        output: Vec<u8>,
    },

    /// I/O failure while feeding or waiting on the engine
    #[error("I/O error while encoding: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Captured engine output, empty when the engine never produced any
    pub fn output(&self) -> &[u8] {
        match self {
            EncodeError::Exit { output, .. } => output,
            _ => &[],
        }
    }
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// External media-transcoding engine
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Run the engine once with `args`, piping `input` as its stdin
    ///
    /// Blocks (asynchronously) until the engine exits. Returns the captured
    /// combined output on success. "Combined" is all of stdout followed by
    /// all of stderr, not the two interleaved in the order they were written.
    async fn encode(&self, args: Vec<String>, input: AudioData) -> Result<Vec<u8>, EncodeError>;
}

/// Runs the `ffmpeg` executable as a subprocess
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: String,
    working_dir: Option<PathBuf>,
}

impl FfmpegEncoder {
    /// Use `program` (a path or a name looked up in PATH)
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            working_dir: None,
        }
    }

    /// Run the engine from `dir`, so relative output templates land there
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new(DEFAULT_FFMPEG_PATH)
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    async fn encode(
        &self,
        args: Vec<String>,
        mut input: AudioData,
    ) -> Result<Vec<u8>, EncodeError> {
        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| EncodeError::Launch {
            program: self.program.clone(),
            source,
        })?;

        // stdin is fed on its own task while stdout/stderr are collected
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::new(ErrorKind::BrokenPipe, "engine stdin unavailable"))?;
        let feeder = tokio::spawn(async move {
            let copied = tokio::io::copy(&mut input, &mut stdin).await;
            let _ = stdin.shutdown().await;
            copied
        });

        let output = child.wait_with_output().await?;

        match feeder.await {
            Ok(Ok(_)) => {}
            // The engine may stop reading before the end of the input
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {}
            Ok(Err(e)) => {
                if output.status.success() {
                    return Err(EncodeError::Io(e));
                }
                warn!(error = %e, "failed to feed audio into {}", self.program);
            }
            Err(e) => warn!(error = %e, "audio feeder task failed"),
        }

        // stdout then stderr
        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if output.status.success() {
            Ok(combined)
        } else {
            Err(EncodeError::Exit {
                code: output.status.code(),
                output: combined,
            })
        }
    }
}
