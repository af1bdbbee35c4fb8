//! # HLS Audio Common Library
//!
//! Shared code for the hls-audio binaries including:
//! - Common error type
//! - Configuration file resolution and TOML loading
//! - Logging configuration and tracing initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
