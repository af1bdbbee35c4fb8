//! HTTP API handlers for hls-server

pub mod health;
pub mod queue;

pub use health::health_routes;
pub use queue::{enqueue, get_queue};
