//! Health check endpoint
//!
//! Reports liveness together with the build identity stamped by `build.rs`
//! and a snapshot of the pipeline.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use hls_audio::PipelineState;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct BuildIdentity {
    pub git_hash: &'static str,
    pub built_at: &'static str,
    pub profile: &'static str,
}

/// Build identity of the running binary
pub const BUILD: BuildIdentity = BuildIdentity {
    git_hash: env!("GIT_HASH"),
    built_at: env!("BUILD_TIMESTAMP"),
    profile: env!("BUILD_PROFILE"),
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub build: BuildIdentity,
    pub pipeline: PipelineState,
    pub queue_size: usize,
}

/// GET /health
///
/// `status` is `degraded` after an engine failure until the next run ends
/// cleanly; the server itself keeps answering either way.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let pipeline = state.stream.state();
    Json(HealthResponse {
        status: if pipeline == PipelineState::Failed { "degraded" } else { "ok" },
        module: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        build: BUILD,
        pipeline,
        queue_size: state.stream.queue_size(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
