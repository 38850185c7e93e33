//! HTTP trigger: one pipeline run per request.

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use techtweet_common::TriggerMode;
use techtweet_pipeline::{Pipeline, PublishOutcome, clock_day_now};

#[derive(Clone)]
pub struct AppState {
    pipeline: Pipeline,
}

impl AppState {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/tweet", get(trigger_post).post(trigger_post))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

/// Runs the whole pipeline. Request bodies are ignored; the day comes from
/// the clock so concurrent requests agree without shared state.
async fn trigger_post(State(state): State<AppState>) -> (StatusCode, Json<PublishOutcome>) {
    let day = clock_day_now(state.pipeline.settings().cycle_days);
    let outcome = state.pipeline.run_to_outcome(day, TriggerMode::Request).await;
    let status = if outcome.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(outcome))
}

pub async fn serve(pipeline: Pipeline, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(addr = %listener.local_addr()?, "server.listening");

    axum::serve(listener, router(AppState::new(pipeline)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("server.shutdown");
        })
        .await
        .context("serving HTTP")
}
