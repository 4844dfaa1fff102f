use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::error::ErrorBody;
use crate::pipeline::{Pipeline, TranscriptRequest};
use crate::transcript::TranscriptResponse;

#[derive(Clone)]
struct AppState {
    pipeline: Arc<Pipeline>,
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/api/transcript", post(transcript))
        .route("/health", get(health))
        .with_state(AppState { pipeline })
}

pub async fn serve(bind: &str, pipeline: Pipeline) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(pipeline)))
        .await
        .context("HTTP server stopped")?;
    Ok(())
}

async fn transcript(
    State(state): State<AppState>,
    payload: Result<Json<TranscriptRequest>, JsonRejection>,
) -> Result<Json<TranscriptResponse>, Response> {
    let Json(request) = payload.map_err(|rejection| {
        log::warn!("rejected request body: {}", rejection.body_text());
        ErrorBody::new(rejection.body_text()).into_response()
    })?;

    log::info!("transcript request: engine={:?} url={}", request.engine, request.url);

    match state.pipeline.acquire(request).await {
        Ok(response) => {
            log::info!(
                "returning {} sentences for {}",
                response.sentences.len(),
                response.video_id
            );
            Ok(Json(response))
        }
        Err(e) => {
            log::error!("transcript failed: {}", e);
            Err(e.into_response())
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
