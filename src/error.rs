//! Error kinds surfaced by the transcript pipeline.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid video URL: {url}")]
    InvalidUrl { url: String },

    #[error("No transcript available for video {video_id}: {message}")]
    TranscriptUnavailable { video_id: String, message: String },

    #[error("{message}")]
    Download { message: String },

    #[error("Speech transcription failed: {message}")]
    TranscriptionFailed { message: String },

    #[error("Linguistic analysis failed: {message}")]
    Analyzer { message: String },
}

pub type Result<T> = std::result::Result<T, TranscriptError>;

impl TranscriptError {
    pub fn transcription_failed(err: impl std::fmt::Display) -> Self {
        TranscriptError::TranscriptionFailed {
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ErrorBody {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(self)).into_response()
    }
}

// Every failure kind is reported to clients the same way.
impl IntoResponse for TranscriptError {
    fn into_response(self) -> Response {
        ErrorBody::new(self.to_string()).into_response()
    }
}
