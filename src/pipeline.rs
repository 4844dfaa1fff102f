//! Acquisition orchestrator: turns a video URL into a transcript through
//! either published captions or local speech recognition.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use crate::captions::CaptionSource;
use crate::captions::youtube::YoutubeCaptions;
use crate::clean::clean;
use crate::config::AppConfig;
use crate::download::{AudioDownloader, YtDlp};
use crate::error::{Result, TranscriptError};
use crate::merge::merge;
use crate::nlp::{self, Analyzer, annotate};
use crate::speech::{self, SpeechRecognizer};
use crate::transcript::{RawFragment, TranscriptResponse};
use crate::video_id::extract_video_id;

const DEFAULT_LANGUAGE: &str = "fr";
const DEFAULT_MODEL_SIZE: &str = "small";
const UNKNOWN_LANGUAGE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    #[serde(alias = "youtube")]
    Captions,
    #[serde(alias = "whisper")]
    Speech,
}

impl std::str::FromStr for Engine {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "captions" | "youtube" => Ok(Engine::Captions),
            "speech" | "whisper" => Ok(Engine::Speech),
            _ => anyhow::bail!("Unknown engine '{}', expected captions or speech", s),
        }
    }
}

fn default_language() -> Option<String> {
    Some(DEFAULT_LANGUAGE.to_string())
}

fn default_model_size() -> String {
    DEFAULT_MODEL_SIZE.to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscriptRequest {
    pub url: String,
    #[serde(default, alias = "engie")]
    pub engine: Engine,
    /// `null` lets the engine pick or detect the language.
    #[serde(default = "default_language")]
    pub language: Option<String>,
    #[serde(default = "default_model_size")]
    pub model_size: String,
}

impl TranscriptRequest {
    pub fn new(url: impl Into<String>, engine: Engine) -> Self {
        Self {
            url: url.into(),
            engine,
            language: default_language(),
            model_size: default_model_size(),
        }
    }
}

pub struct Pipeline {
    captions: Arc<dyn CaptionSource>,
    downloader: Arc<dyn AudioDownloader>,
    recognizer: Arc<dyn SpeechRecognizer>,
    analyzer: Arc<dyn Analyzer>,
}

impl Pipeline {
    pub fn new(
        captions: Arc<dyn CaptionSource>,
        downloader: Arc<dyn AudioDownloader>,
        recognizer: Arc<dyn SpeechRecognizer>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            captions,
            downloader,
            recognizer,
            analyzer,
        }
    }

    pub fn from_config(conf: &AppConfig) -> anyhow::Result<Self> {
        let captions =
            YoutubeCaptions::new(&conf.captions).context("Failed to create caption source")?;
        let analyzer = nlp::analyzer(&conf.analyzer).context("Failed to create analyzer")?;

        Ok(Self::new(
            Arc::new(captions),
            Arc::new(YtDlp::new(&conf.download)),
            speech::recognizer(&conf.speech),
            analyzer,
        ))
    }

    pub async fn acquire(&self, request: TranscriptRequest) -> Result<TranscriptResponse> {
        match request.engine {
            Engine::Captions => self.captions(&request).await,
            Engine::Speech => self
                .speech(&request)
                .await
                .map_err(|e| TranscriptError::transcription_failed(format!("{:#}", e))),
        }
    }

    async fn captions(&self, request: &TranscriptRequest) -> Result<TranscriptResponse> {
        let video_id = extract_video_id(&request.url)?;

        let track = self
            .captions
            .fetch(&video_id, request.language.as_deref())
            .await?;
        log::info!(
            "fetched {} caption cues in '{}' for {}",
            track.fragments.len(),
            track.language,
            video_id
        );

        let language = track.language.clone();
        Ok(TranscriptResponse {
            video_id,
            language,
            sentences: track.into_sentences(),
        })
    }

    async fn speech(&self, request: &TranscriptRequest) -> anyhow::Result<TranscriptResponse> {
        let video_id = extract_video_id(&request.url)?;

        let downloader = Arc::clone(&self.downloader);
        let recognizer = Arc::clone(&self.recognizer);
        let url = request.url.clone();
        let language = request.language.clone();
        let model_size = request.model_size.clone();

        let (fragments, detected) = tokio::task::spawn_blocking(move || {
            recognize(
                downloader.as_ref(),
                recognizer.as_ref(),
                &url,
                language.as_deref(),
                &model_size,
            )
        })
        .await??;

        let sentences = merge(&fragments);
        log::info!(
            "merged {} fragments into {} sentences",
            fragments.len(),
            sentences.len()
        );

        let sentences = annotate(self.analyzer.as_ref(), sentences).await?;

        let language = detected
            .or_else(|| request.language.clone())
            .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());

        Ok(TranscriptResponse {
            video_id,
            language,
            sentences,
        })
    }
}

/// Download and recognize inside a scratch directory that is removed when
/// this returns, whatever the outcome.
fn recognize(
    downloader: &dyn AudioDownloader,
    recognizer: &dyn SpeechRecognizer,
    url: &str,
    language: Option<&str>,
    model_size: &str,
) -> anyhow::Result<(Vec<RawFragment>, Option<String>)> {
    let temp_dir = tempfile::tempdir().context("Failed to create temporary directory")?;

    let audio: PathBuf = downloader.download(url, temp_dir.path())?;

    let recognition = recognizer.transcribe(&audio, language, model_size)?;
    log::info!("recognized {} spans", recognition.spans.len());

    let fragments = recognition
        .spans
        .iter()
        .filter_map(|span| {
            let text = clean(&span.text);
            if text.is_empty() {
                None
            } else {
                Some(RawFragment::new(text, span.start, span.duration()))
            }
        })
        .collect();

    Ok((fragments, recognition.detected_language))
}
