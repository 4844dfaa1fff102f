#[cfg_attr(not(feature = "whisper"), allow(dead_code))]
pub mod models;
#[cfg(feature = "whisper")]
pub mod whisper_cpp;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::config::SpeechConfig;

/// One recognized span, times in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedSpan {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl RecognizedSpan {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recognition {
    pub spans: Vec<RecognizedSpan>,
    pub detected_language: Option<String>,
}

pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe an audio file. `language` is a hint; `None` lets the model
    /// detect it.
    fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        model_size: &str,
    ) -> Result<Recognition>;
}

/// Recognizer used when the binary is built without the `whisper` feature.
#[cfg_attr(feature = "whisper", allow(dead_code))]
pub struct Unsupported;

impl SpeechRecognizer for Unsupported {
    fn transcribe(
        &self,
        _audio: &Path,
        _language: Option<&str>,
        _model_size: &str,
    ) -> Result<Recognition> {
        anyhow::bail!(
            "speech recognition is not available: this binary was built without the `whisper` feature"
        )
    }
}

#[cfg(feature = "whisper")]
pub fn recognizer(conf: &SpeechConfig) -> Arc<dyn SpeechRecognizer> {
    Arc::new(whisper_cpp::Whisper::new(conf.clone()))
}

#[cfg(not(feature = "whisper"))]
pub fn recognizer(_conf: &SpeechConfig) -> Arc<dyn SpeechRecognizer> {
    log::warn!("built without the `whisper` feature, speech engine is disabled");
    Arc::new(Unsupported)
}
