pub mod youtube;

use async_trait::async_trait;

use crate::error::Result;
use crate::transcript::{RawFragment, Sentence};

/// Caption track as published by the video platform.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub fragments: Vec<RawFragment>,
}

impl CaptionTrack {
    /// Cues are already sentence-like, so each becomes a sentence as-is.
    pub fn into_sentences(self) -> Vec<Sentence> {
        self.fragments
            .into_iter()
            .map(|f| {
                let end = f.end();
                Sentence::new(f.text, f.start, end)
            })
            .collect()
    }
}

#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch the caption track of a video, preferring `language` when given.
    ///
    /// Fails with `TranscriptUnavailable` when no suitable track exists.
    async fn fetch(&self, video_id: &str, language: Option<&str>) -> Result<CaptionTrack>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_cues_to_sentences() {
        let track = CaptionTrack {
            language: "fr".to_string(),
            fragments: vec![
                RawFragment::new("Bonjour à tous", 0.5, 2.0),
                RawFragment::new("et bienvenue", 2.5, 1.5),
            ],
        };

        let sentences = track.into_sentences();

        assert_eq!(
            sentences,
            vec![
                Sentence::new("Bonjour à tous", 0.5, 2.5),
                Sentence::new("et bienvenue", 2.5, 4.0),
            ]
        );
    }
}
