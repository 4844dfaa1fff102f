use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Timed piece of text as delivered by a caption track or the speech model.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    pub text: String,
    pub start: f64,    // seconds
    pub duration: f64, // seconds
}

impl RawFragment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration.max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: String,
    pub tag: String,
    #[serde(default)]
    pub morph: BTreeMap<String, String>,
    pub start_char: usize,
    pub end_char: usize,
    pub is_punct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start: f64, // seconds
    pub end: f64,   // seconds
    #[serde(default)]
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            tokens: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub video_id: String,
    pub language: String,
    pub sentences: Vec<Sentence>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_end_ignores_negative_duration() {
        let fragment = RawFragment::new("salut", 2.0, -1.0);
        assert_eq!(fragment.end(), 2.0);
    }

    #[test]
    fn response_serializes_with_wire_names() {
        let response = TranscriptResponse {
            video_id: "abc".to_string(),
            language: "fr".to_string(),
            sentences: vec![Sentence::new("Bonjour.", 0.0, 1.0)],
        };

        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["video_id"], "abc");
        assert_eq!(value["sentences"][0]["text"], "Bonjour.");
        assert_eq!(value["sentences"][0]["end"], 1.0);
        assert!(value["sentences"][0]["tokens"].as_array().unwrap().is_empty());
    }
}
