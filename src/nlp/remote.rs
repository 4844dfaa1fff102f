//! Client for an external tagging service returning spaCy-shaped tokens.
//!
//! Request: `POST {url}` with `{"texts": [...], "model": "<language>"}`.
//! Response: one array of token records per text, in request order.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::AnalyzerConfig;
use crate::error::{Result, TranscriptError};
use crate::nlp::Analyzer;
use crate::transcript::Token;

const TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Deserialize)]
struct RemoteToken {
    text: String,
    lemma: String,
    pos: String,
    tag: String,
    #[serde(default)]
    morph: BTreeMap<String, String>,
    idx: usize, // character offset
    #[serde(default)]
    is_space: bool,
    #[serde(default)]
    is_punct: bool,
}

impl From<RemoteToken> for Token {
    fn from(t: RemoteToken) -> Self {
        let end_char = t.idx + t.text.chars().count();
        Token {
            text: t.text,
            lemma: t.lemma,
            pos: t.pos,
            tag: t.tag,
            morph: t.morph,
            start_char: t.idx,
            end_char,
            is_punct: t.is_punct,
        }
    }
}

pub struct RemoteAnalyzer {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl RemoteAnalyzer {
    pub fn new(conf: &AnalyzerConfig) -> anyhow::Result<Self> {
        let url = conf
            .url
            .clone()
            .context("analyzer.url is required for the remote backend")?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url,
            model: conf.language.clone(),
        })
    }

    async fn request(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<RemoteToken>>> {
        let body = json!({
            "texts": texts,
            "model": self.model,
        });

        let response = self.client.post(&self.url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("tagging service error ({}): {}", status, error_text);
        }

        response
            .json()
            .await
            .context("Failed to parse tagging service response")
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    async fn tag(&self, texts: &[String]) -> Result<Vec<Vec<Token>>> {
        log::debug!("tagging {} texts with {}", texts.len(), self.url);

        let docs = self
            .request(texts)
            .await
            .map_err(|e| TranscriptError::Analyzer {
                message: format!("{:#}", e),
            })?;

        Ok(docs
            .into_iter()
            .map(|doc| {
                doc.into_iter()
                    .filter(|t| !t.is_space)
                    .map(Token::from)
                    .collect()
            })
            .collect())
    }
}
