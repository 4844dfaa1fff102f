//! Token-level annotation of merged sentences.

pub mod remote;
pub mod rules;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AnalyzerBackend, AnalyzerConfig};
use crate::error::{Result, TranscriptError};
use crate::transcript::{Sentence, Token};

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Tag every text of the batch independently. The result holds one token
    /// list per input text, in input order, offsets relative to that text.
    async fn tag(&self, texts: &[String]) -> Result<Vec<Vec<Token>>>;
}

/// Populate `tokens` of every sentence, leaving text and timing untouched.
pub async fn annotate(
    analyzer: &dyn Analyzer,
    mut sentences: Vec<Sentence>,
) -> Result<Vec<Sentence>> {
    if sentences.is_empty() {
        return Ok(sentences);
    }

    let texts: Vec<String> = sentences.iter().map(|s| s.text.clone()).collect();
    let docs = analyzer.tag(&texts).await?;

    if docs.len() != sentences.len() {
        return Err(TranscriptError::Analyzer {
            message: format!(
                "expected {} tagged texts, got {}",
                sentences.len(),
                docs.len()
            ),
        });
    }

    for (sentence, doc) in sentences.iter_mut().zip(docs) {
        sentence.tokens = doc
            .into_iter()
            .filter(|token| !token.text.trim().is_empty())
            .collect();
    }

    Ok(sentences)
}

pub fn analyzer(conf: &AnalyzerConfig) -> anyhow::Result<Arc<dyn Analyzer>> {
    match conf.backend {
        AnalyzerBackend::Rules => Ok(Arc::new(rules::RuleAnalyzer::new(&conf.language))),
        AnalyzerBackend::Remote => Ok(Arc::new(remote::RemoteAnalyzer::new(conf)?)),
    }
}
