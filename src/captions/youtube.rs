use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::captions::{CaptionSource, CaptionTrack};
use crate::config::CaptionsConfig;
use crate::error::TranscriptError;
use crate::transcript::RawFragment;

const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

#[derive(Debug, Clone, PartialEq)]
struct TrackInfo {
    base_url: String,
    language_code: String,
    generated: bool,
}

pub struct YoutubeCaptions {
    client: reqwest::Client,
    base_url: String,
}

impl YoutubeCaptions {
    pub fn new(conf: &CaptionsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(conf.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: conf.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn list_tracks(&self, video_id: &str) -> Result<Vec<TrackInfo>> {
        let url = format!("{}/youtubei/v1/player?prettyPrint=false", self.base_url);

        let body = json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("Player API error ({}): {}", status, error_text);
        }

        let player: Value = response.json().await?;

        let status = player["playabilityStatus"]["status"]
            .as_str()
            .unwrap_or("OK");
        if status != "OK" {
            let reason = player["playabilityStatus"]["reason"]
                .as_str()
                .unwrap_or("video is not playable");
            anyhow::bail!("{}", reason);
        }

        Ok(parse_tracks(&player))
    }

    async fn download_track(&self, track: &TrackInfo) -> Result<Vec<RawFragment>> {
        let url = json3_url(&track.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            anyhow::bail!("Timed text error ({}): {}", status, error_text);
        }

        let content = response.text().await?;
        parse_json3(&content)
    }
}

#[async_trait]
impl CaptionSource for YoutubeCaptions {
    async fn fetch(
        &self,
        video_id: &str,
        language: Option<&str>,
    ) -> crate::error::Result<CaptionTrack> {
        let unavailable = |message: String| TranscriptError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            message,
        };

        let tracks = self
            .list_tracks(video_id)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        log::debug!("found {} caption tracks for {}", tracks.len(), video_id);

        let track = select_track(&tracks, language).ok_or_else(|| {
            let available: Vec<&str> = tracks.iter().map(|t| t.language_code.as_str()).collect();
            match language {
                Some(lang) if !available.is_empty() => unavailable(format!(
                    "no captions in '{}' (available: {})",
                    lang,
                    available.join(", ")
                )),
                _ => unavailable("captions are disabled for this video".to_string()),
            }
        })?;

        log::info!(
            "fetching {} captions ({}) for {}",
            track.language_code,
            if track.generated { "generated" } else { "manual" },
            video_id
        );

        let fragments = self
            .download_track(track)
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if fragments.is_empty() {
            return Err(unavailable("caption track is empty".to_string()));
        }

        Ok(CaptionTrack {
            language: track.language_code.clone(),
            fragments,
        })
    }
}

fn parse_tracks(player: &Value) -> Vec<TrackInfo> {
    let Some(tracks) =
        player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"].as_array()
    else {
        return Vec::new();
    };

    tracks
        .iter()
        .filter_map(|track| {
            Some(TrackInfo {
                base_url: track["baseUrl"].as_str()?.to_string(),
                language_code: track["languageCode"].as_str()?.to_string(),
                generated: track["kind"].as_str() == Some("asr"),
            })
        })
        .collect()
}

/// Manual tracks win over generated ones; without a language the first
/// available track is used.
fn select_track<'a>(tracks: &'a [TrackInfo], language: Option<&str>) -> Option<&'a TrackInfo> {
    let matches = |t: &&TrackInfo| match language {
        Some(lang) => t.language_code == lang || t.language_code.starts_with(&format!("{lang}-")),
        None => true,
    };

    tracks
        .iter()
        .filter(matches)
        .find(|t| !t.generated)
        .or_else(|| tracks.iter().filter(matches).find(|t| t.generated))
}

fn json3_url(base_url: &str) -> String {
    let (path, query) = base_url.split_once('?').unwrap_or((base_url, ""));

    let mut params: Vec<&str> = query
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("fmt="))
        .collect();
    params.push("fmt=json3");

    format!("{}?{}", path, params.join("&"))
}

fn parse_json3(content: &str) -> Result<Vec<RawFragment>> {
    let doc: Value = serde_json::from_str(content).context("Failed to parse timed text")?;
    let events = doc["events"]
        .as_array()
        .ok_or_else(|| anyhow!("timed text has no events"))?;

    let mut fragments = Vec::with_capacity(events.len());

    for event in events {
        let Some(segs) = event["segs"].as_array() else {
            continue;
        };

        let text: String = segs
            .iter()
            .filter_map(|seg| seg["utf8"].as_str())
            .collect::<String>()
            .replace('\n', " ");
        let text = text.trim();

        if text.is_empty() {
            continue;
        }

        let start = event["tStartMs"].as_f64().unwrap_or(0.0) / 1000.0;
        let duration = event["dDurationMs"].as_f64().unwrap_or(0.0) / 1000.0;

        fragments.push(RawFragment::new(text, start, duration));
    }

    Ok(fragments)
}
