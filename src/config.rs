use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_CAPTIONS_URL: &str = "https://www.youtube.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DOWNLOADER: &str = "yt-dlp";
const DEFAULT_ANALYZER_LANGUAGE: &str = "fr";
const DEFAULT_MODELS_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub captions: CaptionsConfig,
    pub download: DownloadConfig,
    pub speech: SpeechConfig,
    pub analyzer: AnalyzerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CaptionsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CAPTIONS_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DownloadConfig {
    pub program: PathBuf,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_DOWNLOADER),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SpeechConfig {
    pub models_dir: Option<PathBuf>,
    pub models: HashMap<String, PathBuf>, // model_size -> ggml file
    pub threads: Option<u32>,
    /// Fetch missing `ggml-<size>.bin` files from `models_url`.
    pub auto_download: bool,
    pub models_url: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            models_dir: None,
            models: HashMap::new(),
            threads: None,
            auto_download: true,
            models_url: DEFAULT_MODELS_URL.to_string(),
        }
    }
}

impl SpeechConfig {
    /// Resolve the ggml model file for a model size such as `small`.
    ///
    /// Explicit entries in `models` win; otherwise `<models_dir>/ggml-<size>.bin`.
    pub fn model_path(&self, model_size: &str) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.models.get(model_size) {
            return expand_home(path);
        }

        let dir = match &self.models_dir {
            Some(dir) => expand_home(dir)?,
            None => config_dir()?.join("models"),
        };

        Ok(dir.join(format!("ggml-{}.bin", model_size)))
    }

    /// Download location of the ggml file for a model size, `None` for
    /// sizes mapped to a local file in `models`.
    pub fn model_url(&self, model_size: &str) -> Option<String> {
        if self.models.contains_key(model_size) {
            return None;
        }
        Some(format!(
            "{}/ggml-{}.bin",
            self.models_url.trim_end_matches('/'),
            model_size
        ))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerBackend {
    #[default]
    Rules,
    Remote,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub backend: AnalyzerBackend,
    pub url: Option<String>,
    pub language: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            backend: AnalyzerBackend::default(),
            url: None,
            language: DEFAULT_ANALYZER_LANGUAGE.to_string(),
        }
    }
}

fn config_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".dictee"))
}

fn expand_home(path: &Path) -> anyhow::Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => {
            let home = dirs::home_dir().context("Could not find home directory")?;
            Ok(home.join(rest))
        }
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Load the application config.
///
/// An explicit path must exist. Without one, `~/.dictee/config.yaml` is used
/// when present and built-in defaults otherwise.
pub fn load_app_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config_path = match path {
        Some(path) => {
            let path = expand_home(path)?;
            if !path.exists() {
                anyhow::bail!("Config file not found at {:?}", path);
            }
            path
        }
        None => {
            let path = config_dir()?.join("config.yaml");
            if !path.exists() {
                log::debug!("no config at {:?}, using defaults", path);
                return Ok(AppConfig::default());
            }
            path
        }
    };

    log::info!("loading config from {:?}", config_path);
    parse_app_config(&std::fs::read_to_string(&config_path)?)
        .with_context(|| format!("Failed to parse config {:?}", config_path))
}

pub fn parse_app_config(content: &str) -> anyhow::Result<AppConfig> {
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(content)?;
    Ok(config)
}
