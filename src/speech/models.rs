//! Fetching of ggml model files that are not installed yet.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::SpeechConfig;

/// Resolve the model file for `model_size`, downloading it first when it is
/// missing and the size is not mapped to a local file.
///
/// Blocks on the current tokio runtime; call from a blocking thread.
pub fn ensure_model(conf: &SpeechConfig, model_size: &str) -> Result<PathBuf> {
    let path = conf.model_path(model_size)?;
    if path.exists() {
        return Ok(path);
    }

    let url = match conf.model_url(model_size) {
        Some(url) if conf.auto_download => url,
        _ => return Err(anyhow!("Model '{}' not found at {:?}", model_size, path)),
    };

    let handle = tokio::runtime::Handle::try_current()
        .context("Model download requires a tokio runtime")?;
    handle.block_on(download_model(&url, &path))?;

    Ok(path)
}

/// Stream `url` into `path`. The file only appears under its final name once
/// the transfer is complete.
pub async fn download_model(url: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create models directory {:?}", parent))?;
    }

    log::info!("downloading {} to {:?}", url, path);
    let s = Instant::now();

    let mut response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to start download of {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!("Model download failed ({}): {}", response.status(), url);
    }

    let pb = ProgressBar::new(response.content_length().unwrap_or(0));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let partial = path.with_extension("bin.part");
    let mut file = fs::File::create(&partial)
        .with_context(|| format!("Failed to create {:?}", partial))?;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)?;
        pb.inc(chunk.len() as u64);
    }
    file.flush()?;
    drop(file);

    fs::rename(&partial, path).with_context(|| format!("Failed to install {:?}", path))?;
    pb.finish_and_clear();

    log::info!("model downloaded in {:.2}s", s.elapsed().as_secs_f32());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::extract::Path as UrlPath;
    use axum::http::StatusCode;
    use axum::routing::get;
    use tokio::net::TcpListener;

    async fn fake_model(UrlPath(file): UrlPath<String>) -> (StatusCode, Vec<u8>) {
        if file == "ggml-tiny.bin" {
            (StatusCode::OK, b"ggml model bytes".to_vec())
        } else {
            (StatusCode::NOT_FOUND, Vec::new())
        }
    }

    async fn spawn_fake_hub() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/models", listener.local_addr().unwrap());

        let app = Router::new().route("/models/{file}", get(fake_model));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        base
    }

    fn config(models_dir: &Path, models_url: String) -> SpeechConfig {
        SpeechConfig {
            models_dir: Some(models_dir.to_path_buf()),
            models_url,
            ..SpeechConfig::default()
        }
    }

    #[test]
    fn existing_model_is_used_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ggml-small.bin");
        fs::write(&path, b"x").unwrap();

        let conf = config(dir.path(), "http://127.0.0.1:9/unreachable".to_string());

        assert_eq!(ensure_model(&conf, "small").unwrap(), path);
    }

    #[test]
    fn missing_model_without_auto_download_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut conf = config(dir.path(), "http://127.0.0.1:9/unreachable".to_string());
        conf.auto_download = false;

        let err = ensure_model(&conf, "small").unwrap_err();

        assert!(err.to_string().contains("Model 'small' not found"), "{err}");
    }

    #[test]
    fn mapped_model_is_never_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let mut conf = config(dir.path(), "http://127.0.0.1:9/unreachable".to_string());
        conf.models.insert("large".to_string(), dir.path().join("custom.bin"));

        assert!(ensure_model(&conf, "large").is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn downloads_missing_model() {
        let base = spawn_fake_hub().await;
        let dir = tempfile::tempdir().unwrap();
        let conf = config(&dir.path().join("models"), base);

        let path = tokio::task::spawn_blocking(move || ensure_model(&conf, "tiny"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(path, dir.path().join("models").join("ggml-tiny.bin"));
        assert_eq!(fs::read(&path).unwrap(), b"ggml model bytes");
        assert!(!path.with_extension("bin.part").exists());
    }

    #[tokio::test]
    async fn unknown_model_leaves_nothing_behind() {
        let base = spawn_fake_hub().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ggml-huge.bin");

        let err = download_model(&format!("{}/ggml-huge.bin", base), &path)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("404"), "{err}");
        assert!(!path.exists());
    }

    #[tokio::test]
    #[ignore = "network I/O"]
    async fn downloads_real_model() {
        let dir = tempfile::tempdir().unwrap();
        let conf = config(dir.path(), SpeechConfig::default().models_url);
        let url = conf.model_url("tiny").unwrap();
        let path = conf.model_path("tiny").unwrap();

        download_model(&url, &path).await.unwrap();

        assert!(fs::metadata(&path).unwrap().len() > 1_000_000);
    }
}
