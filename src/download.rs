//! Audio download through the `yt-dlp` command line tool.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::config::DownloadConfig;
use crate::error::{Result, TranscriptError};

const FORMAT: &str = "bestaudio/best";
const OUTPUT_STEM: &str = "audio";

pub trait AudioDownloader: Send + Sync {
    /// Download the best available audio of `url` into `out_dir` and return
    /// the path of the written file.
    fn download(&self, url: &str, out_dir: &Path) -> Result<PathBuf>;
}

pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(conf: &DownloadConfig) -> Self {
        Self {
            program: conf.program.clone(),
        }
    }

    fn args(url: &str, out_dir: &Path) -> Vec<String> {
        let template = out_dir.join(format!("{}.%(ext)s", OUTPUT_STEM));
        vec![
            "-f".to_string(),
            FORMAT.to_string(),
            "-o".to_string(),
            template.to_string_lossy().to_string(),
            url.to_string(),
        ]
    }
}

impl AudioDownloader for YtDlp {
    fn download(&self, url: &str, out_dir: &Path) -> Result<PathBuf> {
        let args = Self::args(url, out_dir);
        log::info!("downloading audio from {}", url);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| TranscriptError::Download {
                message: format!("Failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            let message = if stderr.is_empty() {
                format!("Command failed: {} {}", self.program.display(), args.join(" "))
            } else {
                stderr.to_string()
            };
            return Err(TranscriptError::Download { message });
        }

        let audio = find_output(out_dir)?;
        log::info!("audio downloaded to {:?}", audio);
        Ok(audio)
    }
}

fn find_output(out_dir: &Path) -> Result<PathBuf> {
    let prefix = format!("{}.", OUTPUT_STEM);

    let mut files: Vec<PathBuf> = std::fs::read_dir(out_dir)
        .map_err(|e| TranscriptError::Download {
            message: format!("Failed to read {}: {}", out_dir.display(), e),
        })?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
        .map(|entry| entry.path())
        .collect();
    files.sort();

    files.into_iter().next().ok_or_else(|| TranscriptError::Download {
        message: "Download failed: No audio file generated (possible causes: permissions, geo-restriction, or network issues).".to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Write an executable shell script standing in for yt-dlp.
    #[cfg(unix)]
    pub(crate) fn fake_program(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn downloader(program: PathBuf) -> YtDlp {
        YtDlp::new(&DownloadConfig { program })
    }

    #[test]
    fn builds_argument_template() {
        let args = YtDlp::args("https://youtu.be/jNQXAC9IVRw", Path::new("/tmp/work"));

        assert_eq!(
            args,
            [
                "-f",
                "bestaudio/best",
                "-o",
                "/tmp/work/audio.%(ext)s",
                "https://youtu.be/jNQXAC9IVRw"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn returns_downloaded_file() {
        let bin = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let program = fake_program(bin.path(), r#"echo data > "$(dirname "$4")/audio.m4a""#);

        let audio = downloader(program)
            .download("https://youtu.be/jNQXAC9IVRw", work.path())
            .unwrap();

        assert_eq!(audio, work.path().join("audio.m4a"));
    }

    #[cfg(unix)]
    #[test]
    fn reports_stderr_on_failure() {
        let bin = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let program = fake_program(
            bin.path(),
            "echo 'ERROR: [youtube] jNQXAC9IVRw: Video unavailable' >&2\nexit 1",
        );

        let err = downloader(program)
            .download("https://youtu.be/jNQXAC9IVRw", work.path())
            .unwrap_err();

        match err {
            TranscriptError::Download { message } => {
                assert_eq!(message, "ERROR: [youtube] jNQXAC9IVRw: Video unavailable")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn reports_command_when_stderr_is_empty() {
        let bin = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let program = fake_program(bin.path(), "exit 2");

        let err = downloader(program)
            .download("https://youtu.be/jNQXAC9IVRw", work.path())
            .unwrap_err();

        assert!(err.to_string().starts_with("Command failed: "), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn fails_without_output_file() {
        let bin = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let program = fake_program(bin.path(), "exit 0");

        let err = downloader(program)
            .download("https://youtu.be/jNQXAC9IVRw", work.path())
            .unwrap_err();

        assert!(err.to_string().contains("No audio file generated"), "{err}");
    }

    #[test]
    fn missing_program_is_a_download_error() {
        let work = TempDir::new().unwrap();
        let program = work.path().join("does-not-exist");

        let err = downloader(program)
            .download("https://youtu.be/jNQXAC9IVRw", work.path())
            .unwrap_err();

        assert!(matches!(err, TranscriptError::Download { .. }));
    }
}
