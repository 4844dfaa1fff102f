use anyhow::{Result, anyhow};
use audrey::Reader;
use std::path::Path;
use std::process::Command;
use std::process::Stdio;
use tempfile::NamedTempFile;

// ffmpeg -i input.m4a -ar 16000 -ac 1 -c:a pcm_s16le output.wav
fn use_ffmpeg<P: AsRef<Path>>(input_path: P) -> Result<NamedTempFile> {
    log::debug!("converting {:?} to 16kHz mono wav", input_path.as_ref());

    let temp_file = NamedTempFile::with_suffix(".wav")?;

    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(input_path.as_ref())
        .args(["-ar", "16000", "-ac", "1", "-c:a", "pcm_s16le"])
        .arg(temp_file.path())
        .args(["-hide_banner", "-y", "-loglevel", "error"])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| anyhow!("unable to run ffmpeg: {}", e))?;

    if output.status.success() {
        Ok(temp_file)
    } else {
        Err(anyhow!(
            "unable to convert audio file: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ))
    }
}

/// Decode any audio file ffmpeg understands into 16kHz mono f32 samples.
pub fn read_file<P: AsRef<Path>>(audio_file_path: P) -> Result<Vec<f32>> {
    let temp_file = use_ffmpeg(&audio_file_path)?;

    let mut reader = Reader::new(temp_file.reopen()?)?;
    let audio_buf: Vec<i16> = reader.samples().collect::<Result<_, _>>()?;
    let mut output = vec![0.0f32; audio_buf.len()];

    whisper_rs::convert_integer_to_float_audio(&audio_buf, &mut output)?;
    Ok(output)
    // temp_file is deleted when it goes out of scope
}
