use crate::transcript::TranscriptResponse;
use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub fn save_transcript_json(path: &Path, transcript: &TranscriptResponse) -> Result<()> {
    let file = File::create(path)?;
    write_transcript_json(file, transcript)
}

pub fn write_transcript_json<W: Write>(
    mut writer: W,
    transcript: &TranscriptResponse,
) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, transcript)?;
    writeln!(writer)?;
    Ok(())
}
