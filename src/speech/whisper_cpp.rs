use std::{ffi::c_int, path::Path, time::Instant};

use anyhow::{Result, anyhow};

use whisper_rs::{FullParams, WhisperContext, WhisperContextParameters};

use crate::{
    config::SpeechConfig,
    ffmpeg_decoder,
    speech::{Recognition, RecognizedSpan, SpeechRecognizer, models},
};

const DEFAULT_BEAM_SIZE: c_int = 5;
const DEFAULT_PATIENCE: f32 = 1.0;

pub struct Whisper {
    conf: SpeechConfig,
}

impl Whisper {
    pub fn new(conf: SpeechConfig) -> Self {
        Self { conf }
    }

    fn load(&self, model_size: &str) -> Result<WhisperContext> {
        let model_path = models::ensure_model(&self.conf, model_size)?;

        log::info!("loading whisper model {:?}", model_path);
        let s = Instant::now();

        let param = WhisperContextParameters::default();
        let ctx = WhisperContext::new_with_params(
            model_path.to_str().ok_or(anyhow!("Invalid model path"))?,
            param,
        )?;

        log::info!("model loaded in {:.2}s", s.elapsed().as_secs_f32());
        Ok(ctx)
    }
}

impl SpeechRecognizer for Whisper {
    fn transcribe(
        &self,
        audio: &Path,
        language: Option<&str>,
        model_size: &str,
    ) -> Result<Recognition> {
        let ctx = self.load(model_size)?;

        let mut params = FullParams::new(whisper_rs::SamplingStrategy::BeamSearch {
            beam_size: DEFAULT_BEAM_SIZE,
            patience: DEFAULT_PATIENCE,
        });

        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_token_timestamps(false);
        params.set_language(language);

        if let Some(threads) = self.conf.threads {
            params.set_n_threads(threads as c_int);
        }

        let audio = ffmpeg_decoder::read_file(audio)?;

        let s = Instant::now();
        let mut state = ctx.create_state()?;
        state.full(params, &audio)?;
        log::info!("inference completed in {:.2}s", s.elapsed().as_secs_f32());

        let lang_id = state.full_lang_id_from_state();
        let detected_language = whisper_rs::get_lang_str(lang_id).map(str::to_string);

        let mut spans = Vec::with_capacity(state.full_n_segments() as usize);

        for segment in state.as_iter() {
            let text = segment.to_str_lossy()?.to_string();
            // whisper timestamps are centiseconds
            let start = segment.start_timestamp() as f64 / 100.0;
            let end = segment.end_timestamp() as f64 / 100.0;

            spans.push(RecognizedSpan { text, start, end });
        }

        Ok(Recognition {
            spans,
            detected_language,
        })
    }
}
