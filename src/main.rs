mod captions;
mod clean;
mod config;
mod download;
mod error;
#[cfg(feature = "whisper")]
mod ffmpeg_decoder;
mod merge;
mod nlp;
mod output;
mod pipeline;
mod server;
mod speech;
mod transcript;
mod video_id;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::{Engine, Pipeline, TranscriptRequest};

#[derive(Parser)]
#[command(name = "dictee")]
#[command(about = "Video transcript service for language learners", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP transcript service
    Serve {
        /// Configuration file (default: ~/.dictee/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Listen address, overrides server.bind
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Fetch one transcript and print it as JSON
    Transcribe {
        /// Video URL
        url: String,

        /// captions or speech
        #[arg(short, long, default_value = "captions")]
        engine: Engine,

        /// Language code, "auto" lets the engine decide
        #[arg(short, long, default_value = "fr")]
        lang: String,

        /// Speech model size
        #[arg(short, long, default_value = "small")]
        model_size: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (default: ~/.dictee/config.yaml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, bind } => {
            let app_config =
                config::load_app_config(config.as_deref()).context("Failed to load app config")?;
            let bind = bind.unwrap_or_else(|| app_config.server.bind.clone());

            let pipeline = Pipeline::from_config(&app_config)?;
            server::serve(&bind, pipeline).await?;
        }
        Commands::Transcribe {
            url,
            engine,
            lang,
            model_size,
            output,
            config,
        } => {
            let app_config =
                config::load_app_config(config.as_deref()).context("Failed to load app config")?;
            let pipeline = Pipeline::from_config(&app_config)?;

            let mut request = TranscriptRequest::new(url, engine);
            request.language = (lang != "auto").then_some(lang);
            request.model_size = model_size;

            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .context("Invalid progress template")?,
            );
            pb.set_message(format!("Transcribing with {:?}...", engine));
            pb.enable_steady_tick(Duration::from_millis(100));

            let result = pipeline.acquire(request).await;
            pb.finish_and_clear();
            let transcript = result?;

            match output {
                Some(path) => {
                    output::save_transcript_json(&path, &transcript)?;
                    eprintln!(
                        "Saved {} sentences to {:?}",
                        transcript.sentences.len(),
                        path
                    );
                }
                None => output::write_transcript_json(std::io::stdout().lock(), &transcript)?,
            }
        }
    }

    Ok(())
}
