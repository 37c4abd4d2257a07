//! book-audio - Convert a plain-text book into per-chapter spoken audio.

mod book;
mod config;
mod convert;
mod pipeline;
mod text;

use anyhow::{Context, Result};
use clap::Parser;
use config::BookAudioConfig;
use glob::Pattern;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tts_client::OpenAiTts;

#[derive(Parser, Debug)]
#[command(name = "book-audio")]
#[command(about = "Convert a plain-text book into per-chapter spoken audio via TTS", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the input text file (chapters marked by '# Title' lines)
    input: PathBuf,

    /// Glob pattern selecting which chapter titles to convert
    #[arg(long)]
    pattern: Option<String>,

    /// TTS voice
    #[arg(long)]
    voice: Option<String>,

    /// TTS model
    #[arg(long)]
    model: Option<String>,

    /// Maximum chunk size in characters
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "info" }),
    )
    .init();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let config = BookAudioConfig::load().context("Failed to load configuration")?;

    let pattern_str = args.pattern.unwrap_or(config.pattern);
    let pattern = Pattern::new(&pattern_str)
        .with_context(|| format!("Invalid chapter pattern: {:?}", pattern_str))?;

    let options = pipeline::RunOptions {
        pattern,
        model: args.model.unwrap_or(config.model),
        voice: args.voice.unwrap_or(config.voice),
        chunk_budget: args.chunk_size.unwrap_or(config.chunk_size),
        retry: convert::RetryPolicy {
            max_attempts: config.max_attempts,
            delay: Duration::from_secs(config.retry_delay_secs),
        },
    };

    let synth = Arc::new(OpenAiTts::from_env().context("Failed to create TTS client")?);

    pipeline::run(synth, &args.input, &options).await?;

    Ok(())
}
