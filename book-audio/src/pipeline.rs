//! Pipeline orchestration: fan out over chapters, then over chunks.
//!
//! Two nesting levels of tasks: an outer set over selected chapters and an
//! inner set per chapter over its chunks. Both levels fully join before the
//! run returns. Output paths encode chapter slug and chunk index, so no
//! ordering is needed between concurrent tasks.

use anyhow::{Context, Result};
use glob::Pattern;
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tts_client::{SpeechRequest, SpeechSynthesizer};

use crate::book::{scan_chapters, select_chapters, slugify};
use crate::convert::{ChunkOutcome, RetryPolicy, convert_chunk};
use crate::text::{TextChunk, chunk_chapter};

/// Run-wide settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Glob pattern selecting chapter titles
    pub pattern: Pattern,
    /// TTS model name
    pub model: String,
    /// TTS voice name
    pub voice: String,
    /// Maximum chunk size in characters
    pub chunk_budget: usize,
    /// Rate-limit retry behavior
    pub retry: RetryPolicy,
}

/// Chunk counts reported at the end of a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: ChunkOutcome) {
        match outcome {
            ChunkOutcome::Completed => self.completed += 1,
            ChunkOutcome::Skipped => self.skipped += 1,
            ChunkOutcome::Failed => self.failed += 1,
        }
    }

    fn merge(&mut self, other: RunSummary) {
        self.completed += other.completed;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Audio path for a chunk: `{slug}---{index:03}.mp3` in the output directory.
fn chunk_audio_path(dir: &Path, chunk: &TextChunk) -> PathBuf {
    dir.join(format!(
        "{}---{:03}.mp3",
        slugify(&chunk.chapter_title),
        chunk.index
    ))
}

/// Convert the book at `input_path`, writing audio and sidecar files into
/// its directory. An unreadable input is fatal before any processing starts;
/// per-chunk failures are counted in the returned summary instead.
pub async fn run(
    synth: Arc<dyn SpeechSynthesizer>,
    input_path: &Path,
    options: &RunOptions,
) -> Result<RunSummary> {
    let text = tokio::fs::read_to_string(input_path)
        .await
        .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;

    let output_dir = input_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let chapters = scan_chapters(&text);
    let selected = select_chapters(&chapters, &options.pattern);
    info!(
        "Headings found: {}, chapters selected: {}",
        chapters.len(),
        selected.len()
    );

    if selected.is_empty() {
        warn!(
            "No chapter titles match pattern {:?}; nothing to do",
            options.pattern.as_str()
        );
        return Ok(RunSummary::default());
    }

    let mut chapter_tasks: JoinSet<RunSummary> = JoinSet::new();
    for chapter in selected {
        let body = text[chapter.start..chapter.end].to_string();
        let synth = Arc::clone(&synth);
        let options = options.clone();
        let output_dir = output_dir.clone();
        chapter_tasks.spawn(async move {
            process_chapter(synth, &chapter.title, &body, &output_dir, &options).await
        });
    }

    let mut summary = RunSummary::default();
    while let Some(result) = chapter_tasks.join_next().await {
        summary.merge(result.context("Chapter task panicked")?);
    }

    info!(
        "Run finished: {} completed, {} skipped, {} failed",
        summary.completed, summary.skipped, summary.failed
    );
    if summary.failed > 0 {
        warn!(
            "{} chunk(s) failed; re-run the same command to fill in the gaps",
            summary.failed
        );
    }

    Ok(summary)
}

/// Chunk one chapter and convert every chunk concurrently.
async fn process_chapter(
    synth: Arc<dyn SpeechSynthesizer>,
    title: &str,
    body: &str,
    output_dir: &Path,
    options: &RunOptions,
) -> RunSummary {
    info!("Processing chapter: {}", title);
    let chunks = chunk_chapter(title, body, options.chunk_budget);

    let mut chunk_tasks: JoinSet<ChunkOutcome> = JoinSet::new();
    for chunk in chunks {
        let audio_path = chunk_audio_path(output_dir, &chunk);
        let synth = Arc::clone(&synth);
        let request = SpeechRequest::new(chunk.text, &options.model, &options.voice);
        let retry = options.retry.clone();
        chunk_tasks
            .spawn(async move { convert_chunk(synth.as_ref(), &request, &audio_path, &retry).await });
    }

    let mut summary = RunSummary::default();
    while let Some(result) = chunk_tasks.join_next().await {
        match result {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                error!("Chunk task panicked: {}", e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "Completed chapter {}: {} converted, {} skipped, {} failed",
        title, summary.completed, summary.skipped, summary.failed
    );
    summary
}
