//! Per-chunk speech conversion with bounded retry on rate limiting.

use log::{error, info, warn};
use std::path::Path;
use std::time::Duration;
use tts_client::{SpeechRequest, SpeechSynthesizer};

/// Retry behavior for rate-limited synthesis requests.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before the chunk is abandoned
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

/// What happened to one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Audio file written
    Completed,
    /// Audio file already existed, no request issued
    Skipped,
    /// Retries exhausted or the service returned a permanent error
    Failed,
}

/// Convert one chunk to an audio file at `audio_path`.
///
/// Skips entirely if the audio file already exists. Otherwise the chunk text
/// is written to a `.txt` sidecar before the first request so a failed chunk
/// leaves a trace, then the request is retried on rate limiting up to
/// `retry.max_attempts` times. Permanent errors and retry exhaustion are
/// reported as [`ChunkOutcome::Failed`] without propagating, so sibling
/// chunks keep running; a later re-run fills the gap.
pub async fn convert_chunk(
    synth: &dyn SpeechSynthesizer,
    request: &SpeechRequest,
    audio_path: &Path,
    retry: &RetryPolicy,
) -> ChunkOutcome {
    let name = audio_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    if audio_path.exists() {
        info!("Skipping {} as it already exists", name);
        return ChunkOutcome::Skipped;
    }

    let text_path = audio_path.with_extension("txt");
    if let Err(e) = std::fs::write(&text_path, &request.input) {
        error!("Failed to write {}: {}", text_path.display(), e);
        return ChunkOutcome::Failed;
    }

    info!("Processing chunk: {}", name);

    for attempt in 1..=retry.max_attempts {
        match synth.synthesize_to_file(request, audio_path).await {
            Ok(()) => {
                info!("Completed chunk: {}", name);
                return ChunkOutcome::Completed;
            }
            Err(e) if e.is_retryable() => {
                warn!(
                    "Rate limit exceeded for {} (attempt {}/{}). Retrying in {:?}...",
                    name, attempt, retry.max_attempts, retry.delay
                );
                tokio::time::sleep(retry.delay).await;
            }
            Err(e) => {
                // Permanent failure is isolated to this chunk.
                error!("Synthesis failed for {}: {}", name, e);
                return ChunkOutcome::Failed;
            }
        }
    }

    error!(
        "Failed to convert {} after {} attempts. Re-run later to fill in the gap.",
        name, retry.max_attempts
    );
    ChunkOutcome::Failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tts_client::{DEFAULT_MODEL, DEFAULT_VOICE, MockSynthesizer, TtsError};

    fn request(text: &str) -> SpeechRequest {
        SpeechRequest::new(text, DEFAULT_MODEL, DEFAULT_VOICE)
    }

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_existing_file_is_skipped_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("Chapter_1---000.mp3");
        std::fs::write(&audio, b"existing").unwrap();

        let mock = MockSynthesizer::always_succeeds();
        let outcome = convert_chunk(&mock, &request("hi"), &audio, &fast_retry(10)).await;

        assert_eq!(outcome, ChunkOutcome::Skipped);
        assert_eq!(mock.call_count(), 0);
        // No sidecar is written for a skipped chunk.
        assert!(!audio.with_extension("txt").exists());
    }

    #[tokio::test]
    async fn test_sidecar_written_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("Chapter_1---000.mp3");

        let mock = MockSynthesizer::always_fails(TtsError::ApiError {
            message: "boom".to_string(),
            status_code: Some(500),
        });
        let outcome = convert_chunk(&mock, &request("chunk body"), &audio, &fast_retry(10)).await;

        assert_eq!(outcome, ChunkOutcome::Failed);
        let sidecar = audio.with_extension("txt");
        assert!(sidecar.exists());
        assert_eq!(std::fs::read_to_string(sidecar).unwrap(), "chunk body");
    }

    #[tokio::test]
    async fn test_rate_limit_retried_exactly_max_attempts() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("Chapter_1---000.mp3");

        let mock = MockSynthesizer::always_rate_limited();
        let outcome = convert_chunk(&mock, &request("hi"), &audio, &fast_retry(10)).await;

        assert_eq!(outcome, ChunkOutcome::Failed);
        assert_eq!(mock.call_count(), 10);
        assert!(!audio.exists());
    }

    #[tokio::test]
    async fn test_recovers_after_transient_rate_limit() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("Chapter_1---000.mp3");

        let mock = MockSynthesizer::fails_then_succeeds(3);
        let outcome = convert_chunk(&mock, &request("hi"), &audio, &fast_retry(10)).await;

        assert_eq!(outcome, ChunkOutcome::Completed);
        assert_eq!(mock.call_count(), 4);
        assert!(audio.exists());
    }

    #[tokio::test]
    async fn test_permanent_error_fails_on_first_attempt() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("Chapter_1---000.mp3");

        let mock = MockSynthesizer::always_fails(TtsError::ApiError {
            message: "invalid input".to_string(),
            status_code: Some(400),
        });
        let outcome = convert_chunk(&mock, &request("hi"), &audio, &fast_retry(10)).await;

        assert_eq!(outcome, ChunkOutcome::Failed);
        assert_eq!(mock.call_count(), 1);
    }
}
