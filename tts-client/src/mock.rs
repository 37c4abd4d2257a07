//! Mock synthesizer for testing retry and skip behavior.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{Result, TtsError};
use crate::{SpeechRequest, SpeechSynthesizer};

/// A configurable mock backend. On success it writes a small placeholder
/// payload to the output path so callers can assert on file presence.
pub struct MockSynthesizer {
    /// Number of calls to fail before succeeding (usize::MAX = always fail).
    fail_count: AtomicUsize,
    /// Total calls made so far.
    call_count: AtomicUsize,
    /// Error to return while failing.
    fail_with: Mutex<Option<TtsError>>,
}

impl MockSynthesizer {
    /// A backend that always succeeds.
    pub fn always_succeeds() -> Self {
        Self {
            fail_count: AtomicUsize::new(0),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
        }
    }

    /// A backend that always reports rate limiting.
    pub fn always_rate_limited() -> Self {
        Self::always_fails(TtsError::RateLimited { retry_after: None })
    }

    /// A backend that always fails with the given error.
    pub fn always_fails(error: TtsError) -> Self {
        Self {
            fail_count: AtomicUsize::new(usize::MAX),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(error)),
        }
    }

    /// A backend that rate-limits `n` times, then succeeds.
    pub fn fails_then_succeeds(n: usize) -> Self {
        Self {
            fail_count: AtomicUsize::new(n),
            call_count: AtomicUsize::new(0),
            fail_with: Mutex::new(Some(TtsError::RateLimited { retry_after: None })),
        }
    }

    /// Number of times `synthesize_to_file` was called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize_to_file(&self, _request: &SpeechRequest, output: &Path) -> Result<()> {
        let call_num = self.call_count.fetch_add(1, Ordering::SeqCst);

        if call_num < self.fail_count.load(Ordering::SeqCst) {
            let error = self.fail_with.lock().unwrap();
            if let Some(err) = error.as_ref() {
                return Err(clone_error(err));
            }
        }

        std::fs::write(output, b"mock audio")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Clone a TtsError (TtsError does not implement Clone because of Io).
fn clone_error(err: &TtsError) -> TtsError {
    match err {
        TtsError::MissingApiKey { env_var } => TtsError::MissingApiKey {
            env_var: env_var.clone(),
        },
        TtsError::RateLimited { retry_after } => TtsError::RateLimited {
            retry_after: *retry_after,
        },
        TtsError::ApiError {
            message,
            status_code,
        } => TtsError::ApiError {
            message: message.clone(),
            status_code: *status_code,
        },
        TtsError::Io(_) => TtsError::ApiError {
            message: "IO error (mock)".to_string(),
            status_code: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SpeechRequest {
        SpeechRequest::new("test", crate::DEFAULT_MODEL, crate::DEFAULT_VOICE)
    }

    #[tokio::test]
    async fn test_always_succeeds_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp3");
        let mock = MockSynthesizer::always_succeeds();

        mock.synthesize_to_file(&request(), &out).await.unwrap();
        assert!(out.exists());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_always_rate_limited() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp3");
        let mock = MockSynthesizer::always_rate_limited();

        for _ in 0..3 {
            let err = mock.synthesize_to_file(&request(), &out).await.unwrap_err();
            assert!(err.is_retryable());
        }
        assert!(!out.exists());
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fails_then_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.mp3");
        let mock = MockSynthesizer::fails_then_succeeds(2);

        assert!(mock.synthesize_to_file(&request(), &out).await.is_err());
        assert!(mock.synthesize_to_file(&request(), &out).await.is_err());
        mock.synthesize_to_file(&request(), &out).await.unwrap();
        assert_eq!(mock.call_count(), 3);
        assert!(out.exists());
    }
}
