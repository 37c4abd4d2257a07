//! Text-to-speech client library for the book-audio workspace.
//!
//! Wraps the OpenAI speech synthesis endpoint behind the [`SpeechSynthesizer`]
//! trait so the pipeline can be tested against a mock backend.

pub mod client;
pub mod error;
pub mod mock;

pub use client::OpenAiTts;
pub use error::{Result, TtsError};
pub use mock::MockSynthesizer;

use async_trait::async_trait;
use serde::Serialize;
use std::path::Path;

/// Default synthesis model.
pub const DEFAULT_MODEL: &str = "tts-1";

/// Default voice.
pub const DEFAULT_VOICE: &str = "fable";

/// A single speech synthesis request.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub response_format: String,
}

impl SpeechRequest {
    /// Build a request for the given text with mp3 output.
    pub fn new(text: impl Into<String>, model: &str, voice: &str) -> Self {
        Self {
            model: model.to_string(),
            input: text.into(),
            voice: voice.to_string(),
            response_format: "mp3".to_string(),
        }
    }
}

/// A speech synthesis backend.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize the request and write the audio payload to `output`.
    async fn synthesize_to_file(&self, request: &SpeechRequest, output: &Path) -> Result<()>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_request_serializes_openai_body() {
        let request = SpeechRequest::new("Hello world.", DEFAULT_MODEL, DEFAULT_VOICE);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["model"], "tts-1");
        assert_eq!(body["input"], "Hello world.");
        assert_eq!(body["voice"], "fable");
        assert_eq!(body["response_format"], "mp3");
    }
}
