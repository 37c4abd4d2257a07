//! OpenAI speech API client.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, TtsError};
use crate::{SpeechRequest, SpeechSynthesizer};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Client for the OpenAI `/audio/speech` endpoint.
pub struct OpenAiTts {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl OpenAiTts {
    /// Create a client with an explicit API key.
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a non-default base URL (used by tests).
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| TtsError::ApiError {
                message: format!("Failed to create HTTP client: {}", e),
                status_code: None,
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    /// Create a client from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV_VAR).map_err(|_| TtsError::MissingApiKey {
            env_var: API_KEY_ENV_VAR.to_string(),
        })?;
        Self::new(api_key)
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiTts {
    async fn synthesize_to_file(&self, request: &SpeechRequest, output: &Path) -> Result<()> {
        let url = format!("{}/audio/speech", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(TtsError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };
            return Err(TtsError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        // Stream the audio payload straight to disk.
        let mut file = std::fs::File::create(output)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TtsError::ApiError {
                message: format!("Error reading response body: {}", e),
                status_code: None,
            })?;
            file.write_all(&chunk)?;
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
