use thiserror::Error;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("API key not found. Set the {env_var} environment variable.")]
    MissingApiKey { env_var: String },

    #[error("Rate limit exceeded{}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TtsError {
    /// Whether this error is transient and worth retrying after a delay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TtsError::RateLimited { .. })
    }
}

pub type Result<T> = std::result::Result<T, TtsError>;
