use reqwest::StatusCode;
use thiserror::Error;

/// Failure categories for calls against the Earth-observation provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider authentication failed: {0}")]
    Auth(String),

    #[error("provider unreachable: {0}")]
    Network(String),

    #[error("provider request timed out")]
    Timeout,

    #[error("provider unavailable (HTTP {status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("provider quota exceeded: {0}")]
    Quota(String),

    #[error("provider rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("provider returned no data: {0}")]
    EmptyResult(String),

    #[error("provider response malformed: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    /// Classify a non-success HTTP status returned by the provider
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS => ProviderError::Quota(message),
            s if s.is_server_error() => ProviderError::Unavailable {
                status: s.as_u16(),
                message,
            },
            s => ProviderError::Rejected {
                status: s.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            ProviderError::from_status(status, err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}
