use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Service unreachable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Error message reported by the chat service itself, passed through as-is.
    #[error("{0}")]
    Service(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ProviderError::Unavailable(err.to_string())
        } else if err.is_decode() {
            ProviderError::RequestFailed(format!("Malformed response: {}", err))
        } else {
            ProviderError::RequestFailed(err.to_string())
        }
    }
}
