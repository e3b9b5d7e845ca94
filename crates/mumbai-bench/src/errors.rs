use crate::providers::errors::ProviderError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for an evaluation run
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Questions file not found: {0}")]
    QuestionsNotFound(PathBuf),

    #[error("Chat service unavailable: {0}")]
    Unavailable(String),

    #[error("Model not available: {0}")]
    ModelUnavailable(String),

    #[error("Chat call failed: {0}")]
    Call(#[from] ProviderError),

    #[error("Failed to serialize results: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BenchError {
    /// Errors raised before any model is contacted abort the whole run.
    pub fn is_fatal_at_startup(&self) -> bool {
        matches!(
            self,
            BenchError::Config(_) | BenchError::QuestionsNotFound(_) | BenchError::Unavailable(_)
        )
    }
}

/// Result type for evaluation operations
pub type BenchResult<T> = Result<T, BenchError>;

/// Utility functions for working with BenchError
pub mod util {
    use super::*;
    use std::path::Path;

    /// Check that a file exists, returning QuestionsNotFound if it doesn't
    pub fn ensure_file_exists<P: AsRef<Path>>(path: P) -> BenchResult<()> {
        let path_ref = path.as_ref();
        if !path_ref.is_file() {
            return Err(BenchError::QuestionsNotFound(path_ref.to_path_buf()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_fatality() {
        assert!(BenchError::Config("bad".into()).is_fatal_at_startup());
        assert!(BenchError::Unavailable("down".into()).is_fatal_at_startup());
        assert!(!BenchError::ModelUnavailable("llama3".into()).is_fatal_at_startup());
        assert!(!BenchError::Call(ProviderError::Timeout(30)).is_fatal_at_startup());
    }

    #[test]
    fn test_ensure_file_exists_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = util::ensure_file_exists(dir.path()).unwrap_err();
        assert!(matches!(err, BenchError::QuestionsNotFound(_)));
    }
}
