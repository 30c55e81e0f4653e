//! Error types for truth-imagery resolution.

use thiserror::Error;

/// Result type alias using TruthError.
pub type TruthResult<T> = Result<T, TruthError>;

/// Primary error type for imagery resolution operations.
#[derive(Debug, Error)]
pub enum TruthError {
    // === Input Errors ===
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // === Catalog Errors ===
    #[error("No scenes found between {begin} and {end}")]
    NoScenesFound {
        begin: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    // === Collaborator Errors ===
    #[error("Imagery service error: {0}")]
    RemoteService(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl TruthError {
    /// Get the HTTP status code the boundary layer should render for
    /// this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            TruthError::InvalidArgument(_) => 400,
            TruthError::NoScenesFound { .. } => 404,
            TruthError::RemoteService(_) => 502,
            TruthError::Storage(_) | TruthError::Cache(_) => 500,
        }
    }

    /// Whether a caller-initiated retry of the same request is safe.
    ///
    /// Every pipeline step is idempotent, so anything short of a malformed
    /// request may be retried.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TruthError::InvalidArgument(_))
    }
}

impl From<serde_json::Error> for TruthError {
    fn from(err: serde_json::Error) -> Self {
        TruthError::Cache(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            TruthError::InvalidArgument("bad".into()).http_status_code(),
            400
        );
        let begin = NaiveDate::from_ymd_opt(2014, 6, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2014, 9, 30).unwrap();
        assert_eq!(
            TruthError::NoScenesFound { begin, end }.http_status_code(),
            404
        );
        assert_eq!(
            TruthError::RemoteService("down".into()).http_status_code(),
            502
        );
    }

    #[test]
    fn test_retryable() {
        assert!(!TruthError::InvalidArgument("bad".into()).is_retryable());
        assert!(TruthError::Storage("write failed".into()).is_retryable());
    }
}
