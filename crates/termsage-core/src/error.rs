//! Error types for TermSage.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid required setting. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend failure. `transient` faults are retried by the store layer.
    #[error("Corpus store error: {message}")]
    Corpus { message: String, transient: bool },

    /// Missing term frequency, malformed extraction. Logged, never fatal.
    #[error("Data quality warning: {0}")]
    DataQuality(String),

    /// Malformed chunk pattern or tagging edge case.
    #[error("Grammar parse error: {0}")]
    Grammar(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Non-transient corpus store failure.
    pub fn corpus(message: impl Into<String>) -> Self {
        Self::Corpus {
            message: message.into(),
            transient: false,
        }
    }

    /// Connection-level fault that the transport may retry.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Corpus {
            message: message.into(),
            transient: true,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Corpus { transient: true, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::transient("database is locked").is_transient());
        assert!(!Error::corpus("no such table").is_transient());
        assert!(!Error::Config("grammar_path".into()).is_transient());
    }

    #[test]
    fn test_display() {
        let err = Error::corpus("update failed");
        assert_eq!(err.to_string(), "Corpus store error: update failed");
    }
}
