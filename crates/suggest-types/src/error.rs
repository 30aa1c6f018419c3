//! Error types for the topic suggestion system.

use thiserror::Error;

/// Unified error type for suggestion operations.
///
/// Every collaborator failure is forwarded as-is; the aggregator never
/// degrades to a partial result.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// Topic store or sorted-set index failed
    #[error("Store error: {0}")]
    Store(String),

    /// Full-text search service failed
    #[error("Search error: {0}")]
    Search(String),

    /// Read-privilege filter failed
    #[error("Privilege check failed: {0}")]
    Privilege(String),

    /// User block-list filter failed
    #[error("Block list error: {0}")]
    BlockList(String),

    /// A collaborator returned data of an unexpected shape
    #[error("Malformed response from {collaborator}: {reason}")]
    Malformed {
        /// Which collaborator produced the response
        collaborator: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fixture could not be read or parsed
    #[error("Fixture error: {0}")]
    Fixture(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SuggestError {
    /// Build a `Malformed` error.
    pub fn malformed(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            collaborator,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = SuggestError::malformed("topics", "expected 3 records, got 2");
        assert_eq!(
            err.to_string(),
            "Malformed response from topics: expected 3 records, got 2"
        );
    }

    #[test]
    fn test_upstream_display() {
        let err = SuggestError::Search("index offline".to_string());
        assert_eq!(err.to_string(), "Search error: index offline");
    }
}
