//! Crate-wide error type for the context engine.
//!
//! A flat enum, one alias, a handful of `#[from]` conversions, and an
//! `is_recoverable` classifier the adaptive store's retry loop consults
//! before bothering to back off at all.

/// Result type alias for context-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the retrieval core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid or missing configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Embedding provider unreachable, non-2xx, or returned the wrong dimension.
    #[error("embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Local or remote storage I/O, schema, or transaction failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// A budget allocator produced allocations that exceed the total budget.
    #[error("budget error: {0}")]
    Budget(String),

    /// The operation's cancellation context was tripped before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// JSON (de)serialization failure, typically of `Document::metadata`.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Underlying I/O failure (file store paths, backup/restore).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error is worth retrying with backoff.
    ///
    /// Used by the adaptive store's replication task to decide whether a
    /// remote-mirror failure should consume one of its retry attempts, and
    /// by callers deciding whether to surface a fatal error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Storage(_) | Error::EmbeddingProvider(_) | Error::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_are_recoverable() {
        assert!(Error::Storage("timeout".into()).is_recoverable());
    }

    #[test]
    fn config_errors_are_not_recoverable() {
        assert!(!Error::Config("missing field".into()).is_recoverable());
    }

    #[test]
    fn cancelled_is_not_recoverable() {
        assert!(!Error::Cancelled.is_recoverable());
    }
}
