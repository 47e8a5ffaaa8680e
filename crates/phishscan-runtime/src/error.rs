//! Runtime error types

use phishscan_core::ExtractionError;
use std::time::Duration;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// URL could not be turned into a feature vector
    #[error("Feature extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Artifact and feature vector disagree on the feature schema
    #[error("Feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Scoring artifact missing or corrupt
    #[error("Failed to load scoring artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// Fault while evaluating a well-formed vector
    #[error("Scoring failed: {0}")]
    Scoring(String),

    /// Backing store returned an error
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Backing store did not answer in time
    #[error("Store operation '{operation}' timed out after {timeout:?}")]
    StoreTimeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Invalid runtime configuration (suffix list, provider setup)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Stored record could not be decoded
    #[error("Invalid stored record: {0}")]
    InvalidRecord(String),
}

impl RuntimeError {
    /// Whether the error came from the cache's backing store
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            RuntimeError::StoreUnavailable(_)
                | RuntimeError::StoreTimeout { .. }
                | RuntimeError::InvalidRecord(_)
        )
    }
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
