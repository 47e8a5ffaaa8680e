//! SDK error types

use phishscan_core::CoreError;
use phishscan_runtime::RuntimeError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration file: {0}")]
    ConfigFile(#[from] serde_yaml::Error),

    /// Error from the classification runtime
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Error from the shared types
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a classification request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Extraction,
    SchemaMismatch,
    ArtifactLoad,
    Scoring,
    StoreUnavailable,
    Configuration,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::Extraction => "extraction",
            FailureReason::SchemaMismatch => "schema_mismatch",
            FailureReason::ArtifactLoad => "artifact_load",
            FailureReason::Scoring => "scoring",
            FailureReason::StoreUnavailable => "store_unavailable",
            FailureReason::Configuration => "configuration",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SdkError {
    /// Failure category for callers that map errors to responses
    pub fn reason(&self) -> FailureReason {
        match self {
            SdkError::Runtime(err) => match err {
                RuntimeError::Extraction(_) => FailureReason::Extraction,
                RuntimeError::SchemaMismatch(_) => FailureReason::SchemaMismatch,
                RuntimeError::ArtifactLoad { .. } => FailureReason::ArtifactLoad,
                RuntimeError::Scoring(_) => FailureReason::Scoring,
                RuntimeError::StoreUnavailable(_)
                | RuntimeError::StoreTimeout { .. }
                | RuntimeError::InvalidRecord(_) => FailureReason::StoreUnavailable,
                RuntimeError::Configuration(_) => FailureReason::Configuration,
            },
            SdkError::Config(_) | SdkError::ConfigFile(_) | SdkError::Core(_) | SdkError::Io(_) => {
                FailureReason::Configuration
            }
        }
    }
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
