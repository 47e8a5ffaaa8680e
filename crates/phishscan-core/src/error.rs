//! Error types for PhishScan Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Unknown feature name: {0}")]
    UnknownFeature(String),

    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Failure while turning a URL into a feature vector.
///
/// Extraction degrades gracefully for almost every input; these are the only
/// cases where no vector can be produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Input was empty or whitespace only
    #[error("URL is empty")]
    EmptyUrl,

    /// Authority component could not be split into host labels
    #[error("Malformed authority '{authority}': {reason}")]
    MalformedAuthority { authority: String, reason: String },

    /// A pluggable feature provider failed
    #[error("Feature provider for {feature} failed: {reason}")]
    Provider { feature: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CoreError>;
