//! PhishScan Core - Core types and definitions for the PhishScan URL classifier
//!
//! This crate provides the fundamental types shared across the PhishScan crates:
//! - The fixed 30-slot feature schema (`FeatureName`, `FeatureVector`)
//! - Classification outcomes (`Label`, `Verdict`, `VerdictSource`)
//! - Audit records written by the reporting layer
//! - Error types

pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, ExtractionError};
pub use types::{
    AuditRecord, FeatureName, FeatureVector, Label, Verdict, VerdictSource, FEATURE_COUNT,
    PHISHING_THRESHOLD,
};
