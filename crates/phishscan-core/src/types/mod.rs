//! Type system for PhishScan
//!
//! This module contains:
//! - The feature schema and feature vectors
//! - Verdicts and labels
//! - Audit records

pub mod feature;
pub mod verdict;

pub use feature::{FeatureName, FeatureVector, FEATURE_COUNT};
pub use verdict::{AuditRecord, Label, Verdict, VerdictSource, PHISHING_THRESHOLD};
