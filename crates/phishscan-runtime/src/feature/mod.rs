//! Feature extraction module
//!
//! Provides lexical URL splitting, public suffix rules, pluggable feature
//! providers and the extractor that assembles the 30-slot feature vector.

pub mod extractor;
pub mod provider;
pub mod suffix;
pub mod url;

// Re-export for convenience
pub use extractor::{FeatureExtractor, FeatureSource, DEFAULT_SHORTENING_SERVICES};
pub use provider::{ConstantProvider, FeatureProvider};
pub use suffix::SuffixList;
pub use url::UrlParts;
