//! Pluggable per-slot feature providers
//!
//! Twenty of the thirty slots describe live-page content, WHOIS/DNS data or
//! reputation lookups. Until real signals exist those slots are filled by
//! [`ConstantProvider`]s carrying the training-time convention. Any slot can be
//! served by a custom provider without touching the vector schema.

use super::url::UrlParts;
use phishscan_core::ExtractionError;

/// Source of a single feature value
pub trait FeatureProvider: Send + Sync {
    /// Compute the value for `url`
    fn provide(&self, url: &str, parts: &UrlParts) -> Result<f64, ExtractionError>;
}

/// Provider that always returns the same value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantProvider {
    value: f64,
}

impl ConstantProvider {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl FeatureProvider for ConstantProvider {
    fn provide(&self, _url: &str, _parts: &UrlParts) -> Result<f64, ExtractionError> {
        Ok(self.value)
    }
}

impl<F> FeatureProvider for F
where
    F: Fn(&str, &UrlParts) -> Result<f64, ExtractionError> + Send + Sync,
{
    fn provide(&self, url: &str, parts: &UrlParts) -> Result<f64, ExtractionError> {
        self(url, parts)
    }
}
