//! Feature extractor
//!
//! Turns a raw URL string into the fixed 30-slot feature vector consumed by
//! the scoring artifact. Extraction is a pure function of the URL and the
//! extractor's configuration.

use super::provider::{ConstantProvider, FeatureProvider};
use super::suffix::SuffixList;
use super::url::UrlParts;
use phishscan_core::{ExtractionError, FeatureName, FeatureVector, FEATURE_COUNT};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Known URL-shortener domain fragments
pub const DEFAULT_SHORTENING_SERVICES: [&str; 7] = [
    "bit.ly", "goo.gl", "tinyurl", "ow.ly", "t.co", "is.gd", "buff.ly",
];

/// Number of leading characters skipped when looking for a `//` redirect
const SCHEME_PREFIX_CHARS: usize = 7;

fn ip_pattern() -> &'static Regex {
    static IP_PATTERN: OnceLock<Regex> = OnceLock::new();
    IP_PATTERN.get_or_init(|| Regex::new(r"\d+\.\d+\.\d+\.\d+").expect("IP pattern is valid"))
}

/// Anything that can turn a URL into a feature vector
pub trait FeatureSource: Send + Sync {
    fn extract(&self, url: &str) -> Result<FeatureVector, ExtractionError>;
}

/// Lexical feature extractor with pluggable providers
pub struct FeatureExtractor {
    suffixes: SuffixList,
    shortening_services: Vec<String>,
    providers: HashMap<FeatureName, Arc<dyn FeatureProvider>>,
}

impl FeatureExtractor {
    /// Create an extractor with the built-in suffix list, the default
    /// shortener list and training-default constants for non-lexical slots
    pub fn new() -> Self {
        let providers = FeatureName::ALL
            .iter()
            .filter(|name| !name.is_lexical())
            .map(|name| {
                let provider: Arc<dyn FeatureProvider> =
                    Arc::new(ConstantProvider::new(name.training_default()));
                (*name, provider)
            })
            .collect();

        Self {
            suffixes: SuffixList::builtin(),
            shortening_services: DEFAULT_SHORTENING_SERVICES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            providers,
        }
    }

    /// Replace the public suffix rules
    pub fn with_suffix_list(mut self, suffixes: SuffixList) -> Self {
        self.suffixes = suffixes;
        self
    }

    /// Replace the shortener list
    pub fn with_shortening_services(mut self, services: Vec<String>) -> Self {
        self.shortening_services = services;
        self
    }

    /// Serve `name` from a custom provider (overrides lexical rules too)
    pub fn with_provider(mut self, name: FeatureName, provider: Arc<dyn FeatureProvider>) -> Self {
        self.providers.insert(name, provider);
        self
    }

    /// Serve `name` from a constant
    pub fn with_constant(self, name: FeatureName, value: f64) -> Self {
        self.with_provider(name, Arc::new(ConstantProvider::new(value)))
    }

    pub fn shortening_services(&self) -> &[String] {
        &self.shortening_services
    }

    /// Extract the feature vector for `url`
    pub fn extract(&self, url: &str) -> Result<FeatureVector, ExtractionError> {
        let parts = UrlParts::parse(url, &self.suffixes)?;
        let mut values = [0.0; FEATURE_COUNT];

        for name in FeatureName::ALL {
            values[name.index()] = match self.providers.get(&name) {
                Some(provider) => provider.provide(url, &parts)?,
                None => self.lexical(name, url, &parts),
            };
        }

        debug!(
            "Extracted features for {}: domain={}, subdomain={}, suffix={}",
            url, parts.domain, parts.subdomain, parts.suffix
        );

        Ok(FeatureVector::from_values(values))
    }

    /// Built-in rule for a lexical feature; non-lexical slots without a
    /// provider fall back to their training default
    fn lexical(&self, name: FeatureName, url: &str, parts: &UrlParts) -> f64 {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        match name {
            FeatureName::HavingIpAddress => flag(ip_pattern().is_match(url)),
            FeatureName::UrlLength => url.chars().count() as f64,
            FeatureName::ShorteningService => flag(
                self.shortening_services
                    .iter()
                    .any(|service| url.contains(service.as_str())),
            ),
            FeatureName::HavingAtSymbol => flag(url.contains('@')),
            FeatureName::DoubleSlashRedirecting => flag(has_redirect_slashes(url)),
            FeatureName::PrefixSuffix => flag(parts.domain.contains('-')),
            FeatureName::HavingSubDomain => parts.subdomain_depth() as f64,
            FeatureName::SslFinalState => flag(url.starts_with("https")),
            FeatureName::HttpsToken => flag(parts.domain.contains("https")),
            FeatureName::SubmittingToEmail => flag(url.contains("mailto:")),
            other => other.training_default(),
        }
    }
}

impl fmt::Debug for FeatureExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut overridden: Vec<&'static str> =
            self.providers.keys().map(|name| name.as_str()).collect();
        overridden.sort_unstable();

        f.debug_struct("FeatureExtractor")
            .field("suffix_rules", &self.suffixes.len())
            .field("shortening_services", &self.shortening_services)
            .field("providers", &overridden)
            .finish()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSource for FeatureExtractor {
    fn extract(&self, url: &str) -> Result<FeatureVector, ExtractionError> {
        FeatureExtractor::extract(self, url)
    }
}

/// `//` anywhere after the first seven characters
fn has_redirect_slashes(url: &str) -> bool {
    match url.char_indices().nth(SCHEME_PREFIX_CHARS) {
        Some((offset, _)) => url[offset..].contains("//"),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(url: &str) -> FeatureVector {
        FeatureExtractor::new().extract(url).unwrap()
    }

    #[test]
    fn test_ip_at_and_hyphen() {
        let v = extract("http://192.168.1.1@evil-bank.com/login");

        assert_eq!(v.get(FeatureName::HavingIpAddress), 1.0);
        assert_eq!(v.get(FeatureName::HavingAtSymbol), 1.0);
        assert_eq!(v.get(FeatureName::PrefixSuffix), 1.0);
        assert_eq!(v.get(FeatureName::SslFinalState), 0.0);
        assert_eq!(v.get(FeatureName::UrlLength), 38.0);
        assert_eq!(v.get(FeatureName::HavingSubDomain), 0.0);
    }

    #[test]
    fn test_shortener_with_minimal_path() {
        let v = extract("https://bit.ly/abc123");

        assert_eq!(v.get(FeatureName::ShorteningService), 1.0);
        assert_eq!(v.get(FeatureName::SslFinalState), 1.0);
        assert_eq!(v.get(FeatureName::HavingIpAddress), 0.0);
        assert_eq!(v.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_double_slash_after_scheme() {
        assert_eq!(
            extract("http://example.com//redirect").get(FeatureName::DoubleSlashRedirecting),
            1.0
        );
        assert_eq!(
            extract("https://example.com/path").get(FeatureName::DoubleSlashRedirecting),
            0.0
        );
        // the skip stops on the second slash of "https://", leaving a single '/'
        assert_eq!(
            extract("https://example.com").get(FeatureName::DoubleSlashRedirecting),
            0.0
        );
        assert!(!has_redirect_slashes("short"));
    }

    #[test]
    fn test_subdomain_depth_and_https_token() {
        let v = extract("http://secure.login.https-paypal.com/");

        assert_eq!(v.get(FeatureName::HavingSubDomain), 2.0);
        assert_eq!(v.get(FeatureName::HttpsToken), 1.0);
        assert_eq!(v.get(FeatureName::PrefixSuffix), 1.0);
    }

    #[test]
    fn test_registrable_domain_under_country_second_level_suffixes() {
        let v = extract("http://paypal-secure.com.co/login");
        assert_eq!(v.get(FeatureName::PrefixSuffix), 1.0);
        assert_eq!(v.get(FeatureName::HavingSubDomain), 0.0);

        let v = extract("https://login.bank-secure.gob.mx/");
        assert_eq!(v.get(FeatureName::HavingSubDomain), 1.0);
        assert_eq!(v.get(FeatureName::PrefixSuffix), 1.0);

        let v = extract("http://https-login.co.at/");
        assert_eq!(v.get(FeatureName::HttpsToken), 1.0);
        assert_eq!(v.get(FeatureName::HavingSubDomain), 0.0);
    }

    #[test]
    fn test_space_in_host_still_extracts() {
        let v = extract("http://exa mple-bank.com/");
        assert_eq!(v.len(), FEATURE_COUNT);
        assert_eq!(v.get(FeatureName::PrefixSuffix), 1.0);
        assert_eq!(v.get(FeatureName::UrlLength), 25.0);
    }

    #[test]
    fn test_mailto() {
        let v = extract("mailto:someone@example.com");
        assert_eq!(v.get(FeatureName::SubmittingToEmail), 1.0);
        assert_eq!(v.get(FeatureName::HavingAtSymbol), 1.0);
    }

    #[test]
    fn test_url_length_counts_characters() {
        let v = extract("http://bücher.de");
        assert_eq!(v.get(FeatureName::UrlLength), 16.0);
    }

    #[test]
    fn test_placeholders_use_training_defaults() {
        let v = extract("https://example.com");

        for name in FeatureName::ALL.iter().filter(|n| !n.is_lexical()) {
            assert_eq!(v.get(*name), name.training_default(), "{}", name);
        }
    }

    #[test]
    fn test_constant_override() {
        let extractor = FeatureExtractor::new().with_constant(FeatureName::WebTraffic, -1.0);
        let v = extractor.extract("https://example.com").unwrap();
        assert_eq!(v.get(FeatureName::WebTraffic), -1.0);
    }

    #[test]
    fn test_closure_provider_overrides_lexical_rule() {
        let provider: Arc<dyn FeatureProvider> =
            Arc::new(|_url: &str, parts: &UrlParts| -> Result<f64, ExtractionError> {
                Ok(parts.domain.len() as f64)
            });
        let extractor = FeatureExtractor::new().with_provider(FeatureName::UrlLength, provider);

        let v = extractor.extract("https://example.com/long/path").unwrap();
        assert_eq!(v.get(FeatureName::UrlLength), 7.0);
    }

    #[test]
    fn test_failing_provider_fails_extraction() {
        let provider: Arc<dyn FeatureProvider> =
            Arc::new(|_url: &str, _parts: &UrlParts| -> Result<f64, ExtractionError> {
                Err(ExtractionError::Provider {
                    feature: "DNSRecord".to_string(),
                    reason: "resolver offline".to_string(),
                })
            });
        let extractor = FeatureExtractor::new().with_provider(FeatureName::DnsRecord, provider);

        assert!(matches!(
            extractor.extract("https://example.com"),
            Err(ExtractionError::Provider { .. })
        ));
    }

    #[test]
    fn test_custom_shortener_list() {
        let extractor =
            FeatureExtractor::new().with_shortening_services(vec!["rb.gy".to_string()]);

        let v = extractor.extract("https://rb.gy/xyz").unwrap();
        assert_eq!(v.get(FeatureName::ShorteningService), 1.0);

        let v = extractor.extract("https://bit.ly/xyz").unwrap();
        assert_eq!(v.get(FeatureName::ShorteningService), 0.0);
    }

    #[test]
    fn test_debug_lists_provider_slots() {
        let extractor = FeatureExtractor::new().with_constant(FeatureName::UrlLength, 0.0);
        let debug = format!("{:?}", extractor);

        assert!(debug.starts_with("FeatureExtractor"));
        assert!(debug.contains("URL_Length"));
        assert!(debug.contains("bit.ly"));
    }

    #[test]
    fn test_empty_url_is_an_error() {
        assert_eq!(
            FeatureExtractor::new().extract("").unwrap_err(),
            ExtractionError::EmptyUrl
        );
    }
}
