//! Feature schema for URL classification
//!
//! The scoring artifact was trained on a fixed table of 30 columns. The order
//! and the exact spelling of the column names (including the historical
//! misspellings) are part of the contract with the artifact, so both live here
//! as the single source of truth.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of slots in every feature vector
pub const FEATURE_COUNT: usize = 30;

/// Name of a single feature slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FeatureName {
    #[serde(rename = "having_IP_Address")]
    HavingIpAddress,
    #[serde(rename = "URL_Length")]
    UrlLength,
    #[serde(rename = "Shortining_Service")]
    ShorteningService,
    #[serde(rename = "having_At_Symbol")]
    HavingAtSymbol,
    #[serde(rename = "double_slash_redirecting")]
    DoubleSlashRedirecting,
    #[serde(rename = "Prefix_Suffix")]
    PrefixSuffix,
    #[serde(rename = "having_Sub_Domain")]
    HavingSubDomain,
    #[serde(rename = "SSLfinal_State")]
    SslFinalState,
    #[serde(rename = "Domain_registeration_length")]
    DomainRegistrationLength,
    #[serde(rename = "Favicon")]
    Favicon,
    #[serde(rename = "port")]
    Port,
    #[serde(rename = "HTTPS_token")]
    HttpsToken,
    #[serde(rename = "Request_URL")]
    RequestUrl,
    #[serde(rename = "URL_of_Anchor")]
    UrlOfAnchor,
    #[serde(rename = "Links_in_tags")]
    LinksInTags,
    #[serde(rename = "SFH")]
    Sfh,
    #[serde(rename = "Submitting_to_email")]
    SubmittingToEmail,
    #[serde(rename = "Abnormal_URL")]
    AbnormalUrl,
    #[serde(rename = "Redirect")]
    Redirect,
    #[serde(rename = "on_mouseover")]
    OnMouseover,
    #[serde(rename = "RightClick")]
    RightClick,
    #[serde(rename = "popUpWidnow")]
    PopUpWindow,
    #[serde(rename = "Iframe")]
    Iframe,
    #[serde(rename = "age_of_domain")]
    AgeOfDomain,
    #[serde(rename = "DNSRecord")]
    DnsRecord,
    #[serde(rename = "web_traffic")]
    WebTraffic,
    #[serde(rename = "Page_Rank")]
    PageRank,
    #[serde(rename = "Google_Index")]
    GoogleIndex,
    #[serde(rename = "Links_pointing_to_page")]
    LinksPointingToPage,
    #[serde(rename = "Statistical_report")]
    StatisticalReport,
}

impl FeatureName {
    /// All features in vector order
    pub const ALL: [FeatureName; FEATURE_COUNT] = [
        FeatureName::HavingIpAddress,
        FeatureName::UrlLength,
        FeatureName::ShorteningService,
        FeatureName::HavingAtSymbol,
        FeatureName::DoubleSlashRedirecting,
        FeatureName::PrefixSuffix,
        FeatureName::HavingSubDomain,
        FeatureName::SslFinalState,
        FeatureName::DomainRegistrationLength,
        FeatureName::Favicon,
        FeatureName::Port,
        FeatureName::HttpsToken,
        FeatureName::RequestUrl,
        FeatureName::UrlOfAnchor,
        FeatureName::LinksInTags,
        FeatureName::Sfh,
        FeatureName::SubmittingToEmail,
        FeatureName::AbnormalUrl,
        FeatureName::Redirect,
        FeatureName::OnMouseover,
        FeatureName::RightClick,
        FeatureName::PopUpWindow,
        FeatureName::Iframe,
        FeatureName::AgeOfDomain,
        FeatureName::DnsRecord,
        FeatureName::WebTraffic,
        FeatureName::PageRank,
        FeatureName::GoogleIndex,
        FeatureName::LinksPointingToPage,
        FeatureName::StatisticalReport,
    ];

    /// Column name as used by the training data and the scoring artifact
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureName::HavingIpAddress => "having_IP_Address",
            FeatureName::UrlLength => "URL_Length",
            FeatureName::ShorteningService => "Shortining_Service",
            FeatureName::HavingAtSymbol => "having_At_Symbol",
            FeatureName::DoubleSlashRedirecting => "double_slash_redirecting",
            FeatureName::PrefixSuffix => "Prefix_Suffix",
            FeatureName::HavingSubDomain => "having_Sub_Domain",
            FeatureName::SslFinalState => "SSLfinal_State",
            FeatureName::DomainRegistrationLength => "Domain_registeration_length",
            FeatureName::Favicon => "Favicon",
            FeatureName::Port => "port",
            FeatureName::HttpsToken => "HTTPS_token",
            FeatureName::RequestUrl => "Request_URL",
            FeatureName::UrlOfAnchor => "URL_of_Anchor",
            FeatureName::LinksInTags => "Links_in_tags",
            FeatureName::Sfh => "SFH",
            FeatureName::SubmittingToEmail => "Submitting_to_email",
            FeatureName::AbnormalUrl => "Abnormal_URL",
            FeatureName::Redirect => "Redirect",
            FeatureName::OnMouseover => "on_mouseover",
            FeatureName::RightClick => "RightClick",
            FeatureName::PopUpWindow => "popUpWidnow",
            FeatureName::Iframe => "Iframe",
            FeatureName::AgeOfDomain => "age_of_domain",
            FeatureName::DnsRecord => "DNSRecord",
            FeatureName::WebTraffic => "web_traffic",
            FeatureName::PageRank => "Page_Rank",
            FeatureName::GoogleIndex => "Google_Index",
            FeatureName::LinksPointingToPage => "Links_pointing_to_page",
            FeatureName::StatisticalReport => "Statistical_report",
        }
    }

    /// Slot index within a feature vector
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Whether the feature is computed from the URL string alone.
    ///
    /// The remaining features need page content, WHOIS/DNS or reputation
    /// services and are served by constant providers unless overridden.
    pub fn is_lexical(&self) -> bool {
        matches!(
            self,
            FeatureName::HavingIpAddress
                | FeatureName::UrlLength
                | FeatureName::ShorteningService
                | FeatureName::HavingAtSymbol
                | FeatureName::DoubleSlashRedirecting
                | FeatureName::PrefixSuffix
                | FeatureName::HavingSubDomain
                | FeatureName::SslFinalState
                | FeatureName::HttpsToken
                | FeatureName::SubmittingToEmail
        )
    }

    /// Value the training data used for a feature that is not computed
    pub fn training_default(&self) -> f64 {
        match self {
            FeatureName::Port | FeatureName::Redirect => 0.0,
            _ => 1.0,
        }
    }

    /// Names of all features in vector order
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.as_str()).collect()
    }
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureName::ALL
            .iter()
            .find(|f| f.as_str() == s)
            .copied()
            .ok_or_else(|| CoreError::UnknownFeature(s.to_string()))
    }
}

/// Ordered, fixed-length numeric encoding of a URL
///
/// A vector always carries exactly [`FEATURE_COUNT`] values and is immutable
/// once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Create a vector from values in schema order
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Create a vector from a slice, rejecting any other length
    pub fn try_from_slice(values: &[f64]) -> Result<Self, CoreError> {
        let values: [f64; FEATURE_COUNT] = values.try_into().map_err(|_| {
            CoreError::InvalidValue(format!(
                "feature vector must have {} values, got {}",
                FEATURE_COUNT,
                values.len()
            ))
        })?;
        Ok(Self { values })
    }

    /// Value of a named feature
    pub fn get(&self, name: FeatureName) -> f64 {
        self.values[name.index()]
    }

    /// Raw values in schema order
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    /// Number of slots (always [`FEATURE_COUNT`])
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over (name, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (FeatureName, f64)> + '_ {
        FeatureName::ALL.iter().copied().zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_order_matches_indices() {
        for (i, name) in FeatureName::ALL.iter().enumerate() {
            assert_eq!(name.index(), i);
        }
    }

    #[test]
    fn test_names_roundtrip_through_from_str() {
        for name in FeatureName::ALL {
            assert_eq!(name.as_str().parse::<FeatureName>().unwrap(), name);
        }
        assert!("Shortening_Service".parse::<FeatureName>().is_err());
    }

    #[test]
    fn test_lexical_and_placeholder_split() {
        let lexical = FeatureName::ALL.iter().filter(|f| f.is_lexical()).count();
        assert_eq!(lexical, 10);
        assert_eq!(FEATURE_COUNT - lexical, 20);
    }

    #[test]
    fn test_training_defaults() {
        assert_eq!(FeatureName::Port.training_default(), 0.0);
        assert_eq!(FeatureName::Redirect.training_default(), 0.0);
        assert_eq!(FeatureName::Favicon.training_default(), 1.0);
        assert_eq!(FeatureName::StatisticalReport.training_default(), 1.0);
    }

    #[test]
    fn test_serde_uses_training_names() {
        let json = serde_json::to_string(&FeatureName::PopUpWindow).unwrap();
        assert_eq!(json, "\"popUpWidnow\"");

        let parsed: FeatureName = serde_json::from_str("\"Domain_registeration_length\"").unwrap();
        assert_eq!(parsed, FeatureName::DomainRegistrationLength);
    }

    #[test]
    fn test_vector_from_slice_rejects_wrong_length() {
        assert!(FeatureVector::try_from_slice(&[0.0; 29]).is_err());
        assert!(FeatureVector::try_from_slice(&[0.0; 31]).is_err());
        assert!(FeatureVector::try_from_slice(&[0.0; 30]).is_ok());
    }

    #[test]
    fn test_vector_get_by_name() {
        let mut values = [0.0; FEATURE_COUNT];
        values[FeatureName::UrlLength.index()] = 42.0;
        let vector = FeatureVector::from_values(values);

        assert_eq!(vector.get(FeatureName::UrlLength), 42.0);
        assert_eq!(vector.len(), FEATURE_COUNT);
        assert_eq!(vector.iter().count(), FEATURE_COUNT);
    }
}
