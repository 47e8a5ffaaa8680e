//! Classification outcomes

use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Probabilities strictly above this value are labelled phishing
pub const PHISHING_THRESHOLD: f64 = 0.5;

/// Classification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    Phishing,
    Legitimate,
}

impl Label {
    /// Derive a label from the phishing-class probability.
    ///
    /// The comparison is strict, so exactly 0.5 resolves to `Legitimate`.
    pub fn from_probability(probability: f64) -> Self {
        if probability > PHISHING_THRESHOLD {
            Label::Phishing
        } else {
            Label::Legitimate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "Phishing",
            Label::Legitimate => "Legitimate",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Phishing" => Ok(Label::Phishing),
            "Legitimate" => Ok(Label::Legitimate),
            other => Err(CoreError::UnknownLabel(other.to_string())),
        }
    }
}

/// Classification outcome for a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// URL exactly as submitted
    pub url: String,

    /// Derived label
    pub label: Label,

    /// Raw phishing-class probability in [0, 1]
    pub confidence: f64,

    /// When the verdict was first computed
    pub timestamp: DateTime<Utc>,
}

impl Verdict {
    /// Build a verdict from a probability, deriving the label
    pub fn from_probability(url: impl Into<String>, probability: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            url: url.into(),
            label: Label::from_probability(probability),
            confidence: probability,
            timestamp,
        }
    }

    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }
}

/// Where a returned verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictSource {
    /// Rehydrated from the classification cache
    Cache,
    /// Computed by extraction and scoring on this call
    Fresh,
}

/// Append-only audit entry written when a user reports a URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub user: String,
    pub url: String,
    pub prediction: Label,
    pub timestamp: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(user: impl Into<String>, verdict: &Verdict, timestamp: DateTime<Utc>) -> Self {
        Self {
            user: user.into(),
            url: verdict.url.clone(),
            prediction: verdict.label,
            timestamp,
        }
    }
}
