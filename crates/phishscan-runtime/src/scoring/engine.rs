//! Scoring engine

use super::artifact::{ArtifactInfo, ScoringArtifact};
use crate::error::{Result, RuntimeError};
use phishscan_core::{FeatureVector, FEATURE_COUNT};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Anything that maps a feature vector to a phishing probability
pub trait Scorer: Send + Sync {
    /// Probability in [0, 1] that the vector describes a phishing URL
    fn score(&self, vector: &FeatureVector) -> Result<f64>;

    /// Identity of the underlying artifact, if any
    fn info(&self) -> Option<&ArtifactInfo> {
        None
    }
}

/// Scorer backed by a shared, immutable artifact
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    artifact: Arc<ScoringArtifact>,
}

impl ScoringEngine {
    pub fn new(artifact: ScoringArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    /// Load the artifact at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(ScoringArtifact::load(path)?))
    }

    pub fn artifact(&self) -> &ScoringArtifact {
        &self.artifact
    }
}

impl Scorer for ScoringEngine {
    fn score(&self, vector: &FeatureVector) -> Result<f64> {
        if vector.len() != FEATURE_COUNT {
            return Err(RuntimeError::SchemaMismatch(format!(
                "vector has {} slots, artifact expects {}",
                vector.len(),
                FEATURE_COUNT
            )));
        }

        let probability = self.artifact.predict(vector)?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(RuntimeError::Scoring(format!(
                "probability {} outside [0, 1]",
                probability
            )));
        }

        debug!("Scored vector: probability={:.6}", probability);
        Ok(probability)
    }

    fn info(&self) -> Option<&ArtifactInfo> {
        Some(self.artifact.info())
    }
}
