//! Classifier initialization
//!
//! Converts the server configuration into SDK configuration and builds the
//! shared [`Classifier`]. The scoring artifact is loaded exactly once here.

use crate::config::ServerConfig;
use anyhow::{Context, Result};
use phishscan_sdk::{Classifier, ClassifierBuilder};
use tracing::info;

/// Initialize the classifier
pub async fn init_classifier(config: &ServerConfig) -> Result<Classifier> {
    info!(
        "Loading scoring artifact from {} (store: {:?}, policy: {:?})",
        config.model_path.display(),
        config.store.store_type,
        config.store_failure_policy
    );

    let classifier = ClassifierBuilder::from_config(config.classifier_config())
        .build()
        .await
        .with_context(|| {
            format!(
                "failed to initialize classifier from {}",
                config.model_path.display()
            )
        })?;

    if let Some(artifact) = classifier.artifact_info() {
        info!(
            "Scoring artifact ready: {} trees, objective {}, sha256 {}",
            artifact.num_trees, artifact.objective, artifact.sha256
        );
    }

    Ok(classifier)
}
