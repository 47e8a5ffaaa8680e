//! Server configuration

use anyhow::Context;
use phishscan_sdk::{ClassifierConfig, StoreConfig, StoreFailurePolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,

    /// Server port (HTTP)
    pub port: u16,

    /// Log level for the phishscan crates when RUST_LOG is unset
    pub log_level: String,

    /// Enable metrics
    pub enable_metrics: bool,

    /// Scoring artifact path
    pub model_path: PathBuf,

    /// Verdict store and audit log backend
    pub store: StoreConfig,

    /// Bound on each store call, in milliseconds
    pub store_timeout_ms: u64,

    pub store_failure_policy: StoreFailurePolicy,

    pub shortening_services: Option<Vec<String>>,

    /// Constant overrides keyed by training column name
    pub feature_defaults: HashMap<String, f64>,

    pub public_suffix_list: Option<PathBuf>,

    pub include_private_suffixes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            enable_metrics: true,
            model_path: PathBuf::from("xgboost_model.json"),
            store: StoreConfig::memory(),
            store_timeout_ms: 2000,
            store_failure_policy: StoreFailurePolicy::Degrade,
            shortening_services: None,
            feature_defaults: HashMap::new(),
            public_suffix_list: None,
            include_private_suffixes: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config file
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        Self::load_from("config/server")
    }

    /// Load from `file` (extension optional) layered under `PHISHSCAN_*` variables
    ///
    /// A missing file falls back to defaults; an unreadable or malformed one is an error.
    pub fn load_from(file: &str) -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("PHISHSCAN")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load config from {}", file))?;

        config
            .try_deserialize()
            .context("Failed to deserialize config")
    }

    /// Tracing filter used when RUST_LOG is unset
    pub fn default_log_filter(&self) -> String {
        let level = &self.log_level;
        format!(
            "phishscan_server={level},phishscan_sdk={level},phishscan_runtime={level},tower_http=debug"
        )
    }

    /// Classifier settings carried by this configuration
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            model_path: Some(self.model_path.clone()),
            store: self.store.clone(),
            store_timeout_ms: self.store_timeout_ms,
            store_failure_policy: self.store_failure_policy,
            shortening_services: self.shortening_services.clone(),
            feature_defaults: self.feature_defaults.clone(),
            public_suffix_list: self.public_suffix_list.clone(),
            include_private_suffixes: self.include_private_suffixes,
            enable_metrics: self.enable_metrics,
        }
    }
}
