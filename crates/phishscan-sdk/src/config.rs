//! Configuration types for the Classifier

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const DEFAULT_STORE_TIMEOUT_MS: u64 = 2000;

fn default_store_timeout_ms() -> u64 {
    DEFAULT_STORE_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

/// Main classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Path to the scoring artifact
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    /// Verdict store and audit log backend
    #[serde(default)]
    pub store: StoreConfig,

    /// Bound on each store call, in milliseconds
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,

    /// What to do when the store fails or times out
    #[serde(default)]
    pub store_failure_policy: StoreFailurePolicy,

    /// Shortener domain fragments; the built-in list when absent
    #[serde(default)]
    pub shortening_services: Option<Vec<String>>,

    /// Constant overrides keyed by training column name
    #[serde(default)]
    pub feature_defaults: HashMap<String, f64>,

    /// Public suffix list file; the built-in rule set when absent
    #[serde(default)]
    pub public_suffix_list: Option<PathBuf>,

    /// Also honour the private-domain section of the suffix list
    #[serde(default)]
    pub include_private_suffixes: bool,

    /// Enable metrics collection
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

impl ClassifierConfig {
    pub fn new() -> Self {
        Self {
            model_path: None,
            store: StoreConfig::default(),
            store_timeout_ms: DEFAULT_STORE_TIMEOUT_MS,
            store_failure_policy: StoreFailurePolicy::default(),
            shortening_services: None,
            feature_defaults: HashMap::new(),
            public_suffix_list: None,
            include_private_suffixes: false,
            enable_metrics: true,
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!("Loaded classifier configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_store_failure_policy(mut self, policy: StoreFailurePolicy) -> Self {
        self.store_failure_policy = policy;
        self
    }

    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend type
    #[serde(rename = "type", default)]
    pub store_type: StoreType,

    /// Backend location, e.g. the SQLite database path
    #[serde(default)]
    pub connection: Option<String>,
}

impl StoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn sqlite(path: impl Into<String>) -> Self {
        Self {
            store_type: StoreType::Sqlite,
            connection: Some(path.into()),
        }
    }
}

/// Store type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    #[default]
    Memory,
    Sqlite,
}

/// Behaviour when the verdict store errors or times out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFailurePolicy {
    /// Return a fresh, uncached verdict
    #[default]
    Degrade,
    /// Fail the request
    Strict,
}
