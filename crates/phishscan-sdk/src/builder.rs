//! Builder pattern for Classifier

use crate::classifier::Classifier;
use crate::config::{ClassifierConfig, StoreConfig, StoreFailurePolicy, StoreType};
use crate::error::{Result, SdkError};
use phishscan_core::FeatureName;
use phishscan_runtime::{
    AuditLog, ClassificationCache, FeatureExtractor, FeatureProvider, FeatureSource,
    MemoryAuditLog, MemoryStore, MetricsCollector, Scorer, ScoringEngine, SuffixList,
    VerdictStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Builder for Classifier
///
/// # Example
///
/// ```rust,ignore
/// use phishscan_sdk::{ClassifierBuilder, StoreConfig};
///
/// let classifier = ClassifierBuilder::new()
///     .with_model_path("models/xgboost_model.json")
///     .with_store_config(StoreConfig::sqlite("data/phishscan.db"))
///     .build()
///     .await?;
///
/// let classification = classifier.classify("https://bit.ly/abc123").await?;
/// ```
pub struct ClassifierBuilder {
    config: ClassifierConfig,
    feature_source: Option<Arc<dyn FeatureSource>>,
    providers: Vec<(FeatureName, Arc<dyn FeatureProvider>)>,
    scorer: Option<Arc<dyn Scorer>>,
    store: Option<Arc<dyn VerdictStore>>,
    audit_log: Option<Arc<dyn AuditLog>>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl ClassifierBuilder {
    pub fn new() -> Self {
        Self::from_config(ClassifierConfig::new())
    }

    /// Start from a loaded configuration
    pub fn from_config(config: ClassifierConfig) -> Self {
        Self {
            config,
            feature_source: None,
            providers: Vec::new(),
            scorer: None,
            store: None,
            audit_log: None,
            metrics: None,
        }
    }

    // ========== Scoring ==========

    /// Load the scoring artifact from `path` at build time
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = Some(path.into());
        self
    }

    /// Use an already constructed scorer instead of loading an artifact
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    // ========== Extraction ==========

    /// Use a custom feature source instead of the built-in extractor
    pub fn with_feature_source(mut self, source: Arc<dyn FeatureSource>) -> Self {
        self.feature_source = Some(source);
        self
    }

    /// Serve one slot of the built-in extractor from `provider`
    pub fn with_feature_provider(
        mut self,
        name: FeatureName,
        provider: Arc<dyn FeatureProvider>,
    ) -> Self {
        self.providers.push((name, provider));
        self
    }

    /// Override the constant emitted for a slot
    pub fn with_feature_default(mut self, name: FeatureName, value: f64) -> Self {
        self.config
            .feature_defaults
            .insert(name.as_str().to_string(), value);
        self
    }

    pub fn with_shortening_services(mut self, services: Vec<String>) -> Self {
        self.config.shortening_services = Some(services);
        self
    }

    pub fn with_public_suffix_list(mut self, path: impl Into<PathBuf>, include_private: bool) -> Self {
        self.config.public_suffix_list = Some(path.into());
        self.config.include_private_suffixes = include_private;
        self
    }

    // ========== Storage ==========

    pub fn with_store_config(mut self, store: StoreConfig) -> Self {
        self.config.store = store;
        self
    }

    /// Use a custom verdict store
    pub fn with_store(mut self, store: Arc<dyn VerdictStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom audit log
    pub fn with_audit_log(mut self, audit_log: Arc<dyn AuditLog>) -> Self {
        self.audit_log = Some(audit_log);
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.config.store_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_store_failure_policy(mut self, policy: StoreFailurePolicy) -> Self {
        self.config.store_failure_policy = policy;
        self
    }

    // ========== Metrics ==========

    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.config.enable_metrics = enable;
        self
    }

    /// Share an existing metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the classifier
    ///
    /// Loads the scoring artifact and suffix list, so configuration and
    /// artifact problems surface here rather than on the first request.
    pub async fn build(self) -> Result<Classifier> {
        let scorer: Arc<dyn Scorer> = match self.scorer {
            Some(scorer) => scorer,
            None => {
                let path = self.config.model_path.clone().ok_or_else(|| {
                    SdkError::Config("no scoring artifact configured (model_path)".to_string())
                })?;
                let engine = tokio::task::spawn_blocking(move || ScoringEngine::load(path))
                    .await
                    .map_err(|e| SdkError::Config(format!("artifact loader panicked: {}", e)))??;
                Arc::new(engine)
            }
        };

        let extractor: Arc<dyn FeatureSource> = match self.feature_source {
            Some(source) => {
                if !self.providers.is_empty() {
                    return Err(SdkError::Config(
                        "feature providers require the built-in extractor".to_string(),
                    ));
                }
                source
            }
            None => Arc::new(Self::build_extractor(&self.config, self.providers)?),
        };

        let (store, audit_log) =
            Self::build_stores(&self.config.store, self.store, self.audit_log)?;

        let cache = ClassificationCache::new(store).with_timeout(self.config.store_timeout());
        let metrics = self.metrics.unwrap_or_default();

        info!(
            "Classifier ready (store: {:?}, policy: {:?}, timeout: {:?})",
            self.config.store.store_type,
            self.config.store_failure_policy,
            cache.timeout()
        );

        Ok(Classifier::new(
            extractor,
            scorer,
            cache,
            audit_log,
            self.config.store_failure_policy,
            metrics,
            self.config.enable_metrics,
        ))
    }

    fn build_extractor(
        config: &ClassifierConfig,
        providers: Vec<(FeatureName, Arc<dyn FeatureProvider>)>,
    ) -> Result<FeatureExtractor> {
        let mut extractor = FeatureExtractor::new();

        if let Some(path) = &config.public_suffix_list {
            extractor = extractor.with_suffix_list(SuffixList::from_file(
                path,
                config.include_private_suffixes,
            )?);
        } else if config.include_private_suffixes {
            extractor = extractor.with_suffix_list(SuffixList::builtin_with_private());
        }

        if let Some(services) = &config.shortening_services {
            extractor = extractor.with_shortening_services(services.clone());
        }

        for (name, value) in &config.feature_defaults {
            let feature = feature_from_config_key(name)?;
            extractor = extractor.with_constant(feature, *value);
        }

        for (name, provider) in providers {
            extractor = extractor.with_provider(name, provider);
        }

        Ok(extractor)
    }

    fn build_stores(
        config: &StoreConfig,
        store: Option<Arc<dyn VerdictStore>>,
        audit_log: Option<Arc<dyn AuditLog>>,
    ) -> Result<(Arc<dyn VerdictStore>, Arc<dyn AuditLog>)> {
        if let (Some(store), Some(audit_log)) = (&store, &audit_log) {
            return Ok((store.clone(), audit_log.clone()));
        }

        let (default_store, default_log): (Arc<dyn VerdictStore>, Arc<dyn AuditLog>) =
            match config.store_type {
                StoreType::Memory => (Arc::new(MemoryStore::new()), Arc::new(MemoryAuditLog::new())),
                StoreType::Sqlite => Self::sqlite_stores(config)?,
            };

        Ok((store.unwrap_or(default_store), audit_log.unwrap_or(default_log)))
    }

    #[cfg(feature = "sqlx")]
    fn sqlite_stores(config: &StoreConfig) -> Result<(Arc<dyn VerdictStore>, Arc<dyn AuditLog>)> {
        let path = config.connection.as_ref().ok_or_else(|| {
            SdkError::Config("sqlite store requires a connection path".to_string())
        })?;
        let sqlite = Arc::new(phishscan_runtime::SqliteStore::new(path));
        Ok((sqlite.clone(), sqlite))
    }

    #[cfg(not(feature = "sqlx"))]
    fn sqlite_stores(_config: &StoreConfig) -> Result<(Arc<dyn VerdictStore>, Arc<dyn AuditLog>)> {
        Err(SdkError::Config(
            "sqlite store requires the `sqlx` feature".to_string(),
        ))
    }
}

/// Layered config sources may fold key case, so fall back to a
/// case-insensitive match on the training name
fn feature_from_config_key(key: &str) -> Result<FeatureName> {
    match key.parse::<FeatureName>() {
        Ok(name) => Ok(name),
        Err(err) => FeatureName::ALL
            .iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(key))
            .copied()
            .ok_or_else(|| err.into()),
    }
}

impl Default for ClassifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
