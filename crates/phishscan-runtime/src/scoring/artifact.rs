//! Scoring artifact loading
//!
//! Reads a gradient-boosted tree ensemble saved in the XGBoost JSON model
//! format and validates it against the feature schema. Everything that can be
//! checked without a feature vector is checked here, so a loaded artifact can
//! only fail at scoring time on non-finite output.

use crate::error::{Result, RuntimeError};
use phishscan_core::{FeatureName, FeatureVector, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::info;

const SUPPORTED_OBJECTIVES: [&str; 2] = ["binary:logistic", "reg:logistic"];

// ---------------------------------------------------------------------------
// On-disk JSON layout
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ModelFile {
    learner: LearnerJson,
    #[serde(default)]
    version: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct LearnerJson {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: BoosterJson,
    learner_model_param: LearnerModelParam,
    objective: ObjectiveJson,
}

#[derive(Debug, Deserialize)]
struct BoosterJson {
    name: String,
    #[serde(default)]
    model: Option<GbTreeModel>,
}

#[derive(Debug, Deserialize)]
struct GbTreeModel {
    trees: Vec<TreeJson>,
    #[serde(default)]
    tree_info: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct LearnerModelParam {
    base_score: String,
    num_feature: String,
    #[serde(default)]
    num_class: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectiveJson {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TreeJson {
    left_children: Vec<i64>,
    right_children: Vec<i64>,
    split_indices: Vec<i64>,
    split_conditions: Vec<f32>,
    default_left: Vec<Flag>,
    #[serde(default)]
    split_type: Vec<i64>,
}

/// `default_left` is written as 0/1 by some versions and as booleans by others
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i != 0,
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory model
// ---------------------------------------------------------------------------

const LEAF: i64 = -1;

#[derive(Debug, Clone)]
struct Node {
    left: i64,
    right: i64,
    feature: usize,
    /// Split threshold for internal nodes, leaf value for leaves
    value: f32,
    default_left: bool,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.left == LEAF
    }
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_json(index: usize, json: TreeJson) -> Result<Self> {
        let len = json.left_children.len();
        let corrupt = |reason: String| RuntimeError::ArtifactLoad {
            path: String::new(),
            reason: format!("tree {}: {}", index, reason),
        };

        if len == 0 {
            return Err(corrupt("tree has no nodes".to_string()));
        }
        if json.right_children.len() != len
            || json.split_indices.len() != len
            || json.split_conditions.len() != len
            || json.default_left.len() != len
        {
            return Err(corrupt("node arrays have different lengths".to_string()));
        }
        if json.split_type.iter().any(|t| *t != 0) {
            return Err(corrupt("categorical splits are not supported".to_string()));
        }

        let mut nodes = Vec::with_capacity(len);
        for i in 0..len {
            let left = json.left_children[i];
            let right = json.right_children[i];

            if left == LEAF {
                if right != LEAF {
                    return Err(corrupt(format!("node {} has only one child", i)));
                }
            } else {
                // Children always follow their parent, which also rules out cycles
                for child in [left, right] {
                    if child <= i as i64 || child >= len as i64 {
                        return Err(corrupt(format!("node {} has invalid child {}", i, child)));
                    }
                }

                let feature = json.split_indices[i];
                if feature < 0 || feature >= FEATURE_COUNT as i64 {
                    return Err(RuntimeError::SchemaMismatch(format!(
                        "tree {} node {} splits on feature index {} but vectors have {} slots",
                        index, i, feature, FEATURE_COUNT
                    )));
                }
            }

            nodes.push(Node {
                left,
                right,
                feature: json.split_indices[i].max(0) as usize,
                value: json.split_conditions[i],
                default_left: json.default_left[i].is_set(),
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_value(&self, features: &[f32; FEATURE_COUNT]) -> f32 {
        let mut node = &self.nodes[0];

        while !node.is_leaf() {
            let value = features[node.feature];
            let next = if value.is_nan() {
                if node.default_left {
                    node.left
                } else {
                    node.right
                }
            } else if value < node.value {
                node.left
            } else {
                node.right
            };
            node = &self.nodes[next as usize];
        }

        node.value
    }
}

/// Identity of a loaded artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactInfo {
    /// Where the artifact was loaded from
    pub path: String,

    /// Version of the library that wrote the file, e.g. "1.7.6"
    pub format_version: String,

    pub num_trees: usize,

    pub objective: String,

    /// SHA-256 of the file contents, hex encoded
    pub sha256: String,
}

/// Immutable, validated tree ensemble
#[derive(Debug, Clone)]
pub struct ScoringArtifact {
    trees: Vec<Tree>,
    base_margin: f32,
    info: ArtifactInfo,
}

impl ScoringArtifact {
    /// Load and validate an artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| RuntimeError::ArtifactLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let artifact = Self::from_slice(&bytes, &path.display().to_string())?;
        info!(
            "Loaded scoring artifact {} ({} trees, objective {}, sha256 {})",
            artifact.info.path, artifact.info.num_trees, artifact.info.objective, artifact.info.sha256
        );
        Ok(artifact)
    }

    /// Parse and validate artifact bytes; `origin` is used in errors and info
    pub fn from_slice(bytes: &[u8], origin: &str) -> Result<Self> {
        let with_origin = |err: RuntimeError| match err {
            RuntimeError::ArtifactLoad { reason, .. } => RuntimeError::ArtifactLoad {
                path: origin.to_string(),
                reason,
            },
            other => other,
        };
        Self::parse(bytes, origin).map_err(with_origin)
    }

    fn parse(bytes: &[u8], origin: &str) -> Result<Self> {
        let load_error = |reason: String| RuntimeError::ArtifactLoad {
            path: origin.to_string(),
            reason,
        };

        let model: ModelFile = serde_json::from_slice(bytes)
            .map_err(|e| load_error(format!("invalid model JSON: {}", e)))?;
        let learner = model.learner;

        let objective = learner.objective.name;
        if !SUPPORTED_OBJECTIVES.contains(&objective.as_str()) {
            return Err(load_error(format!("unsupported objective '{}'", objective)));
        }

        if let Some(num_class) = &learner.learner_model_param.num_class {
            if num_class.parse::<u32>().unwrap_or(0) > 1 {
                return Err(load_error(format!(
                    "multi-class artifacts are not supported (num_class = {})",
                    num_class
                )));
            }
        }

        Self::check_schema(&learner.feature_names, &learner.learner_model_param.num_feature)?;

        if learner.gradient_booster.name != "gbtree" {
            return Err(load_error(format!(
                "unsupported booster '{}'",
                learner.gradient_booster.name
            )));
        }
        let booster = learner
            .gradient_booster
            .model
            .ok_or_else(|| load_error("booster has no model section".to_string()))?;

        if booster.tree_info.iter().any(|group| *group != 0) {
            return Err(load_error("trees reference more than one output group".to_string()));
        }

        let trees = booster
            .trees
            .into_iter()
            .enumerate()
            .map(|(i, tree)| Tree::from_json(i, tree))
            .collect::<Result<Vec<_>>>()?;

        let base_score = parse_base_score(&learner.learner_model_param.base_score)
            .map_err(load_error)?;

        let format_version = model
            .version
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(".");

        Ok(Self {
            base_margin: (base_score / (1.0 - base_score)).ln(),
            info: ArtifactInfo {
                path: origin.to_string(),
                format_version,
                num_trees: trees.len(),
                objective,
                sha256: hex::encode(Sha256::digest(bytes)),
            },
            trees,
        })
    }

    /// The artifact must have been trained on exactly our columns, in order
    fn check_schema(feature_names: &[String], num_feature: &str) -> Result<()> {
        let num_feature: usize = num_feature.trim().parse().map_err(|_| {
            RuntimeError::SchemaMismatch(format!("unreadable num_feature '{}'", num_feature))
        })?;

        if num_feature != FEATURE_COUNT {
            return Err(RuntimeError::SchemaMismatch(format!(
                "artifact expects {} features, vectors have {}",
                num_feature, FEATURE_COUNT
            )));
        }

        if feature_names.is_empty() {
            return Ok(());
        }

        if feature_names.len() != FEATURE_COUNT {
            return Err(RuntimeError::SchemaMismatch(format!(
                "artifact names {} features, vectors have {}",
                feature_names.len(),
                FEATURE_COUNT
            )));
        }

        for (position, (expected, found)) in FeatureName::ALL.iter().zip(feature_names).enumerate() {
            if expected.as_str() != found {
                return Err(RuntimeError::SchemaMismatch(format!(
                    "feature {} is '{}' in the artifact but '{}' in the vector",
                    position, found, expected
                )));
            }
        }

        Ok(())
    }

    /// Phishing-class probability for `vector`
    pub fn predict(&self, vector: &FeatureVector) -> Result<f64> {
        let mut features = [0.0f32; FEATURE_COUNT];
        for (slot, value) in features.iter_mut().zip(vector.values()) {
            *slot = *value as f32;
        }

        let margin = self
            .trees
            .iter()
            .fold(self.base_margin, |acc, tree| acc + tree.leaf_value(&features));
        let probability = 1.0 / (1.0 + (-margin).exp());

        if !probability.is_finite() {
            return Err(RuntimeError::Scoring(format!(
                "non-finite probability from margin {}",
                margin
            )));
        }

        Ok(probability as f64)
    }

    pub fn info(&self) -> &ArtifactInfo {
        &self.info
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

/// `base_score` is stored as "5E-1" or, by newer writers, "[5E-1]"
fn parse_base_score(raw: &str) -> std::result::Result<f32, String> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    let score: f32 = trimmed
        .parse()
        .map_err(|_| format!("unreadable base_score '{}'", raw))?;

    if score <= 0.0 || score >= 1.0 {
        return Err(format!("base_score {} is outside (0, 1)", score));
    }
    Ok(score)
}
