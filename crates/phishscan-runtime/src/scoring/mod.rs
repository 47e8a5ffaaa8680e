//! Model scoring
//!
//! Loads the tree-ensemble artifact once and evaluates feature vectors
//! against it.

pub mod artifact;
mod engine;

pub use artifact::{ArtifactInfo, ScoringArtifact};
pub use engine::{Scorer, ScoringEngine};
