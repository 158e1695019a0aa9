//! Decision Forest Artifact
//!
//! The concrete classifier this crate ships: an averaged ensemble of
//! binary decision trees, serialized as JSON at training time. Split
//! semantics follow the usual convention (go left when
//! `x[feature] <= threshold`), the forest probability is the mean of the
//! per-tree leaf probabilities.
//!
//! Everything is validated once at load; evaluation assumes a valid tree.

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ScoreResult};
use crate::model::Classifier;
use crate::schema::check_dimensions;

// ============================================================================
// TREE STRUCTURE
// ============================================================================

/// One node of a fitted decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        /// Index into the schema-ordered feature vector
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        /// Positive-class fraction at this leaf, in [0, 1]
        probability: f64,
    },
}

impl TreeNode {
    /// Walk the tree for one normalized vector
    fn evaluate(&self, vector: &[f64]) -> f64 {
        match self {
            TreeNode::Leaf { probability } => *probability,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if vector[*feature] <= *threshold {
                    left.evaluate(vector)
                } else {
                    right.evaluate(vector)
                }
            }
        }
    }

    fn validate(&self, n_features: usize) -> Result<(), ArtifactLoadError> {
        match self {
            TreeNode::Leaf { probability } => {
                if !probability.is_finite() || !(0.0..=1.0).contains(probability) {
                    return Err(ArtifactLoadError::Invalid(format!(
                        "leaf probability {} outside [0, 1]",
                        probability
                    )));
                }
                Ok(())
            }
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(ArtifactLoadError::Invalid(format!(
                        "split on feature index {} but model has {} features",
                        feature, n_features
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ArtifactLoadError::Invalid(format!(
                        "split threshold on feature {} is not finite",
                        feature
                    )));
                }
                left.validate(n_features)?;
                right.validate(n_features)
            }
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Fitted tree ensemble, the stored classifier artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionForest {
    pub n_features: usize,
    pub trees: Vec<TreeNode>,
}

impl DecisionForest {
    /// Build from fitted trees, validating the ensemble
    pub fn from_trees(n_features: usize, trees: Vec<TreeNode>) -> Result<Self, ArtifactLoadError> {
        let forest = Self { n_features, trees };
        forest.validate()?;
        Ok(forest)
    }

    /// Structural check, run after deserializing stored state
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.n_features == 0 {
            return Err(ArtifactLoadError::Invalid(
                "model declares zero features".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(ArtifactLoadError::Invalid(
                "model has no trees".to_string(),
            ));
        }
        for tree in &self.trees {
            tree.validate(self.n_features)?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for DecisionForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, vector: &[f64]) -> ScoreResult<f64> {
        check_dimensions(self.n_features, vector.len())?;
        let sum: f64 = self.trees.iter().map(|t| t.evaluate(vector)).sum();
        Ok(sum / self.trees.len() as f64)
    }
}

// ============================================================================
// TESTS
// ============================================================================
