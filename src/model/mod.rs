//! Classifier Seam
//!
//! The classifier is a fitted black box: normalized vector in, default
//! probability out. Kept behind a trait so the artifact format can be
//! swapped without touching the scoring pipeline.

pub mod forest;

pub use forest::{DecisionForest, TreeNode};

use serde::{Deserialize, Serialize};

use crate::error::ScoreResult;

// ============================================================================
// PREDICTION OUTPUT
// ============================================================================

/// Binary call plus the probability it was derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub will_default: bool,
    /// Positive-class probability in [0, 1]
    pub probability: f64,
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Fitted binary classifier over normalized feature vectors
pub trait Classifier: Send + Sync {
    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    /// Positive-class (will-default) probability for a normalized vector
    fn predict_proba(&self, vector: &[f64]) -> ScoreResult<f64>;

    /// Binary call at the given decision threshold
    ///
    /// The label is always derived from the probability here, so
    /// `will_default == (probability >= threshold)` holds for every
    /// implementation. The probability is never a thresholded transform
    /// of the label.
    fn predict(&self, vector: &[f64], threshold: f64) -> ScoreResult<Prediction> {
        let probability = self.predict_proba(vector)?;
        Ok(Prediction {
            will_default: probability >= threshold,
            probability,
        })
    }
}
