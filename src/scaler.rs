//! Standard Scaler
//!
//! Z-score normalization with parameters learned from the training
//! population. Fitting happens on the training side; this crate only
//! consumes the fitted state and applies it verbatim.

use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ScoreResult};
use crate::schema::check_dimensions;

/// Fitted per-feature location/scale parameters, in schema order
///
/// The fitting side substitutes 1.0 for a zero-variance feature's scale,
/// so a stored scale of exactly 0.0 is an invalid artifact here rather
/// than something to patch up per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Build from already-fitted parameters, validating them
    pub fn from_parameters(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactLoadError> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Parameter sanity check, run after deserializing stored state
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.mean.is_empty() {
            return Err(ArtifactLoadError::Invalid(
                "scaler has no parameters".to_string(),
            ));
        }
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactLoadError::Invalid(format!(
                "scaler parameter lengths disagree: {} means, {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        for (i, m) in self.mean.iter().enumerate() {
            if !m.is_finite() {
                return Err(ArtifactLoadError::Invalid(format!(
                    "scaler mean[{}] is not finite",
                    i
                )));
            }
        }
        for (i, s) in self.scale.iter().enumerate() {
            if !s.is_finite() || *s <= 0.0 {
                return Err(ArtifactLoadError::Invalid(format!(
                    "scaler scale[{}] must be a positive finite number, got {}",
                    i, s
                )));
            }
        }
        Ok(())
    }

    /// Number of features the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Apply (x - mean) / scale element-wise
    pub fn normalize(&self, vector: &[f64]) -> ScoreResult<Vec<f64>> {
        check_dimensions(self.mean.len(), vector.len())?;
        Ok(vector
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
