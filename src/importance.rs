//! Importance Table
//!
//! Global feature-importance weights produced at training time, stored as
//! a flat `{name: weight}` JSON object. Read-only in the serving path; the
//! scorer only ever ranks the table and takes the head.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ArtifactLoadError;
use crate::schema::FeatureSchema;

/// One ranked explanation entry in an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub feature: String,
    pub importance: f64,
}

/// Feature name → global importance weight
///
/// Kept in a BTreeMap so iteration (and the stored JSON) is always in
/// name order, which keeps ranking ties deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImportanceTable {
    weights: BTreeMap<String, f64>,
}

impl ImportanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: &str, weight: f64) {
        self.weights.insert(feature.to_string(), weight);
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.weights.get(feature).copied()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Check the table against the schema it ships with
    ///
    /// Weights must be finite and non-negative and every name must exist
    /// in the schema. The weights conventionally sum to 1 across the
    /// table; deviation is only logged since it does not affect ranking.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), ArtifactLoadError> {
        let mut sum = 0.0;
        for (name, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ArtifactLoadError::Invalid(format!(
                    "importance weight for '{}' must be non-negative, got {}",
                    name, weight
                )));
            }
            if schema.feature_index(name).is_none() {
                return Err(ArtifactLoadError::Invalid(format!(
                    "importance table names unknown feature '{}'",
                    name
                )));
            }
            sum += weight;
        }
        if !self.weights.is_empty() && (sum - 1.0).abs() > 1e-6 {
            log::warn!("Importance weights sum to {:.6} (expected 1)", sum);
        }
        Ok(())
    }

    /// Top-k factors by weight, descending
    ///
    /// Equal weights rank alphabetically by feature name: iteration is
    /// already in name order and the sort is stable, so ties keep that
    /// order. Returns min(k, table size) entries.
    pub fn top_k(&self, k: usize) -> Vec<RiskFactor> {
        let mut factors: Vec<RiskFactor> = self
            .weights
            .iter()
            .map(|(feature, importance)| RiskFactor {
                feature: feature.clone(),
                importance: *importance,
            })
            .collect();

        factors.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        factors.truncate(k);
        factors
    }
}

// ============================================================================
// TESTS
// ============================================================================
