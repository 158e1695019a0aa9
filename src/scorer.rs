//! Risk Scorer
//!
//! The pipeline orchestrator: vectorize → normalize → classify → attach
//! top factors. Pure given fixed artifacts; all cross-artifact dimension
//! checks happen once at construction so a mismatched bundle can never
//! reach request handling.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_DECISION_THRESHOLD, DEFAULT_TOP_FACTORS};
use crate::error::{ArtifactLoadError, ScoreResult};
use crate::importance::{ImportanceTable, RiskFactor};
use crate::model::Classifier;
use crate::record::ApplicantRecord;
use crate::scaler::StandardScaler;
use crate::schema::FeatureSchema;

// ============================================================================
// CONFIG
// ============================================================================

/// Serving-side tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Probability at or above which the applicant is called a default
    pub decision_threshold: f64,
    /// Number of risk factors attached to each assessment
    pub top_factors: usize,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
            top_factors: DEFAULT_TOP_FACTORS,
        }
    }
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Scoring result for one applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub will_default: bool,
    /// Positive-class probability in [0, 1]
    pub default_probability: f64,
    /// Global top factors, weight-descending
    pub risk_factors: Vec<RiskFactor>,
}

// ============================================================================
// SCORER
// ============================================================================

/// Fully validated pipeline over one loaded artifact bundle
pub struct RiskScorer {
    schema: FeatureSchema,
    scaler: StandardScaler,
    classifier: Box<dyn Classifier>,
    importance: ImportanceTable,
    config: ScorerConfig,
}

impl RiskScorer {
    /// Assemble a scorer, cross-checking every artifact dimension
    pub fn new(
        schema: FeatureSchema,
        scaler: StandardScaler,
        classifier: Box<dyn Classifier>,
        importance: ImportanceTable,
        config: ScorerConfig,
    ) -> Result<Self, ArtifactLoadError> {
        schema.validate()?;
        scaler.validate()?;
        importance.validate(&schema)?;

        let expected = schema.len();
        if scaler.n_features() != expected {
            return Err(ArtifactLoadError::Invalid(format!(
                "scaler fitted on {} features but schema has {}",
                scaler.n_features(),
                expected
            )));
        }
        if classifier.n_features() != expected {
            return Err(ArtifactLoadError::Invalid(format!(
                "classifier fitted on {} features but schema has {}",
                classifier.n_features(),
                expected
            )));
        }
        if !config.decision_threshold.is_finite()
            || config.decision_threshold <= 0.0
            || config.decision_threshold >= 1.0
        {
            return Err(ArtifactLoadError::Invalid(format!(
                "decision threshold {} outside (0, 1)",
                config.decision_threshold
            )));
        }

        Ok(Self {
            schema,
            scaler,
            classifier,
            importance,
            config,
        })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn n_features(&self) -> usize {
        self.schema.len()
    }

    /// Score one applicant record
    ///
    /// Pure and idempotent: same record + same artifacts → same output.
    /// All failures surface here synchronously; nothing is retried.
    pub fn assess(&self, record: &ApplicantRecord) -> ScoreResult<RiskAssessment> {
        let vector = self.schema.vectorize(record)?;
        let normalized = self.scaler.normalize(&vector)?;
        let prediction = self
            .classifier
            .predict(&normalized, self.config.decision_threshold)?;
        let risk_factors = self.importance.top_k(self.config.top_factors);

        log::debug!(
            "Assessed applicant: p={:.4} will_default={}",
            prediction.probability,
            prediction.will_default
        );

        Ok(RiskAssessment {
            will_default: prediction.will_default,
            default_probability: prediction.probability,
            risk_factors,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
