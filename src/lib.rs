//! BNPL Default Risk Scoring Core
//!
//! Estimates the probability that a buy-now-pay-later applicant will
//! default and explains the estimate via the top contributing factors.
//!
//! ## Pipeline
//! record → schema vectorization → standard scaling → classifier →
//! probability + label → top risk factors → [`RiskAssessment`]
//!
//! ## Architecture
//! - `schema` - versioned, hash-checked feature ordering
//! - `scaler` / `model` - fitted artifacts, consumed read-only
//! - `scorer` - the pipeline orchestrator
//! - `store` - bundle persistence and the process-wide artifact handle
//! - `limits` - risk bands and credit limit policy

// Core pipeline
pub mod error;
pub mod importance;
pub mod model;
pub mod record;
pub mod scaler;
pub mod schema;
pub mod scorer;

// Artifacts & policy
pub mod constants;
pub mod limits;
pub mod store;


// Re-export common types
pub use error::{ArtifactLoadError, ScoreError, ScoreResult};
pub use importance::{ImportanceTable, RiskFactor};
pub use model::{Classifier, DecisionForest, Prediction, TreeNode};
pub use record::ApplicantRecord;
pub use scaler::StandardScaler;
pub use schema::FeatureSchema;
pub use scorer::{RiskAssessment, RiskScorer, ScorerConfig};
