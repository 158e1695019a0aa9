//! Error Types
//!
//! Two audiences: `ScoreError` goes back to whoever submitted the record
//! (they can fix the request), `ArtifactLoadError` goes to the operator
//! (the bundle on disk is missing or bad). Nothing here is retried
//! internally; every failure surfaces synchronously.

use thiserror::Error;

pub type ScoreResult<T> = Result<T, ScoreError>;

// ============================================================================
// SCORING ERRORS (per-request)
// ============================================================================

/// Errors surfaced while scoring a single applicant record
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Record lacks a feature the schema requires
    #[error("missing required feature '{feature}'")]
    MissingFeature { feature: String },

    /// Record carries a non-numeric value for a schema feature
    #[error("feature '{feature}' is not numeric (got {found})")]
    TypeMismatch { feature: String, found: String },

    /// Vector length disagrees with the fitted dimensionality
    #[error("schema mismatch: expected {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// Artifacts were never loaded or the bundle failed validation
    #[error("artifacts unavailable: {0}")]
    Artifacts(#[from] ArtifactLoadError),
}

// ============================================================================
// ARTIFACT ERRORS (load/startup)
// ============================================================================

/// Errors surfaced while loading or validating an artifact bundle
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Artifact content fails a consistency check (message says which)
    #[error("invalid artifact: {0}")]
    Invalid(String),

    /// File content does not match the checksum recorded in the manifest
    #[error("checksum mismatch for '{file}'")]
    ChecksumMismatch { file: String },

    /// Stored feature layout disagrees with the one the caller expects
    #[error("feature layout mismatch: expected v{expected_version} (hash {expected_hash:08x}), got v{actual_version} (hash {actual_hash:08x})")]
    LayoutMismatch {
        expected_version: u32,
        expected_hash: u32,
        actual_version: u32,
        actual_hash: u32,
    },

    /// No bundle has been published to the process-wide handle yet
    #[error("model artifacts not loaded")]
    NotLoaded,
}
