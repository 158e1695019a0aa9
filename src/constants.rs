//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! To change a default (threshold, artifact location), only edit this file.

/// Default decision threshold for the will-default call
///
/// A default probability at or above this value classifies the applicant
/// as likely to default. Matches the threshold the model was calibrated with.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Default number of risk factors returned with an assessment
pub const DEFAULT_TOP_FACTORS: usize = 3;

/// Environment variable overriding the artifact bundle directory
pub const MODEL_DIR_ENV: &str = "BNPL_MODEL_DIR";

/// Environment variable overriding the decision threshold
pub const DECISION_THRESHOLD_ENV: &str = "BNPL_DECISION_THRESHOLD";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name (also the data directory name)
pub const APP_NAME: &str = "bnpl-risk";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get decision threshold override from environment, if set
///
/// The threshold normally comes from the bundle manifest; this exists so
/// operators can experiment without re-issuing artifacts. Values outside
/// (0, 1) are ignored.
pub fn get_decision_threshold_override() -> Option<f64> {
    std::env::var(DECISION_THRESHOLD_ENV)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|t| *t > 0.0 && *t < 1.0)
}

/// Get artifact bundle directory override from environment, if set
pub fn get_model_dir_override() -> Option<std::path::PathBuf> {
    std::env::var(MODEL_DIR_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .map(std::path::PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold_in_range() {
        assert!(DEFAULT_DECISION_THRESHOLD > 0.0);
        assert!(DEFAULT_DECISION_THRESHOLD < 1.0);
    }

    #[test]
    fn test_no_override_without_env() {
        // Only meaningful when the variable is unset, which is the
        // normal test environment.
        if std::env::var(DECISION_THRESHOLD_ENV).is_err() {
            assert_eq!(get_decision_threshold_override(), None);
        }
    }
}
