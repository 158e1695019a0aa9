//! Feature Schema - Centralized Feature Definition
//!
//! **CRITICAL: the schema controls feature vector ordering**
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment the schema version
//! 2. Change order → increment the schema version
//! 3. Remove feature → increment the schema version
//!
//! The scaler and classifier are fitted against one exact ordering.
//! Reordering does not raise an error on its own; it silently corrupts
//! every prediction. That is why the schema is a stored, versioned,
//! hash-checked artifact rather than an implicit convention.

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactLoadError, ScoreError, ScoreResult};
use crate::record::ApplicantRecord;

// ============================================================================
// SCHEMA VERSION
// ============================================================================

/// Current canonical schema version
/// MUST be incremented when either canonical layout changes
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// CANONICAL LAYOUTS (Authoritative source)
// ============================================================================

/// Minimal applicant layout, in exact vector order
pub const MINIMAL_FEATURES: &[&str] = &[
    "age",                      // 0
    "annual_income",            // 1
    "credit_score",             // 2
    "employment_length_years",  // 3
    "debt_to_income_ratio",     // 4
    "number_of_credit_cards",   // 5
    "past_defaults",            // 6
    "monthly_rent",             // 7
    "savings_balance",          // 8
];

/// Extended applicant layout: the minimal features plus cash-flow and
/// credit-history measurements, in exact vector order
pub const EXTENDED_FEATURES: &[&str] = &[
    "age",                       // 0
    "annual_income",             // 1
    "credit_score",              // 2
    "employment_length_years",   // 3
    "debt_to_income_ratio",      // 4
    "number_of_credit_cards",    // 5
    "past_defaults",             // 6
    "monthly_rent",              // 7
    "savings_balance",           // 8
    "monthly_income",            // 9
    "monthly_expenses",          // 10
    "credit_utilization",        // 11
    "number_of_loans",           // 12
    "loan_payment_history",      // 13
    "bankruptcy_history",        // 14
    "recent_credit_inquiries",   // 15
    "length_of_credit_history",  // 16
];

static MINIMAL_SCHEMA: Lazy<FeatureSchema> =
    Lazy::new(|| FeatureSchema::from_names(SCHEMA_VERSION, MINIMAL_FEATURES));

static EXTENDED_SCHEMA: Lazy<FeatureSchema> =
    Lazy::new(|| FeatureSchema::from_names(SCHEMA_VERSION, EXTENDED_FEATURES));

// ============================================================================
// FEATURE SCHEMA
// ============================================================================

/// Ordered, versioned feature layout an artifact bundle was fitted against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(version: u32, names: Vec<String>) -> Self {
        Self { version, names }
    }

    fn from_names(version: u32, names: &[&str]) -> Self {
        Self::new(version, names.iter().map(|s| s.to_string()).collect())
    }

    /// Canonical 9-feature layout
    pub fn minimal() -> &'static FeatureSchema {
        &MINIMAL_SCHEMA
    }

    /// Canonical 17-feature layout
    pub fn extended() -> &'static FeatureSchema {
        &EXTENDED_SCHEMA
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get feature index by name (O(n) but features are few)
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Get feature name by index
    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }

    /// Compute CRC32 hash over version and ordered names
    /// Used to detect layout mismatches when loading stored artifacts
    pub fn hash(&self) -> u32 {
        let mut hasher = Hasher::new();
        hasher.update(&self.version.to_le_bytes());
        for name in &self.names {
            hasher.update(name.as_bytes());
            hasher.update(&[0]); // Separator
        }
        hasher.finalize()
    }

    /// Structural sanity check, run after deserializing a stored schema
    pub fn validate(&self) -> Result<(), ArtifactLoadError> {
        if self.names.is_empty() {
            return Err(ArtifactLoadError::Invalid(
                "feature schema has no features".to_string(),
            ));
        }
        for (i, name) in self.names.iter().enumerate() {
            if name.is_empty() {
                return Err(ArtifactLoadError::Invalid(format!(
                    "feature schema has an empty name at index {}",
                    i
                )));
            }
            if self.names[..i].contains(name) {
                return Err(ArtifactLoadError::Invalid(format!(
                    "feature schema repeats '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Validate that a stored version/hash pair matches this layout
    pub fn validate_layout(&self, version: u32, hash: u32) -> Result<(), ArtifactLoadError> {
        let current_hash = self.hash();
        if version != self.version || hash != current_hash {
            return Err(ArtifactLoadError::LayoutMismatch {
                expected_version: self.version,
                expected_hash: current_hash,
                actual_version: version,
                actual_hash: hash,
            });
        }
        Ok(())
    }

    /// Build the feature vector for a record, in schema order
    ///
    /// Every schema name must be present and numeric in the record.
    /// Extra record keys are ignored. No defaulting, no coercion.
    pub fn vectorize(&self, record: &ApplicantRecord) -> ScoreResult<Vec<f64>> {
        let mut values = Vec::with_capacity(self.names.len());
        for name in &self.names {
            values.push(record.get(name)?);
        }
        Ok(values)
    }
}

/// Guard that a vector length matches a fitted dimensionality
pub(crate) fn check_dimensions(expected: usize, actual: usize) -> ScoreResult<()> {
    if expected != actual {
        return Err(ScoreError::SchemaMismatch { expected, actual });
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_feature_counts() {
        assert_eq!(FeatureSchema::minimal().len(), 9);
        assert_eq!(FeatureSchema::extended().len(), 17);
    }

    #[test]
    fn test_extended_is_superset_prefix() {
        // The extended layout keeps the minimal ordering as its prefix
        let minimal = FeatureSchema::minimal();
        let extended = FeatureSchema::extended();
        for (i, name) in minimal.names.iter().enumerate() {
            assert_eq!(extended.feature_name(i), Some(name.as_str()));
        }
    }

    #[test]
    fn test_hash_consistency() {
        let hash1 = FeatureSchema::minimal().hash();
        let hash2 = FeatureSchema::minimal().hash();
        assert_eq!(hash1, hash2);
        assert_ne!(hash1, 0);
    }

    #[test]
    fn test_hash_depends_on_order() {
        let a = FeatureSchema::new(1, vec!["age".into(), "credit_score".into()]);
        let b = FeatureSchema::new(1, vec!["credit_score".into(), "age".into()]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_hash_depends_on_version() {
        let a = FeatureSchema::new(1, vec!["age".into()]);
        let b = FeatureSchema::new(2, vec!["age".into()]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_validate_layout_success() {
        let schema = FeatureSchema::minimal();
        assert!(schema.validate_layout(schema.version, schema.hash()).is_ok());
    }

    #[test]
    fn test_validate_layout_version_mismatch() {
        let schema = FeatureSchema::minimal();
        let result = schema.validate_layout(schema.version + 1, schema.hash());
        match result {
            Err(ArtifactLoadError::LayoutMismatch {
                expected_version,
                actual_version,
                ..
            }) => {
                assert_eq!(expected_version, schema.version);
                assert_eq!(actual_version, schema.version + 1);
            }
            other => panic!("Expected LayoutMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_layout_hash_mismatch() {
        let schema = FeatureSchema::minimal();
        let result = schema.validate_layout(schema.version, !schema.hash());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let schema = FeatureSchema::new(1, vec!["age".into(), "age".into()]);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let schema = FeatureSchema::new(1, vec![]);
        assert!(schema.validate().is_err());
    }

    #[test]
    fn test_feature_index() {
        let schema = FeatureSchema::minimal();
        assert_eq!(schema.feature_index("age"), Some(0));
        assert_eq!(schema.feature_index("credit_score"), Some(2));
        assert_eq!(schema.feature_index("savings_balance"), Some(8));
        assert_eq!(schema.feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        let schema = FeatureSchema::extended();
        assert_eq!(schema.feature_name(0), Some("age"));
        assert_eq!(schema.feature_name(16), Some("length_of_credit_history"));
        assert_eq!(schema.feature_name(100), None);
    }

    #[test]
    fn test_vectorize_orders_by_schema() {
        let schema = FeatureSchema::new(1, vec!["b".into(), "a".into()]);
        let mut record = ApplicantRecord::new();
        record.insert("a", 1.0);
        record.insert("b", 2.0);

        let vector = schema.vectorize(&record).unwrap();
        assert_eq!(vector, vec![2.0, 1.0]);
    }

    #[test]
    fn test_vectorize_ignores_extra_keys() {
        let schema = FeatureSchema::new(1, vec!["a".into()]);
        let mut record = ApplicantRecord::new();
        record.insert("a", 1.0);
        record.insert("unrelated", 99.0);

        let vector = schema.vectorize(&record).unwrap();
        assert_eq!(vector, vec![1.0]);
    }

    #[test]
    fn test_vectorize_missing_feature_names_key() {
        // Dropping any single feature must fail and name exactly that key
        let schema = FeatureSchema::minimal();
        for omitted in MINIMAL_FEATURES {
            let mut record = ApplicantRecord::new();
            for name in MINIMAL_FEATURES {
                if name != omitted {
                    record.insert(name, 1.0);
                }
            }

            match schema.vectorize(&record) {
                Err(ScoreError::MissingFeature { feature }) => {
                    assert_eq!(feature, *omitted);
                }
                other => panic!("Expected MissingFeature for {}, got {:?}", omitted, other),
            }
        }
    }
}
