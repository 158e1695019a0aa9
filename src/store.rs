//! Artifact Store
//!
//! Bundle layout on disk, manifest validation, and the process-wide
//! artifact handle. A bundle directory holds four files:
//!
//! - `manifest.json`            - schema, hash, threshold, checksums
//! - `scaler.json`              - fitted normalization parameters
//! - `model.json`               - fitted decision forest
//! - `feature_importance.json`  - flat name → weight table
//!
//! Loading parses and validates everything, then builds the scorer; only a
//! fully constructed bundle is ever published to the global handle, so
//! readers never observe partial state and request handling never touches
//! the filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants;
use crate::error::{ArtifactLoadError, ScoreResult};
use crate::importance::ImportanceTable;
use crate::model::DecisionForest;
use crate::record::ApplicantRecord;
use crate::scaler::StandardScaler;
use crate::schema::FeatureSchema;
use crate::scorer::{RiskAssessment, RiskScorer, ScorerConfig};

// ============================================================================
// BUNDLE LAYOUT
// ============================================================================

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MODEL_FILE: &str = "model.json";
pub const IMPORTANCE_FILE: &str = "feature_importance.json";

/// Default bundle directory: env override, else the platform data dir
pub fn default_bundle_dir() -> PathBuf {
    if let Some(dir) = constants::get_model_dir_override() {
        return dir;
    }
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(constants::APP_NAME)
        .join("model")
}

// ============================================================================
// MANIFEST
// ============================================================================

/// Stored next to the artifacts; makes the schema and integrity data
/// part of the bundle instead of a convention
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    pub model_id: String,
    pub schema: FeatureSchema,
    /// CRC32 of the schema, recomputed and compared on load
    pub schema_hash: u32,
    pub decision_threshold: f64,
    pub created_at: DateTime<Utc>,
    /// File name → SHA-256 hex; files with an entry are verified on load
    #[serde(default)]
    pub checksums: BTreeMap<String, String>,
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ============================================================================
// LOAD / SAVE
// ============================================================================

/// One fully validated bundle: manifest plus the scorer built from it
pub struct LoadedBundle {
    pub manifest: BundleManifest,
    pub loaded_from: PathBuf,
    pub loaded_at: DateTime<Utc>,
    scorer: RiskScorer,
}

impl LoadedBundle {
    pub fn scorer(&self) -> &RiskScorer {
        &self.scorer
    }

    pub fn assess(&self, record: &ApplicantRecord) -> ScoreResult<RiskAssessment> {
        self.scorer.assess(record)
    }
}

fn read_verified(
    dir: &Path,
    file: &str,
    manifest: &BundleManifest,
) -> Result<Vec<u8>, ArtifactLoadError> {
    let bytes = fs::read(dir.join(file))?;
    if let Some(expected) = manifest.checksums.get(file) {
        let actual = sha256_hex(&bytes);
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(ArtifactLoadError::ChecksumMismatch {
                file: file.to_string(),
            });
        }
    }
    Ok(bytes)
}

/// Read, verify, and validate a bundle directory into a ready scorer
///
/// The decision threshold comes from the manifest unless overridden via
/// the environment.
pub fn load_bundle(dir: &Path) -> Result<LoadedBundle, ArtifactLoadError> {
    log::info!("Loading model bundle from {}", dir.display());

    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        return Err(ArtifactLoadError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no bundle manifest at {}", manifest_path.display()),
        )));
    }

    let manifest: BundleManifest = serde_json::from_slice(&fs::read(manifest_path)?)?;
    manifest.schema.validate()?;
    manifest
        .schema
        .validate_layout(manifest.schema.version, manifest.schema_hash)?;

    let scaler_bytes = read_verified(dir, SCALER_FILE, &manifest)?;
    let model_bytes = read_verified(dir, MODEL_FILE, &manifest)?;
    let importance_bytes = read_verified(dir, IMPORTANCE_FILE, &manifest)?;

    let scaler: StandardScaler = serde_json::from_slice(&scaler_bytes)?;
    let forest: DecisionForest = serde_json::from_slice(&model_bytes)?;
    forest.validate()?;
    let importance: ImportanceTable = serde_json::from_slice(&importance_bytes)?;

    let decision_threshold = constants::get_decision_threshold_override()
        .unwrap_or(manifest.decision_threshold);
    let config = ScorerConfig {
        decision_threshold,
        top_factors: constants::DEFAULT_TOP_FACTORS,
    };

    let scorer = RiskScorer::new(
        manifest.schema.clone(),
        scaler,
        Box::new(forest),
        importance,
        config,
    )?;

    log::info!(
        "Bundle '{}' ready: schema v{} ({} features, hash {:08x}), threshold {}",
        manifest.model_id,
        manifest.schema.version,
        manifest.schema.len(),
        manifest.schema_hash,
        decision_threshold
    );

    Ok(LoadedBundle {
        manifest,
        loaded_from: dir.to_path_buf(),
        loaded_at: Utc::now(),
        scorer,
    })
}

/// Write a complete bundle with fresh checksums and a new model id
///
/// Validates every part first so a bundle that cannot load back is never
/// persisted. Returns the manifest that was written.
pub fn save_bundle(
    dir: &Path,
    schema: &FeatureSchema,
    scaler: &StandardScaler,
    forest: &DecisionForest,
    importance: &ImportanceTable,
    decision_threshold: f64,
) -> Result<BundleManifest, ArtifactLoadError> {
    schema.validate()?;
    scaler.validate()?;
    forest.validate()?;
    importance.validate(schema)?;
    if scaler.n_features() != schema.len() || forest.n_features != schema.len() {
        return Err(ArtifactLoadError::Invalid(format!(
            "bundle parts disagree on dimensionality: schema {}, scaler {}, model {}",
            schema.len(),
            scaler.n_features(),
            forest.n_features
        )));
    }
    if !decision_threshold.is_finite() || decision_threshold <= 0.0 || decision_threshold >= 1.0 {
        return Err(ArtifactLoadError::Invalid(format!(
            "decision threshold {} outside (0, 1)",
            decision_threshold
        )));
    }

    fs::create_dir_all(dir)?;

    let scaler_json = serde_json::to_vec_pretty(scaler)?;
    let model_json = serde_json::to_vec_pretty(forest)?;
    let importance_json = serde_json::to_vec_pretty(importance)?;

    let mut checksums = BTreeMap::new();
    checksums.insert(SCALER_FILE.to_string(), sha256_hex(&scaler_json));
    checksums.insert(MODEL_FILE.to_string(), sha256_hex(&model_json));
    checksums.insert(IMPORTANCE_FILE.to_string(), sha256_hex(&importance_json));

    let manifest = BundleManifest {
        model_id: uuid::Uuid::new_v4().to_string(),
        schema: schema.clone(),
        schema_hash: schema.hash(),
        decision_threshold,
        created_at: Utc::now(),
        checksums,
    };

    fs::write(dir.join(SCALER_FILE), scaler_json)?;
    fs::write(dir.join(MODEL_FILE), model_json)?;
    fs::write(dir.join(IMPORTANCE_FILE), importance_json)?;
    fs::write(dir.join(MANIFEST_FILE), serde_json::to_vec_pretty(&manifest)?)?;

    log::info!(
        "Saved model bundle '{}' to {}",
        manifest.model_id,
        dir.display()
    );
    Ok(manifest)
}

// ============================================================================
// PROCESS-WIDE HANDLE
// ============================================================================

static CURRENT: RwLock<Option<Arc<LoadedBundle>>> = RwLock::new(None);

/// Load and publish a bundle if none is published yet
///
/// Idempotent; use [`reload`] to swap an already published bundle.
pub fn init(dir: &Path) -> Result<(), ArtifactLoadError> {
    if CURRENT.read().is_some() {
        log::debug!("Model bundle already published, init skipped");
        return Ok(());
    }
    reload(dir)
}

/// Load a bundle and atomically replace the published one
///
/// The new bundle is fully parsed and validated before the swap; on any
/// failure the previously published bundle stays in place.
pub fn reload(dir: &Path) -> Result<(), ArtifactLoadError> {
    let bundle = load_bundle(dir)?;
    let model_id = bundle.manifest.model_id.clone();
    *CURRENT.write() = Some(Arc::new(bundle));
    log::info!("Published model bundle '{}'", model_id);
    Ok(())
}

/// Handle to the published bundle
pub fn current() -> Result<Arc<LoadedBundle>, ArtifactLoadError> {
    CURRENT
        .read()
        .as_ref()
        .cloned()
        .ok_or(ArtifactLoadError::NotLoaded)
}

pub fn is_loaded() -> bool {
    CURRENT.read().is_some()
}

/// Score a record through the published bundle
pub fn assess(record: &ApplicantRecord) -> ScoreResult<RiskAssessment> {
    let bundle = current()?;
    bundle.assess(record)
}

/// Snapshot of the published bundle for logs and health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStatus {
    pub loaded: bool,
    pub model_id: Option<String>,
    pub feature_count: usize,
    pub loaded_at: Option<DateTime<Utc>>,
}

pub fn status() -> StoreStatus {
    match CURRENT.read().as_ref() {
        Some(bundle) => StoreStatus {
            loaded: true,
            model_id: Some(bundle.manifest.model_id.clone()),
            feature_count: bundle.scorer.n_features(),
            loaded_at: Some(bundle.loaded_at),
        },
        None => StoreStatus {
            loaded: false,
            model_id: None,
            feature_count: 0,
            loaded_at: None,
        },
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScoreError;
    use crate::model::TreeNode;

    fn minimal_scaler() -> StandardScaler {
        StandardScaler::from_parameters(
            vec![35.0, 75000.0, 700.0, 8.0, 0.3, 3.0, 0.2, 2000.0, 10000.0],
            vec![10.0, 25000.0, 50.0, 5.0, 0.1, 1.732, 0.4472, 500.0, 5000.0],
        )
        .unwrap()
    }

    /// Splits on normalized credit score: at or below the mean → 0.8
    fn credit_split_forest() -> DecisionForest {
        DecisionForest::from_trees(
            9,
            vec![TreeNode::Split {
                feature: 2,
                threshold: 0.0,
                left: Box::new(TreeNode::Leaf { probability: 0.8 }),
                right: Box::new(TreeNode::Leaf { probability: 0.2 }),
            }],
        )
        .unwrap()
    }

    fn minimal_importance() -> ImportanceTable {
        let mut t = ImportanceTable::new();
        t.insert("credit_score", 0.5);
        t.insert("past_defaults", 0.3);
        t.insert("age", 0.2);
        t
    }

    fn record_with_credit(credit_score: f64) -> ApplicantRecord {
        let mut r = ApplicantRecord::new();
        r.insert("age", 28.0);
        r.insert("annual_income", 70000.0);
        r.insert("credit_score", credit_score);
        r.insert("employment_length_years", 4.0);
        r.insert("debt_to_income_ratio", 0.25);
        r.insert("number_of_credit_cards", 2.0);
        r.insert("past_defaults", 0.0);
        r.insert("monthly_rent", 1600.0);
        r.insert("savings_balance", 12000.0);
        r
    }

    fn save_minimal(dir: &Path) -> BundleManifest {
        save_bundle(
            dir,
            FeatureSchema::minimal(),
            &minimal_scaler(),
            &credit_split_forest(),
            &minimal_importance(),
            0.5,
        )
        .unwrap()
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = save_minimal(dir.path());
        assert_eq!(manifest.checksums.len(), 3);
        assert!(!manifest.model_id.is_empty());

        let bundle = load_bundle(dir.path()).unwrap();
        assert_eq!(bundle.manifest.model_id, manifest.model_id);
        assert_eq!(bundle.scorer().n_features(), 9);

        let a = bundle.assess(&record_with_credit(650.0)).unwrap();
        assert_eq!(a.default_probability, 0.8);
        assert!(a.will_default);
        assert_eq!(a.risk_factors.len(), 3);
    }

    #[test]
    fn test_checksum_tamper_detected() {
        let dir = tempfile::tempdir().unwrap();
        save_minimal(dir.path());

        // Any byte change must be caught, even whitespace
        let path = dir.path().join(SCALER_FILE);
        let mut bytes = fs::read(&path).unwrap();
        bytes.push(b' ');
        fs::write(&path, bytes).unwrap();

        match load_bundle(dir.path()) {
            Err(ArtifactLoadError::ChecksumMismatch { file }) => {
                assert_eq!(file, SCALER_FILE);
            }
            other => panic!("Expected ChecksumMismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_schema_hash_drift_detected() {
        let dir = tempfile::tempdir().unwrap();
        save_minimal(dir.path());

        let path = dir.path().join(MANIFEST_FILE);
        let mut manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        let stored = manifest["schema_hash"].as_u64().unwrap() as u32;
        manifest["schema_hash"] = serde_json::json!(!stored);
        fs::write(&path, serde_json::to_vec_pretty(&manifest).unwrap()).unwrap();

        match load_bundle(dir.path()) {
            Err(ArtifactLoadError::LayoutMismatch {
                expected_hash,
                actual_hash,
                ..
            }) => {
                assert_eq!(actual_hash, !stored);
                assert_eq!(expected_hash, stored);
            }
            other => panic!("Expected LayoutMismatch, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_missing_manifest_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        match load_bundle(dir.path()) {
            Err(ArtifactLoadError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("Expected Io(NotFound), got {:?}", other.err()),
        }
    }

    #[test]
    fn test_manifest_without_checksums_loads() {
        let dir = tempfile::tempdir().unwrap();
        let schema = FeatureSchema::minimal();

        fs::write(
            dir.path().join(SCALER_FILE),
            serde_json::to_vec_pretty(&minimal_scaler()).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join(MODEL_FILE),
            serde_json::to_vec_pretty(&credit_split_forest()).unwrap(),
        )
        .unwrap();
        fs::write(
            dir.path().join(IMPORTANCE_FILE),
            serde_json::to_vec_pretty(&minimal_importance()).unwrap(),
        )
        .unwrap();

        let manifest = serde_json::json!({
            "model_id": "manual-bundle",
            "schema": {"version": schema.version, "names": schema.names.clone()},
            "schema_hash": schema.hash(),
            "decision_threshold": 0.5,
            "created_at": "2026-01-15T09:00:00Z",
        });
        fs::write(
            dir.path().join(MANIFEST_FILE),
            serde_json::to_vec_pretty(&manifest).unwrap(),
        )
        .unwrap();

        let bundle = load_bundle(dir.path()).unwrap();
        assert_eq!(bundle.manifest.model_id, "manual-bundle");
        assert!(bundle.manifest.checksums.is_empty());
    }

    #[test]
    fn test_importance_unknown_feature_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        save_minimal(dir.path());

        // Swap in a table naming a feature outside the schema; drop the
        // checksums so validation is what trips
        let importance = serde_json::json!({"shoe_size": 1.0});
        fs::write(
            dir.path().join(IMPORTANCE_FILE),
            serde_json::to_vec_pretty(&importance).unwrap(),
        )
        .unwrap();

        let path = dir.path().join(MANIFEST_FILE);
        let mut manifest: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        manifest["checksums"] = serde_json::json!({});
        fs::write(&path, serde_json::to_vec_pretty(&manifest).unwrap()).unwrap();

        match load_bundle(dir.path()) {
            Err(ArtifactLoadError::Invalid(msg)) => {
                assert!(msg.contains("shoe_size"));
            }
            other => panic!("Expected Invalid, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_save_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let wrong_forest = DecisionForest::from_trees(
            17,
            vec![TreeNode::Leaf { probability: 0.5 }],
        )
        .unwrap();
        let result = save_bundle(
            dir.path(),
            FeatureSchema::minimal(),
            &minimal_scaler(),
            &wrong_forest,
            &minimal_importance(),
            0.5,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_global_handle_lifecycle() {
        // The only test touching the process-wide handle, so the sequence
        // below is self-contained: not loaded → init → reload → swap.
        let record = record_with_credit(650.0);

        match super::assess(&record) {
            Err(ScoreError::Artifacts(ArtifactLoadError::NotLoaded)) => {}
            other => panic!("Expected NotLoaded before init, got {:?}", other.err()),
        }
        assert!(!is_loaded());
        assert!(!status().loaded);

        let dir_a = tempfile::tempdir().unwrap();
        let manifest_a = save_minimal(dir_a.path());
        init(dir_a.path()).unwrap();
        assert!(is_loaded());

        let a = super::assess(&record).unwrap();
        assert_eq!(a.default_probability, 0.8);
        assert_eq!(status().model_id.as_deref(), Some(manifest_a.model_id.as_str()));

        // init is a no-op once published
        let dir_b = tempfile::tempdir().unwrap();
        let flat_forest =
            DecisionForest::from_trees(9, vec![TreeNode::Leaf { probability: 0.35 }]).unwrap();
        let manifest_b = save_bundle(
            dir_b.path(),
            FeatureSchema::minimal(),
            &minimal_scaler(),
            &flat_forest,
            &minimal_importance(),
            0.5,
        )
        .unwrap();
        init(dir_b.path()).unwrap();
        assert_eq!(status().model_id.as_deref(), Some(manifest_a.model_id.as_str()));

        // reload swaps atomically
        reload(dir_b.path()).unwrap();
        let b = super::assess(&record).unwrap();
        assert_eq!(b.default_probability, 0.35);
        assert!(!b.will_default);
        assert_eq!(status().model_id.as_deref(), Some(manifest_b.model_id.as_str()));

        // A failed reload leaves the published bundle in place
        let empty = tempfile::tempdir().unwrap();
        assert!(reload(empty.path()).is_err());
        assert_eq!(status().model_id.as_deref(), Some(manifest_b.model_id.as_str()));
    }
}
