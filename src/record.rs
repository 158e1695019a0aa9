//! Applicant Record
//!
//! One applicant's attributes, keyed by feature name. Built from a JSON
//! object (the request shape) or assembled in code. The record itself does
//! not know the schema; the schema pulls values out of it in order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ScoreError, ScoreResult};

/// Feature name → measured value mapping for a single applicant
///
/// Values are kept as raw JSON so that non-numeric input can be reported
/// precisely instead of failing at parse time with no field name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantRecord {
    fields: Map<String, Value>,
}

impl ApplicantRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a record from a JSON document (must be an object)
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Build a record from an already-parsed JSON value (must be an object)
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Set a feature measurement
    ///
    /// Non-finite floats have no JSON representation and are stored as
    /// null, which fails as a type mismatch when the feature is read.
    pub fn insert(&mut self, name: &str, value: f64) {
        self.fields.insert(name.to_string(), Value::from(value));
    }

    /// Read one numeric feature value
    pub fn get(&self, name: &str) -> ScoreResult<f64> {
        let value = self
            .fields
            .get(name)
            .ok_or_else(|| ScoreError::MissingFeature {
                feature: name.to_string(),
            })?;
        value.as_f64().ok_or_else(|| ScoreError::TypeMismatch {
            feature: name.to_string(),
            found: json_type_name(value).to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, Value>> for ApplicantRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// TESTS
// ============================================================================
