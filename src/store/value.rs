//! Stored value shapes - the record/scalar split behind `update`

use serde_json::{Map, Value};

/// A persisted payload, classified by shape.
///
/// `ConfigStore::update` merges field-by-field only when both the stored
/// value and the patch are records; every other pairing replaces the stored
/// value wholesale. Classifying up front keeps that branch an exhaustive
/// match instead of a runtime type probe.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// A structured record (JSON object)
    Record(Map<String, Value>),
    /// Any non-object payload: string, number, bool, null, or array
    Scalar(Value),
}

impl StoredValue {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Object(map) => StoredValue::Record(map),
            other => StoredValue::Scalar(other),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            StoredValue::Record(map) => Value::Object(map),
            StoredValue::Scalar(value) => value,
        }
    }

    /// Apply `patch` over this value, returning the payload to persist.
    ///
    /// The merge is shallow: patch fields overwrite same-named stored fields,
    /// all other stored fields survive. Nested objects are not recursed into.
    pub fn apply(self, patch: StoredValue) -> Value {
        match (self, patch) {
            (StoredValue::Record(mut base), StoredValue::Record(patch)) => {
                for (field, value) in patch {
                    base.insert(field, value);
                }
                Value::Object(base)
            }
            (StoredValue::Record(_), StoredValue::Scalar(patch)) => patch,
            (StoredValue::Scalar(_), StoredValue::Record(patch)) => Value::Object(patch),
            (StoredValue::Scalar(_), StoredValue::Scalar(patch)) => patch,
        }
    }
}
