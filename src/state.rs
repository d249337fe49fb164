//! Declarative state handle for a single resource instance.
//!
//! The host runtime hands each lifecycle call a prior and a planned state
//! document. [`ResourceData`] wraps the pair and offers the operations the
//! lifecycle handler needs: typed reads, change detection with before/after
//! values, decoding into request structs and merging fetched objects back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ProviderError;

/// Mutable view over one resource instance's declarative state.
///
/// For Create the prior document is empty; for Read both documents start out
/// equal to the recorded state; for Update they differ wherever the operator
/// changed configuration.
#[derive(Debug, Clone, Default)]
pub struct ResourceData {
    id: String,
    prior: Map<String, Value>,
    planned: Map<String, Value>,
}

fn into_map(value: Value) -> Result<Map<String, Value>, ProviderError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(ProviderError::Validation(format!(
            "state document must be an object, got {}",
            other
        ))),
    }
}

impl ResourceData {
    /// Build a handle from a prior and a planned state document.
    pub fn new(prior: Value, planned: Value) -> Result<Self, ProviderError> {
        Ok(Self {
            id: String::new(),
            prior: into_map(prior)?,
            planned: into_map(planned)?,
        })
    }

    /// Build a handle for a Create: no prior state.
    pub fn for_create(planned: Value) -> Result<Self, ProviderError> {
        Self::new(Value::Null, planned)
    }

    /// Build a handle for Read/Update/Delete of an already-recorded instance.
    pub fn for_existing(
        id: impl Into<String>,
        prior: Value,
        planned: Value,
    ) -> Result<Self, ProviderError> {
        let mut data = Self::new(prior, planned)?;
        data.id = id.into();
        Ok(data)
    }

    /// The recorded identifier, empty until Create records one.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record the instance identifier.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// The planned value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.planned.get(field)
    }

    /// The planned value of a string field, empty when absent.
    pub fn get_str(&self, field: &str) -> &str {
        self.planned
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// The planned value of a bool field, false when absent.
    pub fn get_bool(&self, field: &str) -> bool {
        self.planned
            .get(field)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Whether the operator explicitly supplied a non-default value for the
    /// field in the planned document.
    pub fn is_set(&self, field: &str) -> bool {
        match self.planned.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Bool(b)) => *b,
            Some(_) => true,
        }
    }

    /// Whether any of the named fields was explicitly supplied.
    pub fn any_set(&self, fields: &[&str]) -> bool {
        fields.iter().any(|f| self.is_set(f))
    }

    /// Whether the field's value differs between prior and planned state.
    pub fn has_change(&self, field: &str) -> bool {
        self.prior.get(field).unwrap_or(&Value::Null)
            != self.planned.get(field).unwrap_or(&Value::Null)
    }

    /// Whether any field other than the named one changed.
    pub fn has_change_except(&self, except: &str) -> bool {
        self.prior
            .keys()
            .chain(self.planned.keys())
            .any(|field| field != except && self.has_change(field))
    }

    /// The before and after values of a field.
    pub fn get_change(&self, field: &str) -> (Value, Value) {
        (
            self.prior.get(field).cloned().unwrap_or(Value::Null),
            self.planned.get(field).cloned().unwrap_or(Value::Null),
        )
    }

    /// Decode the planned document into a typed struct, ignoring fields the
    /// target does not know about.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ProviderError> {
        Ok(serde_json::from_value(Value::Object(self.planned.clone()))?)
    }

    /// Set a single field in the planned document.
    pub fn set(&mut self, field: &str, value: impl Serialize) -> Result<(), ProviderError> {
        self.planned
            .insert(field.to_string(), serde_json::to_value(value)?);
        Ok(())
    }

    /// Merge a fetched object's fields into the planned document. Fields
    /// absent from the serialized form (client-only toggles, write-only
    /// secrets the remote side omits) are left untouched.
    pub fn set_from<T: Serialize>(&mut self, value: &T) -> Result<(), ProviderError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => {
                for (k, v) in map {
                    self.planned.insert(k, v);
                }
                Ok(())
            }
            other => Err(ProviderError::Validation(format!(
                "cannot merge non-object value into state: {}",
                other
            ))),
        }
    }

    /// A snapshot of the planned document.
    pub fn to_value(&self) -> Value {
        Value::Object(self.planned.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResourceData {
        ResourceData::for_existing(
            "svc-1",
            json!({"name": "svc-1", "owner": "alice", "comment": "old"}),
            json!({"name": "svc-1", "owner": "bob", "comment": "old"}),
        )
        .unwrap()
    }

    #[test]
    fn test_typed_getters() {
        let data = ResourceData::for_create(json!({
            "name": "svc-1",
            "read_only": true
        }))
        .unwrap();

        assert_eq!(data.get_str("name"), "svc-1");
        assert!(data.get_bool("read_only"));
        assert_eq!(data.get_str("missing"), "");
        assert!(!data.get_bool("missing"));
    }

    #[test]
    fn test_is_set_ignores_defaults() {
        let data = ResourceData::for_create(json!({
            "owner": "",
            "read_only": false,
            "isolation_mode": "ISOLATION_MODE_ISOLATED",
            "comment": null
        }))
        .unwrap();

        assert!(!data.is_set("owner"));
        assert!(!data.is_set("read_only"));
        assert!(!data.is_set("comment"));
        assert!(data.is_set("isolation_mode"));
        assert!(data.any_set(&["owner", "isolation_mode"]));
        assert!(!data.any_set(&["owner", "read_only"]));
    }

    #[test]
    fn test_change_detection() {
        let data = sample();
        assert!(data.has_change("owner"));
        assert!(!data.has_change("comment"));
        assert!(!data.has_change_except("owner"));

        let (before, after) = data.get_change("owner");
        assert_eq!(before, json!("alice"));
        assert_eq!(after, json!("bob"));
    }

    #[test]
    fn test_has_change_sees_added_and_removed_fields() {
        let data = ResourceData::new(
            json!({"comment": "old"}),
            json!({"skip_validation": true}),
        )
        .unwrap();

        assert!(data.has_change("comment"));
        assert!(data.has_change("skip_validation"));
        assert!(data.has_change_except("comment"));
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        #[derive(serde::Deserialize)]
        struct Partial {
            name: String,
        }

        let data = ResourceData::for_create(json!({
            "name": "svc-1",
            "force_update": true
        }))
        .unwrap();

        let partial: Partial = data.decode().unwrap();
        assert_eq!(partial.name, "svc-1");
    }

    #[test]
    fn test_set_from_merges_and_preserves_client_only_fields() {
        let mut data = ResourceData::for_existing(
            "svc-1",
            json!({"name": "svc-1", "force_destroy": true}),
            json!({"name": "svc-1", "force_destroy": true}),
        )
        .unwrap();

        data.set_from(&json!({"name": "svc-1", "owner": "alice"}))
            .unwrap();

        assert_eq!(data.get_str("owner"), "alice");
        assert!(data.get_bool("force_destroy"));
    }

    #[test]
    fn test_non_object_state_rejected() {
        assert!(ResourceData::for_create(json!("nope")).is_err());
    }
}
