//! Field extraction from JSON objects.
//!
//! The main entry point is [`Fields`], a read-only view over one JSON object.
//! Every extractor returns a [`FieldError`] whose path starts with the wire
//! name it was asked for, so callers can use `?` and still get messages like
//! `"connectors[1].standard": unsupported value 'FOO'`.

use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::wire::FromWire;

/// A view over the fields of one JSON object.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    object: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    pub fn new(object: &'a Map<String, Value>) -> Self {
        Fields { object }
    }

    /// View `value` as an object, or fail with a shape error.
    pub fn of(value: &'a Value) -> Result<Self, FieldError> {
        value
            .as_object()
            .map(Fields::new)
            .ok_or_else(|| FieldError::shape("object", value))
    }

    /// The raw value under `key`; `null` counts as absent.
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn mandatory<T: FromWire>(&self, key: &str) -> Result<T, FieldError> {
        let value = self
            .get(key)
            .ok_or_else(|| FieldError::missing().within(key))?;
        T::from_wire(value).map_err(|e| e.within(key))
    }

    pub fn optional<T: FromWire>(&self, key: &str) -> Result<Option<T>, FieldError> {
        self.get(key)
            .map(|value| T::from_wire(value).map_err(|e| e.within(key)))
            .transpose()
    }

    /// A collection that must be present. Whether it may be empty is up to
    /// the entity.
    pub fn mandatory_list<T: FromWire>(&self, key: &str) -> Result<Vec<T>, FieldError> {
        self.mandatory(key)
    }

    /// A collection that may be absent; absent reads as empty.
    pub fn optional_list<T: FromWire>(&self, key: &str) -> Result<Vec<T>, FieldError> {
        Ok(self.optional(key)?.unwrap_or_default())
    }

    /// Like [`Fields::mandatory`], with an ad-hoc decoder instead of a
    /// [`FromWire`] impl.
    pub fn mandatory_with<T>(
        &self,
        key: &str,
        decode: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Result<T, FieldError> {
        let value = self
            .get(key)
            .ok_or_else(|| FieldError::missing().within(key))?;
        decode(value).map_err(|reason| FieldError::invalid(reason).within(key))
    }

    pub fn optional_with<T>(
        &self,
        key: &str,
        decode: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Result<Option<T>, FieldError> {
        self.get(key)
            .map(|value| decode(value).map_err(|reason| FieldError::invalid(reason).within(key)))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldReason;
    use serde_json::json;

    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        label: Option<String>,
    }

    impl FromWire for Point {
        fn from_wire(value: &Value) -> Result<Self, FieldError> {
            let fields = Fields::of(value)?;
            Ok(Point {
                x: fields.mandatory("x")?,
                label: fields.optional("label")?,
            })
        }
    }

    #[test]
    fn mandatory_absent_and_null_are_missing() {
        let doc = json!({"a": null});
        let fields = Fields::of(&doc).unwrap();
        let err = fields.mandatory::<String>("a").unwrap_err();
        assert_eq!(err.to_string(), "\"a\": missing");
        let err = fields.mandatory::<String>("b").unwrap_err();
        assert_eq!(err.path(), "b");
        assert_eq!(err.reason(), &FieldReason::Missing);
    }

    #[test]
    fn optional_absent_is_none_but_malformed_fails() {
        let doc = json!({"name": 7});
        let fields = Fields::of(&doc).unwrap();
        assert_eq!(fields.optional::<String>("other").unwrap(), None);
        let err = fields.optional::<String>("name").unwrap_err();
        assert_eq!(err.to_string(), "\"name\": expected string, found number");
    }

    #[test]
    fn nested_struct_errors_carry_full_path() {
        let doc = json!({"points": [{"x": 1}, {"x": "one"}]});
        let fields = Fields::of(&doc).unwrap();
        let err = fields.mandatory_list::<Point>("points").unwrap_err();
        assert_eq!(err.path(), "points[1].x");
        assert_eq!(err.field(), "points");
    }

    #[test]
    fn optional_list_absent_is_empty() {
        let doc = json!({"points": [{"x": 1, "label": "a"}]});
        let fields = Fields::of(&doc).unwrap();
        assert!(fields.optional_list::<Point>("missing").unwrap().is_empty());
        let points = fields.optional_list::<Point>("points").unwrap();
        assert_eq!(
            points,
            vec![Point {
                x: 1,
                label: Some("a".to_string())
            }]
        );
    }

    #[test]
    fn closure_decoders_are_wrapped() {
        let doc = json!({"currency": "euro"});
        let fields = Fields::of(&doc).unwrap();
        let err = fields
            .mandatory_with("currency", |v| {
                v.as_str()
                    .filter(|s| s.len() == 3)
                    .map(str::to_owned)
                    .ok_or_else(|| "not an ISO 4217 code".to_string())
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "\"currency\": not an ISO 4217 code");
        assert_eq!(
            fields
                .optional_with("absent", |_| Ok::<_, String>(1))
                .unwrap(),
            None
        );
    }

    #[test]
    fn non_object_is_a_shape_error() {
        let doc = json!([1, 2]);
        let err = Fields::of(&doc).unwrap_err();
        assert_eq!(err.to_string(), "expected object, found array");
    }
}
