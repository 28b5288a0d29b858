//! Canonical JSON rendering of protocol objects.

use serde_json::{Map, Value};

use crate::wire::ToWire;

/// Builds a JSON object field by field, in declaration order.
///
/// Absent optional fields and empty optional collections are left out
/// entirely rather than written as `null` or `[]`, so that the same entity
/// always renders to the same text.
#[derive(Debug, Default)]
pub struct ObjectWriter {
    object: Map<String, Value>,
}

impl ObjectWriter {
    pub fn new() -> Self {
        ObjectWriter::default()
    }

    #[must_use]
    pub fn field<T: ToWire + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.object.insert(key.to_string(), value.to_wire());
        self
    }

    #[must_use]
    pub fn optional<T: ToWire + ?Sized>(self, key: &str, value: Option<&T>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// A mandatory collection: written even when empty.
    #[must_use]
    pub fn list<T: ToWire>(self, key: &str, items: &[T]) -> Self {
        self.field(key, items)
    }

    #[must_use]
    pub fn optional_list<T: ToWire>(self, key: &str, items: &[T]) -> Self {
        if items.is_empty() {
            self
        } else {
            self.field(key, items)
        }
    }

    pub fn finish(self) -> Map<String, Value> {
        self.object
    }

    /// Finish as a JSON value, for nested value types.
    pub fn into_json(self) -> Value {
        Value::Object(self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_declaration_order_and_omits_absent() {
        let name: Option<&String> = None;
        let object = ObjectWriter::new()
            .field("id", "LOC1")
            .optional("name", name)
            .field("publish", &true)
            .optional_list::<String>("facilities", &[])
            .list::<String>("evses", &[])
            .optional("city", Some("Jena"))
            .finish();

        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["id", "publish", "evses", "city"]);
        assert_eq!(
            Value::Object(object),
            json!({"id": "LOC1", "publish": true, "evses": [], "city": "Jena"})
        );
    }
}
