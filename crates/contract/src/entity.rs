//! Parsing and serialization entry points shared by all protocol objects.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::{ParseError, ParseFailure};
use crate::fields::Fields;
use crate::identity::{Identity, IdentityFragment};
use crate::timestamp::Timestamp;
use crate::wire::json_type;

/// A protocol object with a JSON wire representation.
///
/// Implementors supply [`ProtocolObject::from_fields`] (identity resolution,
/// one extractor call per field in declaration order, then entity-specific
/// invariants) and [`ProtocolObject::to_object`]. Everything else is provided.
///
/// Values are never updated in place by this crate: patching produces a new
/// value and leaves the original untouched.
pub trait ProtocolObject: Sized + Clone {
    /// Entity kind used in error messages, e.g. `Location`.
    const KIND: &'static str;

    /// Out-of-band data the parser reconciles with the body, such as the
    /// identity taken from a request path.
    type Context;

    /// Build the object from its wire fields, stopping at the first error.
    fn from_fields(fields: &Fields<'_>, context: &Self::Context) -> Result<Self, ParseFailure>;

    /// Render the object's fields in declaration order.
    fn to_object(&self) -> Map<String, Value>;

    fn last_updated(&self) -> Timestamp;

    fn from_json(json: &Value, context: &Self::Context) -> Result<Self, ParseError> {
        let object = json.as_object().ok_or_else(|| {
            ParseError::new(Self::KIND, ParseFailure::NotAnObject(json_type(json)))
        })?;
        Self::from_fields(&Fields::new(object), context)
            .map_err(|failure| ParseError::new(Self::KIND, failure))
    }

    /// Parse from JSON text. Text that is not JSON at all is reported as an
    /// invalid text representation.
    fn parse(text: &str, context: &Self::Context) -> Result<Self, ParseError> {
        let json: Value = serde_json::from_str(text).map_err(|e| {
            ParseError::new(Self::KIND, ParseFailure::InvalidText(e.to_string()))
        })?;
        Self::from_json(&json, context)
    }

    fn to_json(&self) -> Value {
        Value::Object(self.to_object())
    }

    /// Compact canonical text. Identical objects always produce identical text.
    fn to_canonical_string(&self) -> String {
        self.to_json().to_string()
    }
}

/// A party-owned object identified by `(country_code, party_id, id)`.
pub trait Entity: ProtocolObject<Context = IdentityFragment> {
    fn identity(&self) -> Identity;

    /// Total order over identity only; field contents are not compared.
    fn cmp_identity(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }

    fn same_identity(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

/// Read `last_updated`, stamping the current time when the wire omits it.
pub fn last_updated_or_now(fields: &Fields<'_>) -> Result<Timestamp, ParseFailure> {
    Ok(fields
        .optional(crate::LAST_UPDATED)?
        .unwrap_or_else(Timestamp::now))
}
