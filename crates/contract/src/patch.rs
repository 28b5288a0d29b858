//! JSON merge-patch application under a per-field mutability policy.
//!
//! A patch is a partial JSON object: a key with a value sets the field, a key
//! with `null` clears an optional field, an absent key leaves the field alone.
//! Each entity declares a [`FieldRule`] per patchable wire field. The engine
//! walks the patch keys in order and stops at the first violation; on any
//! failure the caller gets the original entity back together with the error.
//!
//! After the policy checks pass, the merged object is fed back through the
//! entity's own parser, so a patch can never produce an entity that would not
//! parse from the wire.

use serde_json::{Map, Value};

use crate::entity::ProtocolObject;
use crate::error::PatchError;
use crate::fields::Fields;
use crate::timestamp::Timestamp;
use crate::wire::{json_type, ToWire};
use crate::LAST_UPDATED;

/// Whether and how a field may be changed by a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Any attempt to patch the field fails (identity, primary key).
    Immutable,
    /// A value replaces the current one; `null` is rejected.
    Replaceable,
    /// A value replaces the current one; `null` removes the field.
    ReplaceableOrClearable,
}

/// The JSON shape a patch value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// String, number or boolean; replaced as a whole.
    Scalar,
    /// Nested object; deep-merged into the current value.
    Object,
    /// Array; the whole collection is replaced, never merged by position.
    Collection,
}

impl Shape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Shape::Scalar => !(value.is_object() || value.is_array()),
            Shape::Object => value.is_object(),
            Shape::Collection => value.is_array(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Scalar => "a single value",
            Shape::Object => "an object",
            Shape::Collection => "an array",
        }
    }
}

/// Patch policy for one wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub name: &'static str,
    /// Human wording used in error messages, e.g. `country code`.
    pub label: &'static str,
    pub mutability: Mutability,
    pub shape: Shape,
}

impl FieldRule {
    pub const fn immutable(name: &'static str, label: &'static str) -> Self {
        FieldRule {
            name,
            label,
            mutability: Mutability::Immutable,
            shape: Shape::Scalar,
        }
    }

    /// A mandatory field.
    pub const fn replaceable(name: &'static str) -> Self {
        FieldRule {
            name,
            label: name,
            mutability: Mutability::Replaceable,
            shape: Shape::Scalar,
        }
    }

    /// An optional field.
    pub const fn clearable(name: &'static str) -> Self {
        FieldRule {
            name,
            label: name,
            mutability: Mutability::ReplaceableOrClearable,
            shape: Shape::Scalar,
        }
    }

    #[must_use]
    pub const fn object(mut self) -> Self {
        self.shape = Shape::Object;
        self
    }

    #[must_use]
    pub const fn collection(mut self) -> Self {
        self.shape = Shape::Collection;
        self
    }

    fn apply(
        &self,
        target: &mut Map<String, Value>,
        value: &Value,
        description: &'static str,
    ) -> Result<(), PatchError> {
        if self.mutability == Mutability::Immutable {
            return Err(PatchError::Immutable {
                field: self.name,
                label: self.label,
                description,
            });
        }

        if value.is_null() {
            if self.mutability == Mutability::Replaceable {
                return Err(PatchError::NullMandatory {
                    field: self.name,
                    description,
                });
            }
            target.remove(self.name);
            return Ok(());
        }

        if !self.shape.accepts(value) {
            return Err(PatchError::InvalidShape {
                field: self.name,
                description,
                expected: self.shape.describe(),
                found: json_type(value),
            });
        }

        let merged = match self.shape {
            Shape::Object => merge_value(target.remove(self.name).unwrap_or(Value::Null), value),
            Shape::Scalar | Shape::Collection => value.clone(),
        };
        target.insert(self.name.to_string(), merged);
        Ok(())
    }
}

/// RFC 7396 merge of `patch` into `target`: objects merge key by key, `null`
/// deletes, anything else replaces.
pub fn merge_value(target: Value, patch: &Value) -> Value {
    let Value::Object(patch) = patch else {
        return patch.clone();
    };
    let mut target = match target {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, value) in patch {
        if value.is_null() {
            target.remove(key);
        } else {
            let existing = target.remove(key).unwrap_or(Value::Null);
            target.insert(key.clone(), merge_value(existing, value));
        }
    }
    Value::Object(target)
}

/// Result of a patch attempt. Unlike a plain `Result`, a usable entity is
/// always present: the patched one on success, the untouched original on
/// failure.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct PatchOutcome<T> {
    patched: T,
    error: Option<PatchError>,
}

impl<T> PatchOutcome<T> {
    pub fn applied(patched: T) -> Self {
        PatchOutcome {
            patched,
            error: None,
        }
    }

    pub fn rejected(original: T, error: PatchError) -> Self {
        PatchOutcome {
            patched: original,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn patched(&self) -> &T {
        &self.patched
    }

    pub fn error(&self) -> Option<&PatchError> {
        self.error.as_ref()
    }

    pub fn into_patched(self) -> T {
        self.patched
    }

    pub fn into_parts(self) -> (T, Option<PatchError>) {
        (self.patched, self.error)
    }
}

/// A protocol object that accepts merge patches.
pub trait Patchable: ProtocolObject {
    /// How error messages refer to the object, e.g. `a charging location`.
    const DESCRIPTION: &'static str;

    /// Policies for every patchable field. Keys without a rule are ignored.
    const PATCH_RULES: &'static [FieldRule];

    /// Out-of-band context pinning the object's identity while the merged
    /// result is re-parsed.
    fn patch_context(&self) -> Self::Context;

    fn patch(&self, patch: &Value) -> PatchOutcome<Self> {
        apply_patch(self, patch)
    }
}

/// Apply `patch` to `current`, all or nothing.
pub fn apply_patch<T: Patchable>(current: &T, patch: &Value) -> PatchOutcome<T> {
    match try_patch(current, patch) {
        Ok(patched) => {
            tracing::trace!(kind = T::KIND, "merge patch applied");
            PatchOutcome::applied(patched)
        }
        Err(error) => {
            tracing::debug!(kind = T::KIND, %error, "merge patch rejected");
            PatchOutcome::rejected(current.clone(), error)
        }
    }
}

fn try_patch<T: Patchable>(current: &T, patch: &Value) -> Result<T, PatchError> {
    let patch = patch.as_object().ok_or_else(|| PatchError::NotAnObject {
        description: T::DESCRIPTION,
        found: json_type(patch),
    })?;

    let mut merged = current.to_object();
    let mut last_updated = None;

    for (key, value) in patch {
        if key == LAST_UPDATED {
            let stamp = value
                .as_str()
                .ok_or_else(|| format!("expected string, found {}", json_type(value)))
                .and_then(|s| Timestamp::parse(s).map_err(|e| e.to_string()))
                .map_err(|reason| PatchError::InvalidTimestamp {
                    description: T::DESCRIPTION,
                    reason,
                })?;
            last_updated = Some(stamp);
            continue;
        }

        match T::PATCH_RULES.iter().find(|rule| rule.name == key) {
            Some(rule) => rule.apply(&mut merged, value, T::DESCRIPTION)?,
            None => tracing::trace!(kind = T::KIND, field = %key, "ignoring unknown patch field"),
        }
    }

    let stamp = last_updated.unwrap_or_else(Timestamp::now);
    merged.insert(LAST_UPDATED.to_string(), stamp.to_wire());

    T::from_fields(&Fields::new(&merged), &current.patch_context()).map_err(|failure| {
        PatchError::Rejected {
            description: T::DESCRIPTION,
            failure,
        }
    })
}
