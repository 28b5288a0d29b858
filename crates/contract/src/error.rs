//! Error taxonomy for parsing and patching protocol objects.
//!
//! Errors compose bottom-up: a decoder reports a [`FieldReason`], the field
//! extractor wraps it into a [`FieldError`] carrying the field path, the entity
//! parser wraps that into a [`ParseError`] naming the entity kind, and the patch
//! engine reports a [`PatchError`] naming the offending field.

use std::fmt;

use serde_json::Value;

use crate::identity::IdentityError;
use crate::wire::json_type;

/// Why a single wire field could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldReason {
    /// A mandatory field is absent or `null`.
    Missing,
    /// The JSON value has the wrong shape for the declared type.
    InvalidShape {
        expected: &'static str,
        found: &'static str,
    },
    /// A string outside the set of known enumeration values.
    Unsupported(String),
    /// A decoder-specific rejection.
    Invalid(String),
}

impl fmt::Display for FieldReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldReason::Missing => write!(f, "missing"),
            FieldReason::InvalidShape { expected, found } => {
                write!(f, "expected {}, found {}", expected, found)
            }
            FieldReason::Unsupported(value) => write!(f, "unsupported value '{}'", value),
            FieldReason::Invalid(message) => write!(f, "{}", message),
        }
    }
}

/// A field-level decoding failure.
///
/// Leaf decoders produce errors with an empty path. The extractor prefixes the
/// wire name (and the element index inside collections) while the error
/// travels up, so a failure deep inside a Location renders as
/// `"evses[0].connectors[1].standard": unsupported value 'FOO'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    path: String,
    reason: FieldReason,
}

impl FieldError {
    pub const fn new(reason: FieldReason) -> Self {
        FieldError {
            path: String::new(),
            reason,
        }
    }

    pub const fn missing() -> Self {
        FieldError::new(FieldReason::Missing)
    }

    pub fn shape(expected: &'static str, found: &Value) -> Self {
        FieldError::new(FieldReason::InvalidShape {
            expected,
            found: json_type(found),
        })
    }

    pub fn unsupported(value: impl Into<String>) -> Self {
        FieldError::new(FieldReason::Unsupported(value.into()))
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        FieldError::new(FieldReason::Invalid(message.into()))
    }

    /// Prefix a field name onto the error path.
    #[must_use]
    pub fn within(mut self, field: &str) -> Self {
        self.path = if self.path.is_empty() {
            field.to_string()
        } else if self.path.starts_with('[') {
            format!("{}{}", field, self.path)
        } else {
            format!("{}.{}", field, self.path)
        };
        self
    }

    /// Prefix a collection index onto the error path.
    #[must_use]
    pub fn at(mut self, index: usize) -> Self {
        self.path = if self.path.is_empty() || self.path.starts_with('[') {
            format!("[{}]{}", index, self.path)
        } else {
            format!("[{}].{}", index, self.path)
        };
        self
    }

    /// Full dotted path of the failing field, empty for leaf errors.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Top-level wire name of the failing field.
    pub fn field(&self) -> &str {
        let end = self
            .path
            .find(['.', '['])
            .unwrap_or(self.path.len());
        &self.path[..end]
    }

    pub fn reason(&self) -> &FieldReason {
        &self.reason
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.reason)
        } else {
            write!(f, "\"{}\": {}", self.path, self.reason)
        }
    }
}

impl std::error::Error for FieldError {}

/// The first problem the entity parser ran into.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    /// The input was not valid JSON at all.
    #[error("invalid text representation: {0}")]
    InvalidText(String),

    /// The input was JSON, but not an object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Field(#[from] FieldError),

    /// An entity-specific rule spanning several fields was violated.
    #[error("{0}")]
    Invariant(String),
}

impl ParseFailure {
    /// Wire name of the field the failure is attributed to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ParseFailure::Identity(err) => Some(err.component().wire_name()),
            ParseFailure::Field(err) => Some(err.field()),
            ParseFailure::InvalidText(_)
            | ParseFailure::NotAnObject(_)
            | ParseFailure::Invariant(_) => None,
        }
    }
}

/// A failed parse of a whole protocol object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// Entity kind, e.g. `Location`.
    pub kind: &'static str,
    pub failure: ParseFailure,
}

impl ParseError {
    pub fn new(kind: &'static str, failure: impl Into<ParseFailure>) -> Self {
        ParseError {
            kind,
            failure: failure.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let article = match self.kind.chars().next() {
            Some('A' | 'E' | 'I' | 'O' | 'U') => "an",
            _ => "a",
        };
        write!(
            f,
            "The given JSON representation of {} {} is invalid: {}",
            article, self.kind, self.failure
        )
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.failure)
    }
}

/// Why a merge patch was rejected. The caller always gets the pre-patch
/// entity back alongside this error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("Invalid JSON merge patch for {description}: expected a JSON object, found {found}!")]
    NotAnObject {
        description: &'static str,
        found: &'static str,
    },

    #[error("Patching the '{label}' of {description} is not allowed!")]
    Immutable {
        field: &'static str,
        label: &'static str,
        description: &'static str,
    },

    #[error("Invalid JSON merge patch for {description}: '{field}' must not be null!")]
    NullMandatory {
        field: &'static str,
        description: &'static str,
    },

    #[error("Invalid JSON merge patch for {description}: '{field}' must be {expected}, not {found}!")]
    InvalidShape {
        field: &'static str,
        description: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid JSON merge patch for {description}: 'last_updated' is not a valid timestamp: {reason}")]
    InvalidTimestamp {
        description: &'static str,
        reason: String,
    },

    /// The merged object failed the entity's own validation.
    #[error("Invalid JSON merge patch for {description}: {failure}")]
    Rejected {
        description: &'static str,
        #[source]
        failure: ParseFailure,
    },
}

impl PatchError {
    /// Wire name of the field the patch was rejected for, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            PatchError::NotAnObject { .. } => None,
            PatchError::Immutable { field, .. }
            | PatchError::NullMandatory { field, .. }
            | PatchError::InvalidShape { field, .. } => Some(field),
            PatchError::InvalidTimestamp { .. } => Some(crate::LAST_UPDATED),
            PatchError::Rejected { failure, .. } => failure.field(),
        }
    }
}
