//! Value codecs between JSON wire values and Rust types.

use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Number, Value};

use crate::error::FieldError;

/// Decode a Rust value from a single JSON wire value.
///
/// Errors are leaf errors without a path; the field extractor adds it.
pub trait FromWire: Sized {
    fn from_wire(value: &Value) -> Result<Self, FieldError>;
}

/// Encode a Rust value as a JSON wire value.
pub trait ToWire {
    fn to_wire(&self) -> Value;
}

/// JSON type name used in shape errors.
pub fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FromWire for String {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| FieldError::shape("string", value))
    }
}

impl ToWire for String {
    fn to_wire(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToWire for str {
    fn to_wire(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl FromWire for bool {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        value
            .as_bool()
            .ok_or_else(|| FieldError::shape("boolean", value))
    }
}

impl ToWire for bool {
    fn to_wire(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! integer_wire {
    ($($ty:ty),*) => {
        $(
            impl FromWire for $ty {
                fn from_wire(value: &Value) -> Result<Self, FieldError> {
                    let n = value
                        .as_i64()
                        .ok_or_else(|| FieldError::shape("integer", value))?;
                    <$ty>::try_from(n).map_err(|_| {
                        FieldError::invalid(format!(
                            "{} is out of range for {}",
                            n,
                            stringify!($ty)
                        ))
                    })
                }
            }

            impl ToWire for $ty {
                fn to_wire(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

integer_wire!(u16, u32, i32, i64);

impl FromWire for Decimal {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let Value::Number(n) = value else {
            return Err(FieldError::shape("number", value));
        };
        // The number keeps its source text, so no digit passes through f64.
        let text = n.to_string();
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|e| FieldError::invalid(format!("invalid decimal {}: {}", text, e)))
    }
}

impl ToWire for Decimal {
    /// Integral values become JSON integers; everything else a JSON number
    /// with exactly the decimal's digits.
    fn to_wire(&self) -> Value {
        let normalized = self.normalize();
        if let Some(i) = normalized.to_i64().filter(|_| normalized.scale() == 0) {
            return Value::from(i);
        }
        // Decimal renders as plain digits, which is always a JSON number.
        let text = normalized.to_string();
        match Number::from_str(&text) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(text),
        }
    }
}

/// Opaque pass-through for fields whose structure this layer does not
/// interpret.
impl FromWire for Value {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        Ok(value.clone())
    }
}

impl ToWire for Value {
    fn to_wire(&self) -> Value {
        self.clone()
    }
}

impl<T: FromWire> FromWire for Vec<T> {
    /// A failing element is reported with its index.
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let items = value
            .as_array()
            .ok_or_else(|| FieldError::shape("array", value))?;
        items
            .iter()
            .enumerate()
            .map(|(index, item)| T::from_wire(item).map_err(|e| e.at(index)))
            .collect()
    }
}

impl<T: ToWire> ToWire for [T] {
    fn to_wire(&self) -> Value {
        Value::Array(self.iter().map(ToWire::to_wire).collect())
    }
}

impl<T: ToWire> ToWire for Vec<T> {
    fn to_wire(&self) -> Value {
        self.as_slice().to_wire()
    }
}

/// Declare a protocol enumeration together with its wire strings.
///
/// ```
/// ocpi_contract::wire_enum! {
///     /// Format of a connector.
///     pub enum ConnectorFormat {
///         Socket => "SOCKET",
///         Cable => "CABLE",
///     }
/// }
///
/// assert_eq!(ConnectorFormat::Cable.as_str(), "CABLE");
/// assert!("PLUG".parse::<ConnectorFormat>().is_err());
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::FieldError;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $( $wire => Ok($name::$variant), )+
                    other => Err($crate::FieldError::unsupported(other)),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::FromWire for $name {
            fn from_wire(
                value: &$crate::serde_json::Value,
            ) -> ::std::result::Result<Self, $crate::FieldError> {
                match value.as_str() {
                    Some(s) => s.parse(),
                    None => Err($crate::FieldError::shape("string", value)),
                }
            }
        }

        impl $crate::ToWire for $name {
            fn to_wire(&self) -> $crate::serde_json::Value {
                $crate::serde_json::Value::String(self.as_str().to_owned())
            }
        }
    };
}
