//! UTC timestamps with millisecond precision.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::FieldError;
use crate::wire::{FromWire, ToWire};

/// A point in time as exchanged on the wire: UTC, millisecond precision,
/// rendered as `2020-10-15T00:00:00.000Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(OffsetDateTime);

impl Timestamp {
    /// Current wall-clock time. The only place this crate reads the clock.
    pub fn now() -> Self {
        Timestamp::from(OffsetDateTime::now_utc())
    }

    /// Parse an RFC 3339 timestamp. A timestamp without any offset is taken
    /// to be UTC, which some parties still send.
    pub fn parse(s: &str) -> Result<Self, FieldError> {
        if let Ok(dt) = OffsetDateTime::parse(s, &Rfc3339) {
            return Ok(Timestamp::from(dt));
        }
        let local = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        );
        PrimitiveDateTime::parse(s, local)
            .map(|dt| Timestamp::from(dt.assume_utc()))
            .map_err(|e| FieldError::invalid(format!("'{}' is not a timestamp: {}", s, e)))
    }

    pub fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(dt: OffsetDateTime) -> Self {
        let utc = dt.to_offset(UtcOffset::UTC);
        // Sub-millisecond digits never survive the wire, so drop them here
        // to keep parse(serialize(t)) == t.
        Timestamp(utc.replace_millisecond(utc.millisecond()).unwrap_or(utc))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let canonical = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        );
        let text = self.0.format(canonical).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Timestamp {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timestamp::parse(s)
    }
}

impl FromWire for Timestamp {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        Timestamp::parse(&String::from_wire(value)?)
    }
}

impl ToWire for Timestamp {
    fn to_wire(&self) -> Value {
        Value::String(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn renders_millisecond_utc() {
        let ts = Timestamp::parse("2020-10-15T00:00:00Z").unwrap();
        assert_eq!(ts.to_string(), "2020-10-15T00:00:00.000Z");
        assert_eq!(ts.as_offset_date_time(), datetime!(2020-10-15 00:00:00 UTC));
    }

    #[test]
    fn offsets_are_normalised_to_utc() {
        let ts = Timestamp::parse("2020-10-15T02:30:00.250+02:00").unwrap();
        assert_eq!(ts.to_string(), "2020-10-15T00:30:00.250Z");
    }

    #[test]
    fn sub_millisecond_digits_are_truncated() {
        let ts = Timestamp::parse("2020-10-15T00:00:00.123456789Z").unwrap();
        assert_eq!(ts.to_string(), "2020-10-15T00:00:00.123Z");
        assert_eq!(Timestamp::parse(&ts.to_string()).unwrap(), ts);
    }

    #[test]
    fn missing_offset_is_utc() {
        let ts = Timestamp::parse("2020-10-15T12:00:00").unwrap();
        assert_eq!(ts.to_string(), "2020-10-15T12:00:00.000Z");
    }

    #[test]
    fn early_years_keep_four_digits() {
        let ts = Timestamp::from(datetime!(0999-01-02 03:04:05.006 UTC));
        assert_eq!(ts.to_string(), "0999-01-02T03:04:05.006Z");
        assert_eq!(Timestamp::parse(&ts.to_string()).unwrap(), ts);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Timestamp::parse("yesterday").is_err());
        assert!(Timestamp::from_wire(&serde_json::json!(1602720000)).is_err());
    }
}
