//! Value types shared by several entities.

use std::collections::HashSet;

use ocpi_contract::{
    json_type, wire_enum, CountryCode, FieldError, FieldRule, Fields, FromWire, ObjectWriter,
    PartyId, Timestamp, ToWire,
};
use rust_decimal::Decimal;
use serde_json::Value;

pub(crate) const COUNTRY_CODE_RULE: FieldRule =
    FieldRule::immutable("country_code", "country code");
pub(crate) const PARTY_ID_RULE: FieldRule =
    FieldRule::immutable("party_id", "party identification");
pub(crate) const ID_RULE: FieldRule = FieldRule::immutable("id", "identification");

/// Decode an ISO 4217 currency code.
pub(crate) fn currency_code(value: &Value) -> Result<String, String> {
    let code = value
        .as_str()
        .ok_or_else(|| format!("expected string, found {}", json_type(value)))?;
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(code.to_string())
    } else {
        Err(format!("'{}' is not an ISO 4217 currency code", code))
    }
}

/// Fail on the first element whose key was already seen, pointing at that
/// element of `field`.
pub(crate) fn ensure_unique<T>(
    field: &str,
    items: &[T],
    key: impl Fn(&T) -> &str,
) -> Result<(), FieldError> {
    let mut seen = HashSet::new();
    for (index, item) in items.iter().enumerate() {
        let key = key(item);
        if !seen.insert(key) {
            return Err(FieldError::invalid(format!("duplicate identifier '{}'", key))
                .at(index)
                .within(field));
        }
    }
    Ok(())
}

wire_enum! {
    /// How a session was authorized.
    pub enum AuthMethod {
        AuthRequest => "AUTH_REQUEST",
        Command => "COMMAND",
        Whitelist => "WHITELIST",
    }
}

wire_enum! {
    pub enum TokenType {
        AdHocUser => "AD_HOC_USER",
        AppUser => "APP_USER",
        Other => "OTHER",
        Rfid => "RFID",
    }
}

wire_enum! {
    /// What a charging period dimension measures.
    pub enum CdrDimensionType {
        Current => "CURRENT",
        Energy => "ENERGY",
        EnergyExport => "ENERGY_EXPORT",
        EnergyImport => "ENERGY_IMPORT",
        MaxCurrent => "MAX_CURRENT",
        MinCurrent => "MIN_CURRENT",
        MaxPower => "MAX_POWER",
        MinPower => "MIN_POWER",
        ParkingTime => "PARKING_TIME",
        Power => "POWER",
        ReservationTime => "RESERVATION_TIME",
        StateOfCharge => "STATE_OF_CHARGE",
        Time => "TIME",
    }
}

/// Localized text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText {
    pub language: String,
    pub text: String,
}

impl FromWire for DisplayText {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(DisplayText {
            language: fields.mandatory("language")?,
            text: fields.mandatory("text")?,
        })
    }
}

impl ToWire for DisplayText {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("language", &self.language)
            .field("text", &self.text)
            .into_json()
    }
}

/// WGS 84 coordinates, kept as the decimal strings the wire carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoCoordinates {
    pub latitude: String,
    pub longitude: String,
}

impl FromWire for GeoCoordinates {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(GeoCoordinates {
            latitude: fields.mandatory("latitude")?,
            longitude: fields.mandatory("longitude")?,
        })
    }
}

impl ToWire for GeoCoordinates {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .into_json()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusinessDetails {
    pub name: String,
    pub website: Option<String>,
    /// Image reference, passed through untouched.
    pub logo: Option<Value>,
}

impl FromWire for BusinessDetails {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(BusinessDetails {
            name: fields.mandatory("name")?,
            website: fields.optional("website")?,
            logo: fields.optional("logo")?,
        })
    }
}

impl ToWire for BusinessDetails {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("name", &self.name)
            .optional("website", self.website.as_ref())
            .optional("logo", self.logo.as_ref())
            .into_json()
    }
}

/// An amount of money, optionally with VAT included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price {
    pub excl_vat: Decimal,
    pub incl_vat: Option<Decimal>,
}

impl FromWire for Price {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(Price {
            excl_vat: fields.mandatory("excl_vat")?,
            incl_vat: fields.optional("incl_vat")?,
        })
    }
}

impl ToWire for Price {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("excl_vat", &self.excl_vat)
            .optional("incl_vat", self.incl_vat.as_ref())
            .into_json()
    }
}

/// The token a session or CDR was authorized with, as copied into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdrToken {
    pub country_code: CountryCode,
    pub party_id: PartyId,
    pub uid: String,
    pub token_type: TokenType,
    pub contract_id: String,
}

impl FromWire for CdrToken {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(CdrToken {
            country_code: fields.mandatory("country_code")?,
            party_id: fields.mandatory("party_id")?,
            uid: fields.mandatory("uid")?,
            token_type: fields.mandatory("type")?,
            contract_id: fields.mandatory("contract_id")?,
        })
    }
}

impl ToWire for CdrToken {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("country_code", &self.country_code)
            .field("party_id", &self.party_id)
            .field("uid", &self.uid)
            .field("type", &self.token_type)
            .field("contract_id", &self.contract_id)
            .into_json()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdrDimension {
    pub dimension_type: CdrDimensionType,
    pub volume: Decimal,
}

impl FromWire for CdrDimension {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(CdrDimension {
            dimension_type: fields.mandatory("type")?,
            volume: fields.mandatory("volume")?,
        })
    }
}

impl ToWire for CdrDimension {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("type", &self.dimension_type)
            .field("volume", &self.volume)
            .into_json()
    }
}

/// A stretch of a session during which the charging conditions held steady.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingPeriod {
    pub start_date_time: Timestamp,
    /// Never empty.
    pub dimensions: Vec<CdrDimension>,
    pub tariff_id: Option<String>,
}

impl FromWire for ChargingPeriod {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        let period = ChargingPeriod {
            start_date_time: fields.mandatory("start_date_time")?,
            dimensions: fields.mandatory_list("dimensions")?,
            tariff_id: fields.optional("tariff_id")?,
        };
        if period.dimensions.is_empty() {
            return Err(
                FieldError::invalid("must contain at least one dimension").within("dimensions")
            );
        }
        Ok(period)
    }
}

impl ToWire for ChargingPeriod {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("start_date_time", &self.start_date_time)
            .list("dimensions", &self.dimensions)
            .optional("tariff_id", self.tariff_id.as_ref())
            .into_json()
    }
}
