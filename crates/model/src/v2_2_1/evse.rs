use ocpi_contract::{
    wire_enum, FieldError, FieldRule, Fields, FromWire, ObjectWriter, ParseFailure, Patchable,
    ProtocolObject, Timestamp, ToWire,
};
use serde_json::{Map, Value};

use super::common::{ensure_unique, DisplayText, GeoCoordinates};
use super::connector::Connector;

wire_enum! {
    pub enum EvseStatus {
        Available => "AVAILABLE",
        Blocked => "BLOCKED",
        Charging => "CHARGING",
        Inoperative => "INOPERATIVE",
        OutOfOrder => "OUTOFORDER",
        Planned => "PLANNED",
        Removed => "REMOVED",
        Reserved => "RESERVED",
        Unknown => "UNKNOWN",
    }
}

wire_enum! {
    pub enum Capability {
        ChargingProfileCapable => "CHARGING_PROFILE_CAPABLE",
        ChargingPreferencesCapable => "CHARGING_PREFERENCES_CAPABLE",
        ChipCardSupport => "CHIP_CARD_SUPPORT",
        ContactlessCardSupport => "CONTACTLESS_CARD_SUPPORT",
        CreditCardPayable => "CREDIT_CARD_PAYABLE",
        DebitCardPayable => "DEBIT_CARD_PAYABLE",
        PedTerminal => "PED_TERMINAL",
        RemoteStartStopCapable => "REMOTE_START_STOP_CAPABLE",
        Reservable => "RESERVABLE",
        RfidReader => "RFID_READER",
        StartSessionConnectorRequired => "START_SESSION_CONNECTOR_REQUIRED",
        TokenGroupCapable => "TOKEN_GROUP_CAPABLE",
        UnlockCapable => "UNLOCK_CAPABLE",
    }
}

wire_enum! {
    pub enum ParkingRestriction {
        EvOnly => "EV_ONLY",
        Plugged => "PLUGGED",
        Disabled => "DISABLED",
        Customers => "CUSTOMERS",
        Motorcycles => "MOTORCYCLES",
    }
}

/// A single charge point of a location, identified by `uid` within it.
///
/// Always carries at least one connector, and connector ids are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Evse {
    pub uid: String,
    pub evse_id: Option<String>,
    pub status: EvseStatus,
    pub capabilities: Vec<Capability>,
    pub connectors: Vec<Connector>,
    pub floor_level: Option<String>,
    pub coordinates: Option<GeoCoordinates>,
    pub physical_reference: Option<String>,
    pub directions: Vec<DisplayText>,
    pub parking_restrictions: Vec<ParkingRestriction>,
    pub last_updated: Timestamp,
}

impl Evse {
    fn read(fields: &Fields<'_>) -> Result<Self, FieldError> {
        let evse = Evse {
            uid: fields.mandatory("uid")?,
            evse_id: fields.optional("evse_id")?,
            status: fields.mandatory("status")?,
            capabilities: fields.optional_list("capabilities")?,
            connectors: fields.mandatory_list("connectors")?,
            floor_level: fields.optional("floor_level")?,
            coordinates: fields.optional("coordinates")?,
            physical_reference: fields.optional("physical_reference")?,
            directions: fields.optional_list("directions")?,
            parking_restrictions: fields.optional_list("parking_restrictions")?,
            last_updated: fields
                .optional("last_updated")?
                .unwrap_or_else(Timestamp::now),
        };

        if evse.connectors.is_empty() {
            return Err(
                FieldError::invalid("must contain at least one connector").within("connectors")
            );
        }
        ensure_unique("connectors", &evse.connectors, |c| c.id.as_str())?;
        Ok(evse)
    }

    pub fn connector(&self, id: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.id == id)
    }
}

impl ProtocolObject for Evse {
    const KIND: &'static str = "EVSE";
    type Context = ();

    fn from_fields(fields: &Fields<'_>, _context: &()) -> Result<Self, ParseFailure> {
        Ok(Evse::read(fields)?)
    }

    fn to_object(&self) -> Map<String, Value> {
        ObjectWriter::new()
            .field("uid", &self.uid)
            .optional("evse_id", self.evse_id.as_ref())
            .field("status", &self.status)
            .optional_list("capabilities", &self.capabilities)
            .list("connectors", &self.connectors)
            .optional("floor_level", self.floor_level.as_ref())
            .optional("coordinates", self.coordinates.as_ref())
            .optional("physical_reference", self.physical_reference.as_ref())
            .optional_list("directions", &self.directions)
            .optional_list("parking_restrictions", &self.parking_restrictions)
            .field("last_updated", &self.last_updated)
            .finish()
    }

    fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

impl Patchable for Evse {
    const DESCRIPTION: &'static str = "an EVSE";
    const PATCH_RULES: &'static [FieldRule] = &[
        FieldRule::immutable("uid", "identification"),
        FieldRule::clearable("evse_id"),
        FieldRule::replaceable("status"),
        FieldRule::clearable("capabilities").collection(),
        FieldRule::replaceable("connectors").collection(),
        FieldRule::clearable("floor_level"),
        FieldRule::clearable("coordinates").object(),
        FieldRule::clearable("physical_reference"),
        FieldRule::clearable("directions").collection(),
        FieldRule::clearable("parking_restrictions").collection(),
    ];

    fn patch_context(&self) {}
}

impl FromWire for Evse {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        Evse::read(&Fields::of(value)?)
    }
}

impl ToWire for Evse {
    fn to_wire(&self) -> Value {
        self.to_json()
    }
}
