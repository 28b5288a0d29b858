use ocpi_contract::{
    last_updated_or_now, resolve, wire_enum, CountryCode, Entity, FieldRule, Fields, Identity,
    IdentityFragment, ObjectWriter, ParseFailure, PartyId, Patchable, ProtocolObject, Timestamp,
};
use serde_json::{Map, Value};

use super::common::{
    ensure_unique, BusinessDetails, DisplayText, GeoCoordinates, COUNTRY_CODE_RULE, ID_RULE,
    PARTY_ID_RULE,
};
use super::evse::Evse;

wire_enum! {
    pub enum ParkingType {
        AlongMotorway => "ALONG_MOTORWAY",
        ParkingGarage => "PARKING_GARAGE",
        ParkingLot => "PARKING_LOT",
        OnDriveway => "ON_DRIVEWAY",
        OnStreet => "ON_STREET",
        UndergroundGarage => "UNDERGROUND_GARAGE",
    }
}

wire_enum! {
    /// Amenities at or near a location.
    pub enum Facility {
        Hotel => "HOTEL",
        Restaurant => "RESTAURANT",
        Cafe => "CAFE",
        Mall => "MALL",
        Supermarket => "SUPERMARKET",
        Sport => "SPORT",
        RecreationArea => "RECREATION_AREA",
        Nature => "NATURE",
        Museum => "MUSEUM",
        BikeSharing => "BIKE_SHARING",
        BusStop => "BUS_STOP",
        TaxiStand => "TAXI_STAND",
        TramStop => "TRAM_STOP",
        MetroStation => "METRO_STATION",
        TrainStation => "TRAIN_STATION",
        Airport => "AIRPORT",
        ParkingLot => "PARKING_LOT",
        CarpoolParking => "CARPOOL_PARKING",
        FuelStation => "FUEL_STATION",
        Wifi => "WIFI",
    }
}

/// A charging location and the EVSEs it groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub country_code: CountryCode,
    pub party_id: PartyId,
    pub id: String,
    pub publish: bool,
    pub name: Option<String>,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub state: Option<String>,
    /// ISO 3166-1 alpha-3 code of the country the location is in.
    pub country: String,
    pub coordinates: GeoCoordinates,
    pub parking_type: Option<ParkingType>,
    pub evses: Vec<Evse>,
    pub directions: Vec<DisplayText>,
    pub operator: Option<BusinessDetails>,
    pub suboperator: Option<BusinessDetails>,
    pub owner: Option<BusinessDetails>,
    pub facilities: Vec<Facility>,
    pub time_zone: String,
    /// Regular hours and exceptions, passed through untouched.
    pub opening_times: Option<Value>,
    pub charging_when_closed: Option<bool>,
    pub energy_mix: Option<Value>,
    pub last_updated: Timestamp,
}

impl Location {
    pub fn evse(&self, uid: &str) -> Option<&Evse> {
        self.evses.iter().find(|evse| evse.uid == uid)
    }
}

impl ProtocolObject for Location {
    const KIND: &'static str = "Location";
    type Context = IdentityFragment;

    fn from_fields(
        fields: &Fields<'_>,
        context: &IdentityFragment,
    ) -> Result<Self, ParseFailure> {
        let identity = resolve(context, &IdentityFragment::read(fields, "id")?)?;
        let location = Location {
            country_code: identity.country_code,
            party_id: identity.party_id,
            id: identity.id,
            publish: fields.mandatory("publish")?,
            name: fields.optional("name")?,
            address: fields.mandatory("address")?,
            city: fields.mandatory("city")?,
            postal_code: fields.optional("postal_code")?,
            state: fields.optional("state")?,
            country: fields.mandatory("country")?,
            coordinates: fields.mandatory("coordinates")?,
            parking_type: fields.optional("parking_type")?,
            evses: fields.optional_list("evses")?,
            directions: fields.optional_list("directions")?,
            operator: fields.optional("operator")?,
            suboperator: fields.optional("suboperator")?,
            owner: fields.optional("owner")?,
            facilities: fields.optional_list("facilities")?,
            time_zone: fields.mandatory("time_zone")?,
            opening_times: fields.optional("opening_times")?,
            charging_when_closed: fields.optional("charging_when_closed")?,
            energy_mix: fields.optional("energy_mix")?,
            last_updated: last_updated_or_now(fields)?,
        };
        ensure_unique("evses", &location.evses, |evse| evse.uid.as_str())?;
        Ok(location)
    }

    fn to_object(&self) -> Map<String, Value> {
        ObjectWriter::new()
            .field("country_code", &self.country_code)
            .field("party_id", &self.party_id)
            .field("id", &self.id)
            .field("publish", &self.publish)
            .optional("name", self.name.as_ref())
            .field("address", &self.address)
            .field("city", &self.city)
            .optional("postal_code", self.postal_code.as_ref())
            .optional("state", self.state.as_ref())
            .field("country", &self.country)
            .field("coordinates", &self.coordinates)
            .optional("parking_type", self.parking_type.as_ref())
            .optional_list("evses", &self.evses)
            .optional_list("directions", &self.directions)
            .optional("operator", self.operator.as_ref())
            .optional("suboperator", self.suboperator.as_ref())
            .optional("owner", self.owner.as_ref())
            .optional_list("facilities", &self.facilities)
            .field("time_zone", &self.time_zone)
            .optional("opening_times", self.opening_times.as_ref())
            .optional("charging_when_closed", self.charging_when_closed.as_ref())
            .optional("energy_mix", self.energy_mix.as_ref())
            .field("last_updated", &self.last_updated)
            .finish()
    }

    fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

impl Entity for Location {
    fn identity(&self) -> Identity {
        Identity {
            country_code: self.country_code.clone(),
            party_id: self.party_id.clone(),
            id: self.id.clone(),
        }
    }
}

impl Patchable for Location {
    const DESCRIPTION: &'static str = "a charging location";
    const PATCH_RULES: &'static [FieldRule] = &[
        COUNTRY_CODE_RULE,
        PARTY_ID_RULE,
        ID_RULE,
        FieldRule::replaceable("publish"),
        FieldRule::clearable("name"),
        FieldRule::replaceable("address"),
        FieldRule::replaceable("city"),
        FieldRule::clearable("postal_code"),
        FieldRule::clearable("state"),
        FieldRule::replaceable("country"),
        FieldRule::replaceable("coordinates").object(),
        FieldRule::clearable("parking_type"),
        FieldRule::clearable("evses").collection(),
        FieldRule::clearable("directions").collection(),
        FieldRule::clearable("operator").object(),
        FieldRule::clearable("suboperator").object(),
        FieldRule::clearable("owner").object(),
        FieldRule::clearable("facilities").collection(),
        FieldRule::replaceable("time_zone"),
        FieldRule::clearable("opening_times").object(),
        FieldRule::clearable("charging_when_closed"),
        FieldRule::clearable("energy_mix").object(),
    ];

    fn patch_context(&self) -> IdentityFragment {
        IdentityFragment::from(&self.identity())
    }
}
