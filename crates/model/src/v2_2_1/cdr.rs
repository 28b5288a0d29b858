use ocpi_contract::{
    last_updated_or_now, resolve, CountryCode, Entity, FieldError, Fields, FromWire, Identity,
    IdentityFragment, ObjectWriter, ParseFailure, PartyId, ProtocolObject, Timestamp, ToWire,
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::common::{currency_code, AuthMethod, CdrToken, ChargingPeriod, GeoCoordinates, Price};
use super::connector::{ConnectorFormat, ConnectorType, PowerType};

/// Where a CDR's session took place, frozen at the time of charging.
#[derive(Debug, Clone, PartialEq)]
pub struct CdrLocation {
    pub id: String,
    pub name: Option<String>,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub coordinates: GeoCoordinates,
    pub evse_uid: String,
    pub evse_id: String,
    pub connector_id: String,
    pub connector_standard: ConnectorType,
    pub connector_format: ConnectorFormat,
    pub connector_power_type: PowerType,
}

impl FromWire for CdrLocation {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(CdrLocation {
            id: fields.mandatory("id")?,
            name: fields.optional("name")?,
            address: fields.mandatory("address")?,
            city: fields.mandatory("city")?,
            postal_code: fields.optional("postal_code")?,
            state: fields.optional("state")?,
            country: fields.mandatory("country")?,
            coordinates: fields.mandatory("coordinates")?,
            evse_uid: fields.mandatory("evse_uid")?,
            evse_id: fields.mandatory("evse_id")?,
            connector_id: fields.mandatory("connector_id")?,
            connector_standard: fields.mandatory("connector_standard")?,
            connector_format: fields.mandatory("connector_format")?,
            connector_power_type: fields.mandatory("connector_power_type")?,
        })
    }
}

impl ToWire for CdrLocation {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("id", &self.id)
            .optional("name", self.name.as_ref())
            .field("address", &self.address)
            .field("city", &self.city)
            .optional("postal_code", self.postal_code.as_ref())
            .optional("state", self.state.as_ref())
            .field("country", &self.country)
            .field("coordinates", &self.coordinates)
            .field("evse_uid", &self.evse_uid)
            .field("evse_id", &self.evse_id)
            .field("connector_id", &self.connector_id)
            .field("connector_standard", &self.connector_standard)
            .field("connector_format", &self.connector_format)
            .field("connector_power_type", &self.connector_power_type)
            .into_json()
    }
}

/// Charge detail record: the billed account of a finished session.
///
/// CDRs are final once issued. They can be parsed and rendered but do not
/// accept patches.
#[derive(Debug, Clone, PartialEq)]
pub struct Cdr {
    pub country_code: CountryCode,
    pub party_id: PartyId,
    pub id: String,
    pub start_date_time: Timestamp,
    pub end_date_time: Timestamp,
    pub session_id: Option<String>,
    pub cdr_token: CdrToken,
    pub auth_method: AuthMethod,
    pub authorization_reference: Option<String>,
    pub cdr_location: CdrLocation,
    pub meter_id: Option<String>,
    pub currency: String,
    /// Never empty.
    pub charging_periods: Vec<ChargingPeriod>,
    pub total_cost: Price,
    pub total_fixed_cost: Option<Price>,
    pub total_energy: Decimal,
    pub total_energy_cost: Option<Price>,
    /// Hours.
    pub total_time: Decimal,
    pub total_time_cost: Option<Price>,
    pub total_parking_time: Option<Decimal>,
    pub total_parking_cost: Option<Price>,
    pub remark: Option<String>,
    pub credit: Option<bool>,
    pub credit_reference_id: Option<String>,
    pub last_updated: Timestamp,
}

impl ProtocolObject for Cdr {
    const KIND: &'static str = "CDR";
    type Context = IdentityFragment;

    fn from_fields(
        fields: &Fields<'_>,
        context: &IdentityFragment,
    ) -> Result<Self, ParseFailure> {
        let identity = resolve(context, &IdentityFragment::read(fields, "id")?)?;
        let cdr = Cdr {
            country_code: identity.country_code,
            party_id: identity.party_id,
            id: identity.id,
            start_date_time: fields.mandatory("start_date_time")?,
            end_date_time: fields.mandatory("end_date_time")?,
            session_id: fields.optional("session_id")?,
            cdr_token: fields.mandatory("cdr_token")?,
            auth_method: fields.mandatory("auth_method")?,
            authorization_reference: fields.optional("authorization_reference")?,
            cdr_location: fields.mandatory("cdr_location")?,
            meter_id: fields.optional("meter_id")?,
            currency: fields.mandatory_with("currency", currency_code)?,
            charging_periods: fields.mandatory_list("charging_periods")?,
            total_cost: fields.mandatory("total_cost")?,
            total_fixed_cost: fields.optional("total_fixed_cost")?,
            total_energy: fields.mandatory("total_energy")?,
            total_energy_cost: fields.optional("total_energy_cost")?,
            total_time: fields.mandatory("total_time")?,
            total_time_cost: fields.optional("total_time_cost")?,
            total_parking_time: fields.optional("total_parking_time")?,
            total_parking_cost: fields.optional("total_parking_cost")?,
            remark: fields.optional("remark")?,
            credit: fields.optional("credit")?,
            credit_reference_id: fields.optional("credit_reference_id")?,
            last_updated: last_updated_or_now(fields)?,
        };

        if cdr.charging_periods.is_empty() {
            return Err(FieldError::invalid("must contain at least one charging period")
                .within("charging_periods")
                .into());
        }
        if cdr.end_date_time < cdr.start_date_time {
            return Err(ParseFailure::Invariant(format!(
                "end_date_time {} lies before start_date_time {}",
                cdr.end_date_time, cdr.start_date_time
            )));
        }
        Ok(cdr)
    }

    fn to_object(&self) -> Map<String, Value> {
        ObjectWriter::new()
            .field("country_code", &self.country_code)
            .field("party_id", &self.party_id)
            .field("id", &self.id)
            .field("start_date_time", &self.start_date_time)
            .field("end_date_time", &self.end_date_time)
            .optional("session_id", self.session_id.as_ref())
            .field("cdr_token", &self.cdr_token)
            .field("auth_method", &self.auth_method)
            .optional("authorization_reference", self.authorization_reference.as_ref())
            .field("cdr_location", &self.cdr_location)
            .optional("meter_id", self.meter_id.as_ref())
            .field("currency", &self.currency)
            .list("charging_periods", &self.charging_periods)
            .field("total_cost", &self.total_cost)
            .optional("total_fixed_cost", self.total_fixed_cost.as_ref())
            .field("total_energy", &self.total_energy)
            .optional("total_energy_cost", self.total_energy_cost.as_ref())
            .field("total_time", &self.total_time)
            .optional("total_time_cost", self.total_time_cost.as_ref())
            .optional("total_parking_time", self.total_parking_time.as_ref())
            .optional("total_parking_cost", self.total_parking_cost.as_ref())
            .optional("remark", self.remark.as_ref())
            .optional("credit", self.credit.as_ref())
            .optional("credit_reference_id", self.credit_reference_id.as_ref())
            .field("last_updated", &self.last_updated)
            .finish()
    }

    fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

impl Entity for Cdr {
    fn identity(&self) -> Identity {
        Identity {
            country_code: self.country_code.clone(),
            party_id: self.party_id.clone(),
            id: self.id.clone(),
        }
    }
}
