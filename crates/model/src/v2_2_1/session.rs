use ocpi_contract::{
    last_updated_or_now, resolve, wire_enum, CountryCode, Entity, FieldRule, Fields, Identity,
    IdentityFragment, ObjectWriter, ParseFailure, PartyId, Patchable, ProtocolObject, Timestamp,
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::common::{
    currency_code, AuthMethod, CdrToken, ChargingPeriod, Price, COUNTRY_CODE_RULE, ID_RULE,
    PARTY_ID_RULE,
};

wire_enum! {
    pub enum SessionStatus {
        Active => "ACTIVE",
        Completed => "COMPLETED",
        Invalid => "INVALID",
        Pending => "PENDING",
        Reservation => "RESERVATION",
    }
}

/// A charging session in progress or just finished.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub country_code: CountryCode,
    pub party_id: PartyId,
    pub id: String,
    pub start_date_time: Timestamp,
    /// Never earlier than `start_date_time`.
    pub end_date_time: Option<Timestamp>,
    pub kwh: Decimal,
    pub cdr_token: CdrToken,
    pub auth_method: AuthMethod,
    pub authorization_reference: Option<String>,
    pub location_id: String,
    pub evse_uid: String,
    pub connector_id: String,
    pub meter_id: Option<String>,
    pub currency: String,
    pub charging_periods: Vec<ChargingPeriod>,
    pub total_cost: Option<Price>,
    pub status: SessionStatus,
    pub last_updated: Timestamp,
}

impl ProtocolObject for Session {
    const KIND: &'static str = "Session";
    type Context = IdentityFragment;

    fn from_fields(
        fields: &Fields<'_>,
        context: &IdentityFragment,
    ) -> Result<Self, ParseFailure> {
        let identity = resolve(context, &IdentityFragment::read(fields, "id")?)?;
        let session = Session {
            country_code: identity.country_code,
            party_id: identity.party_id,
            id: identity.id,
            start_date_time: fields.mandatory("start_date_time")?,
            end_date_time: fields.optional("end_date_time")?,
            kwh: fields.mandatory("kwh")?,
            cdr_token: fields.mandatory("cdr_token")?,
            auth_method: fields.mandatory("auth_method")?,
            authorization_reference: fields.optional("authorization_reference")?,
            location_id: fields.mandatory("location_id")?,
            evse_uid: fields.mandatory("evse_uid")?,
            connector_id: fields.mandatory("connector_id")?,
            meter_id: fields.optional("meter_id")?,
            currency: fields.mandatory_with("currency", currency_code)?,
            charging_periods: fields.optional_list("charging_periods")?,
            total_cost: fields.optional("total_cost")?,
            status: fields.mandatory("status")?,
            last_updated: last_updated_or_now(fields)?,
        };

        if let Some(end) = session.end_date_time {
            if end < session.start_date_time {
                return Err(ParseFailure::Invariant(format!(
                    "end_date_time {} lies before start_date_time {}",
                    end, session.start_date_time
                )));
            }
        }
        Ok(session)
    }

    fn to_object(&self) -> Map<String, Value> {
        ObjectWriter::new()
            .field("country_code", &self.country_code)
            .field("party_id", &self.party_id)
            .field("id", &self.id)
            .field("start_date_time", &self.start_date_time)
            .optional("end_date_time", self.end_date_time.as_ref())
            .field("kwh", &self.kwh)
            .field("cdr_token", &self.cdr_token)
            .field("auth_method", &self.auth_method)
            .optional("authorization_reference", self.authorization_reference.as_ref())
            .field("location_id", &self.location_id)
            .field("evse_uid", &self.evse_uid)
            .field("connector_id", &self.connector_id)
            .optional("meter_id", self.meter_id.as_ref())
            .field("currency", &self.currency)
            .optional_list("charging_periods", &self.charging_periods)
            .optional("total_cost", self.total_cost.as_ref())
            .field("status", &self.status)
            .field("last_updated", &self.last_updated)
            .finish()
    }

    fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

impl Entity for Session {
    fn identity(&self) -> Identity {
        Identity {
            country_code: self.country_code.clone(),
            party_id: self.party_id.clone(),
            id: self.id.clone(),
        }
    }
}

impl Patchable for Session {
    const DESCRIPTION: &'static str = "a charging session";
    const PATCH_RULES: &'static [FieldRule] = &[
        COUNTRY_CODE_RULE,
        PARTY_ID_RULE,
        ID_RULE,
        FieldRule::replaceable("start_date_time"),
        FieldRule::clearable("end_date_time"),
        FieldRule::replaceable("kwh"),
        FieldRule::replaceable("cdr_token").object(),
        FieldRule::replaceable("auth_method"),
        FieldRule::clearable("authorization_reference"),
        FieldRule::replaceable("location_id"),
        FieldRule::replaceable("evse_uid"),
        FieldRule::replaceable("connector_id"),
        FieldRule::clearable("meter_id"),
        FieldRule::replaceable("currency"),
        FieldRule::clearable("charging_periods").collection(),
        FieldRule::clearable("total_cost").object(),
        FieldRule::replaceable("status"),
    ];

    fn patch_context(&self) -> IdentityFragment {
        IdentityFragment::from(&self.identity())
    }
}
