use ocpi_contract::{
    last_updated_or_now, resolve, wire_enum, CountryCode, Entity, FieldError, FieldRule, Fields,
    FromWire, Identity, IdentityFragment, ObjectWriter, ParseFailure, PartyId, Patchable,
    ProtocolObject, Timestamp, ToWire,
};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::common::{
    currency_code, DisplayText, Price, COUNTRY_CODE_RULE, ID_RULE, PARTY_ID_RULE,
};

wire_enum! {
    pub enum TariffType {
        AdHocPayment => "AD_HOC_PAYMENT",
        ProfileCheap => "PROFILE_CHEAP",
        ProfileFast => "PROFILE_FAST",
        ProfileGreen => "PROFILE_GREEN",
        Regular => "REGULAR",
    }
}

wire_enum! {
    /// What a price component is charged for.
    pub enum TariffDimensionType {
        Energy => "ENERGY",
        Flat => "FLAT",
        ParkingTime => "PARKING_TIME",
        Time => "TIME",
    }
}

wire_enum! {
    pub enum DayOfWeek {
        Monday => "MONDAY",
        Tuesday => "TUESDAY",
        Wednesday => "WEDNESDAY",
        Thursday => "THURSDAY",
        Friday => "FRIDAY",
        Saturday => "SATURDAY",
        Sunday => "SUNDAY",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceComponent {
    pub component_type: TariffDimensionType,
    /// Price per unit, excluding VAT.
    pub price: Decimal,
    pub vat: Option<Decimal>,
    /// Billing granularity in the dimension's unit.
    pub step_size: u32,
}

impl FromWire for PriceComponent {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(PriceComponent {
            component_type: fields.mandatory("type")?,
            price: fields.mandatory("price")?,
            vat: fields.optional("vat")?,
            step_size: fields.mandatory("step_size")?,
        })
    }
}

impl ToWire for PriceComponent {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("type", &self.component_type)
            .field("price", &self.price)
            .optional("vat", self.vat.as_ref())
            .field("step_size", &self.step_size)
            .into_json()
    }
}

/// Conditions under which a tariff element applies. Times and dates are
/// kept as the wire strings (`HH:MM`, `YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TariffRestrictions {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_kwh: Option<Decimal>,
    pub max_kwh: Option<Decimal>,
    pub min_current: Option<Decimal>,
    pub max_current: Option<Decimal>,
    pub min_power: Option<Decimal>,
    pub max_power: Option<Decimal>,
    pub min_duration: Option<u32>,
    pub max_duration: Option<u32>,
    pub day_of_week: Vec<DayOfWeek>,
}

impl FromWire for TariffRestrictions {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(TariffRestrictions {
            start_time: fields.optional("start_time")?,
            end_time: fields.optional("end_time")?,
            start_date: fields.optional("start_date")?,
            end_date: fields.optional("end_date")?,
            min_kwh: fields.optional("min_kwh")?,
            max_kwh: fields.optional("max_kwh")?,
            min_current: fields.optional("min_current")?,
            max_current: fields.optional("max_current")?,
            min_power: fields.optional("min_power")?,
            max_power: fields.optional("max_power")?,
            min_duration: fields.optional("min_duration")?,
            max_duration: fields.optional("max_duration")?,
            day_of_week: fields.optional_list("day_of_week")?,
        })
    }
}

impl ToWire for TariffRestrictions {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .optional("start_time", self.start_time.as_ref())
            .optional("end_time", self.end_time.as_ref())
            .optional("start_date", self.start_date.as_ref())
            .optional("end_date", self.end_date.as_ref())
            .optional("min_kwh", self.min_kwh.as_ref())
            .optional("max_kwh", self.max_kwh.as_ref())
            .optional("min_current", self.min_current.as_ref())
            .optional("max_current", self.max_current.as_ref())
            .optional("min_power", self.min_power.as_ref())
            .optional("max_power", self.max_power.as_ref())
            .optional("min_duration", self.min_duration.as_ref())
            .optional("max_duration", self.max_duration.as_ref())
            .optional_list("day_of_week", &self.day_of_week)
            .into_json()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffElement {
    /// Never empty.
    pub price_components: Vec<PriceComponent>,
    pub restrictions: Option<TariffRestrictions>,
}

impl FromWire for TariffElement {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        let element = TariffElement {
            price_components: fields.mandatory_list("price_components")?,
            restrictions: fields.optional("restrictions")?,
        };
        if element.price_components.is_empty() {
            return Err(FieldError::invalid("must contain at least one price component")
                .within("price_components"));
        }
        Ok(element)
    }
}

impl ToWire for TariffElement {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .list("price_components", &self.price_components)
            .optional("restrictions", self.restrictions.as_ref())
            .into_json()
    }
}

/// A tariff. Elements are kept in wire order, which decides which element
/// applies when several match.
#[derive(Debug, Clone, PartialEq)]
pub struct Tariff {
    pub country_code: CountryCode,
    pub party_id: PartyId,
    pub id: String,
    pub currency: String,
    pub tariff_type: Option<TariffType>,
    pub tariff_alt_text: Vec<DisplayText>,
    pub tariff_alt_url: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub elements: Vec<TariffElement>,
    pub energy_mix: Option<Value>,
    pub start_date_time: Option<Timestamp>,
    pub end_date_time: Option<Timestamp>,
    pub last_updated: Timestamp,
}

impl ProtocolObject for Tariff {
    const KIND: &'static str = "Tariff";
    type Context = IdentityFragment;

    fn from_fields(
        fields: &Fields<'_>,
        context: &IdentityFragment,
    ) -> Result<Self, ParseFailure> {
        let identity = resolve(context, &IdentityFragment::read(fields, "id")?)?;
        let tariff = Tariff {
            country_code: identity.country_code,
            party_id: identity.party_id,
            id: identity.id,
            currency: fields.mandatory_with("currency", currency_code)?,
            tariff_type: fields.optional("type")?,
            tariff_alt_text: fields.optional_list("tariff_alt_text")?,
            tariff_alt_url: fields.optional("tariff_alt_url")?,
            min_price: fields.optional("min_price")?,
            max_price: fields.optional("max_price")?,
            elements: fields.mandatory_list("elements")?,
            energy_mix: fields.optional("energy_mix")?,
            start_date_time: fields.optional("start_date_time")?,
            end_date_time: fields.optional("end_date_time")?,
            last_updated: last_updated_or_now(fields)?,
        };

        if tariff.elements.is_empty() {
            return Err(FieldError::invalid("must contain at least one element")
                .within("elements")
                .into());
        }
        Ok(tariff)
    }

    fn to_object(&self) -> Map<String, Value> {
        ObjectWriter::new()
            .field("country_code", &self.country_code)
            .field("party_id", &self.party_id)
            .field("id", &self.id)
            .field("currency", &self.currency)
            .optional("type", self.tariff_type.as_ref())
            .optional_list("tariff_alt_text", &self.tariff_alt_text)
            .optional("tariff_alt_url", self.tariff_alt_url.as_ref())
            .optional("min_price", self.min_price.as_ref())
            .optional("max_price", self.max_price.as_ref())
            .list("elements", &self.elements)
            .optional("energy_mix", self.energy_mix.as_ref())
            .optional("start_date_time", self.start_date_time.as_ref())
            .optional("end_date_time", self.end_date_time.as_ref())
            .field("last_updated", &self.last_updated)
            .finish()
    }

    fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

impl Entity for Tariff {
    fn identity(&self) -> Identity {
        Identity {
            country_code: self.country_code.clone(),
            party_id: self.party_id.clone(),
            id: self.id.clone(),
        }
    }
}

impl Patchable for Tariff {
    const DESCRIPTION: &'static str = "a tariff";
    const PATCH_RULES: &'static [FieldRule] = &[
        COUNTRY_CODE_RULE,
        PARTY_ID_RULE,
        ID_RULE,
        FieldRule::replaceable("currency"),
        FieldRule::clearable("type"),
        FieldRule::clearable("tariff_alt_text").collection(),
        FieldRule::clearable("tariff_alt_url"),
        FieldRule::clearable("min_price").object(),
        FieldRule::clearable("max_price").object(),
        FieldRule::replaceable("elements").collection(),
        FieldRule::clearable("energy_mix").object(),
        FieldRule::clearable("start_date_time"),
        FieldRule::clearable("end_date_time"),
    ];

    fn patch_context(&self) -> IdentityFragment {
        IdentityFragment::from(&self.identity())
    }
}
