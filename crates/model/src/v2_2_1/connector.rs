use ocpi_contract::{
    wire_enum, FieldError, FieldRule, Fields, FromWire, ObjectWriter, ParseFailure, Patchable,
    ProtocolObject, Timestamp, ToWire,
};
use serde_json::{Map, Value};

use super::common::ID_RULE;

wire_enum! {
    /// Socket or plug standard.
    pub enum ConnectorType {
        Chademo => "CHADEMO",
        Chaoji => "CHAOJI",
        DomesticA => "DOMESTIC_A",
        DomesticB => "DOMESTIC_B",
        DomesticC => "DOMESTIC_C",
        DomesticD => "DOMESTIC_D",
        DomesticE => "DOMESTIC_E",
        DomesticF => "DOMESTIC_F",
        DomesticG => "DOMESTIC_G",
        DomesticH => "DOMESTIC_H",
        DomesticI => "DOMESTIC_I",
        DomesticJ => "DOMESTIC_J",
        DomesticK => "DOMESTIC_K",
        DomesticL => "DOMESTIC_L",
        GbtAc => "GBT_AC",
        GbtDc => "GBT_DC",
        Iec60309Single16 => "IEC_60309_2_single_16",
        Iec60309Three16 => "IEC_60309_2_three_16",
        Iec60309Three32 => "IEC_60309_2_three_32",
        Iec60309Three64 => "IEC_60309_2_three_64",
        Iec62196T1 => "IEC_62196_T1",
        Iec62196T1Combo => "IEC_62196_T1_COMBO",
        Iec62196T2 => "IEC_62196_T2",
        Iec62196T2Combo => "IEC_62196_T2_COMBO",
        Iec62196T3A => "IEC_62196_T3A",
        Iec62196T3C => "IEC_62196_T3C",
        Nema520 => "NEMA_5_20",
        Nema630 => "NEMA_6_30",
        Nema650 => "NEMA_6_50",
        Nema1030 => "NEMA_10_30",
        Nema1050 => "NEMA_10_50",
        Nema1430 => "NEMA_14_30",
        Nema1450 => "NEMA_14_50",
        PantographBottomUp => "PANTOGRAPH_BOTTOM_UP",
        PantographTopDown => "PANTOGRAPH_TOP_DOWN",
        TeslaR => "TESLA_R",
        TeslaS => "TESLA_S",
    }
}

wire_enum! {
    pub enum ConnectorFormat {
        Socket => "SOCKET",
        Cable => "CABLE",
    }
}

wire_enum! {
    pub enum PowerType {
        Ac1Phase => "AC_1_PHASE",
        Ac2Phase => "AC_2_PHASE",
        Ac2PhaseSplit => "AC_2_PHASE_SPLIT",
        Ac3Phase => "AC_3_PHASE",
        Dc => "DC",
    }
}

/// One socket or cable of an EVSE. Identified by `id` within its EVSE.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub id: String,
    pub standard: ConnectorType,
    pub format: ConnectorFormat,
    pub power_type: PowerType,
    pub max_voltage: u32,
    pub max_amperage: u32,
    pub max_electric_power: Option<u32>,
    pub tariff_ids: Vec<String>,
    pub terms_and_conditions: Option<String>,
    pub last_updated: Timestamp,
}

impl Connector {
    fn read(fields: &Fields<'_>) -> Result<Self, FieldError> {
        Ok(Connector {
            id: fields.mandatory("id")?,
            standard: fields.mandatory("standard")?,
            format: fields.mandatory("format")?,
            power_type: fields.mandatory("power_type")?,
            max_voltage: fields.mandatory("max_voltage")?,
            max_amperage: fields.mandatory("max_amperage")?,
            max_electric_power: fields.optional("max_electric_power")?,
            tariff_ids: fields.optional_list("tariff_ids")?,
            terms_and_conditions: fields.optional("terms_and_conditions")?,
            last_updated: fields
                .optional("last_updated")?
                .unwrap_or_else(Timestamp::now),
        })
    }
}

impl ProtocolObject for Connector {
    const KIND: &'static str = "Connector";
    type Context = ();

    fn from_fields(fields: &Fields<'_>, _context: &()) -> Result<Self, ParseFailure> {
        Ok(Connector::read(fields)?)
    }

    fn to_object(&self) -> Map<String, Value> {
        ObjectWriter::new()
            .field("id", &self.id)
            .field("standard", &self.standard)
            .field("format", &self.format)
            .field("power_type", &self.power_type)
            .field("max_voltage", &self.max_voltage)
            .field("max_amperage", &self.max_amperage)
            .optional("max_electric_power", self.max_electric_power.as_ref())
            .optional_list("tariff_ids", &self.tariff_ids)
            .optional("terms_and_conditions", self.terms_and_conditions.as_ref())
            .field("last_updated", &self.last_updated)
            .finish()
    }

    fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

impl Patchable for Connector {
    const DESCRIPTION: &'static str = "a connector";
    const PATCH_RULES: &'static [FieldRule] = &[
        ID_RULE,
        FieldRule::replaceable("standard"),
        FieldRule::replaceable("format"),
        FieldRule::replaceable("power_type"),
        FieldRule::replaceable("max_voltage"),
        FieldRule::replaceable("max_amperage"),
        FieldRule::clearable("max_electric_power"),
        FieldRule::clearable("tariff_ids").collection(),
        FieldRule::clearable("terms_and_conditions"),
    ];

    fn patch_context(&self) {}
}

impl FromWire for Connector {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        Connector::read(&Fields::of(value)?)
    }
}

impl ToWire for Connector {
    fn to_wire(&self) -> Value {
        self.to_json()
    }
}
