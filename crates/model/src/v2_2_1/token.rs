use ocpi_contract::{
    last_updated_or_now, resolve_keyed, wire_enum, CountryCode, Entity, FieldError, FieldRule,
    Fields, FromWire, Identity, IdentityFragment, ObjectWriter, ParseFailure, PartyId, Patchable,
    ProtocolObject, Timestamp, ToWire,
};
use serde_json::{Map, Value};

use super::common::{TokenType, COUNTRY_CODE_RULE, PARTY_ID_RULE};

wire_enum! {
    /// When the token may be authorized without a real-time check.
    pub enum WhitelistType {
        Always => "ALWAYS",
        Allowed => "ALLOWED",
        AllowedOffline => "ALLOWED_OFFLINE",
        Never => "NEVER",
    }
}

wire_enum! {
    pub enum ProfileType {
        Cheap => "CHEAP",
        Fast => "FAST",
        Green => "GREEN",
        Regular => "REGULAR",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyContract {
    pub supplier_name: String,
    pub contract_id: Option<String>,
}

impl FromWire for EnergyContract {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        let fields = Fields::of(value)?;
        Ok(EnergyContract {
            supplier_name: fields.mandatory("supplier_name")?,
            contract_id: fields.optional("contract_id")?,
        })
    }
}

impl ToWire for EnergyContract {
    fn to_wire(&self) -> Value {
        ObjectWriter::new()
            .field("supplier_name", &self.supplier_name)
            .optional("contract_id", self.contract_id.as_ref())
            .into_json()
    }
}

/// An authorization token. Its local id travels as `uid` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub country_code: CountryCode,
    pub party_id: PartyId,
    pub uid: String,
    pub token_type: TokenType,
    pub contract_id: String,
    pub visual_number: Option<String>,
    pub issuer: String,
    pub group_id: Option<String>,
    pub valid: bool,
    pub whitelist: WhitelistType,
    pub language: Option<String>,
    pub default_profile_type: Option<ProfileType>,
    pub energy_contract: Option<EnergyContract>,
    pub last_updated: Timestamp,
}

impl ProtocolObject for Token {
    const KIND: &'static str = "Token";
    type Context = IdentityFragment;

    fn from_fields(
        fields: &Fields<'_>,
        context: &IdentityFragment,
    ) -> Result<Self, ParseFailure> {
        let in_band = IdentityFragment::read(fields, "uid")?;
        let identity = resolve_keyed(context, &in_band, "uid")?;
        Ok(Token {
            country_code: identity.country_code,
            party_id: identity.party_id,
            uid: identity.id,
            token_type: fields.mandatory("type")?,
            contract_id: fields.mandatory("contract_id")?,
            visual_number: fields.optional("visual_number")?,
            issuer: fields.mandatory("issuer")?,
            group_id: fields.optional("group_id")?,
            valid: fields.mandatory("valid")?,
            whitelist: fields.mandatory("whitelist")?,
            language: fields.optional("language")?,
            default_profile_type: fields.optional("default_profile_type")?,
            energy_contract: fields.optional("energy_contract")?,
            last_updated: last_updated_or_now(fields)?,
        })
    }

    fn to_object(&self) -> Map<String, Value> {
        ObjectWriter::new()
            .field("country_code", &self.country_code)
            .field("party_id", &self.party_id)
            .field("uid", &self.uid)
            .field("type", &self.token_type)
            .field("contract_id", &self.contract_id)
            .optional("visual_number", self.visual_number.as_ref())
            .field("issuer", &self.issuer)
            .optional("group_id", self.group_id.as_ref())
            .field("valid", &self.valid)
            .field("whitelist", &self.whitelist)
            .optional("language", self.language.as_ref())
            .optional("default_profile_type", self.default_profile_type.as_ref())
            .optional("energy_contract", self.energy_contract.as_ref())
            .field("last_updated", &self.last_updated)
            .finish()
    }

    fn last_updated(&self) -> Timestamp {
        self.last_updated
    }
}

impl Entity for Token {
    fn identity(&self) -> Identity {
        Identity {
            country_code: self.country_code.clone(),
            party_id: self.party_id.clone(),
            id: self.uid.clone(),
        }
    }
}

impl Patchable for Token {
    const DESCRIPTION: &'static str = "a token";
    const PATCH_RULES: &'static [FieldRule] = &[
        COUNTRY_CODE_RULE,
        PARTY_ID_RULE,
        FieldRule::immutable("uid", "identification"),
        FieldRule::immutable("type", "token type"),
        FieldRule::replaceable("contract_id"),
        FieldRule::clearable("visual_number"),
        FieldRule::replaceable("issuer"),
        FieldRule::clearable("group_id"),
        FieldRule::replaceable("valid"),
        FieldRule::replaceable("whitelist"),
        FieldRule::clearable("language"),
        FieldRule::clearable("default_profile_type"),
        FieldRule::clearable("energy_contract").object(),
    ];

    fn patch_context(&self) -> IdentityFragment {
        IdentityFragment::from(&self.identity())
    }
}
