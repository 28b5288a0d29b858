//! Identity triad reconciliation.
//!
//! Party-owned entities are identified by `(country_code, party_id, id)`. A
//! receiver usually learns the triad twice: once from the request path and
//! once from the JSON body. [`resolve`] merges the two and refuses to guess
//! when they disagree.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::FieldError;
use crate::fields::Fields;
use crate::wire::{FromWire, ToWire};

/// ISO 3166-1 alpha-2 country code of a party.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CountryCode {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 2 && s.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(CountryCode(s.to_string()))
        } else {
            Err(FieldError::invalid(format!(
                "'{}' is not a two-letter uppercase country code",
                s
            )))
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Three-character party identifier, unique within a country.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartyId(String);

impl PartyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PartyId {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 3
            && s
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        {
            Ok(PartyId(s.to_string()))
        } else {
            Err(FieldError::invalid(format!(
                "'{}' is not a three-character uppercase party id",
                s
            )))
        }
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromWire for CountryCode {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        String::from_wire(value)?.parse()
    }
}

impl ToWire for CountryCode {
    fn to_wire(&self) -> Value {
        Value::String(self.0.clone())
    }
}

impl FromWire for PartyId {
    fn from_wire(value: &Value) -> Result<Self, FieldError> {
        String::from_wire(value)?.parse()
    }
}

impl ToWire for PartyId {
    fn to_wire(&self) -> Value {
        Value::String(self.0.clone())
    }
}

/// One of the three parts of an entity identity. The local id carries its
/// wire key, which differs per entity (`id`, `uid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityComponent {
    CountryCode,
    PartyId,
    LocalId(&'static str),
}

impl IdentityComponent {
    pub const fn wire_name(self) -> &'static str {
        match self {
            IdentityComponent::CountryCode => "country_code",
            IdentityComponent::PartyId => "party_id",
            IdentityComponent::LocalId(key) => key,
        }
    }
}

impl fmt::Display for IdentityComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Neither source supplied the component.
    #[error("\"{0}\": missing")]
    MissingComponent(IdentityComponent),

    /// Both sources supplied the component, with different values.
    #[error("\"{component}\": '{in_band}' does not match '{out_of_band}' given out-of-band")]
    ConflictingComponent {
        component: IdentityComponent,
        out_of_band: String,
        in_band: String,
    },
}

impl IdentityError {
    pub fn component(&self) -> IdentityComponent {
        match self {
            IdentityError::MissingComponent(component)
            | IdentityError::ConflictingComponent { component, .. } => *component,
        }
    }
}

/// A fully resolved identity.
///
/// Ordering and equality are over the triad only, country first, so sorting
/// entities by identity groups them by owning party.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity {
    pub country_code: CountryCode,
    pub party_id: PartyId,
    pub id: String,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.country_code, self.party_id, self.id)
    }
}

/// Whatever parts of an identity one source knows about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFragment {
    pub country_code: Option<CountryCode>,
    pub party_id: Option<PartyId>,
    pub id: Option<String>,
}

impl IdentityFragment {
    pub fn new() -> Self {
        IdentityFragment::default()
    }

    #[must_use]
    pub fn with_country_code(mut self, country_code: CountryCode) -> Self {
        self.country_code = Some(country_code);
        self
    }

    #[must_use]
    pub fn with_party_id(mut self, party_id: PartyId) -> Self {
        self.party_id = Some(party_id);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.country_code.is_none() && self.party_id.is_none() && self.id.is_none()
    }

    /// Read the in-band fragment from an entity body. `id_key` is the wire
    /// name of the local id (`id` for most entities, `uid` for tokens).
    pub fn read(fields: &Fields<'_>, id_key: &str) -> Result<Self, FieldError> {
        Ok(IdentityFragment {
            country_code: fields.optional("country_code")?,
            party_id: fields.optional("party_id")?,
            id: fields.optional(id_key)?,
        })
    }
}

impl From<&Identity> for IdentityFragment {
    fn from(identity: &Identity) -> Self {
        IdentityFragment {
            country_code: Some(identity.country_code.clone()),
            party_id: Some(identity.party_id.clone()),
            id: Some(identity.id.clone()),
        }
    }
}

/// Reconcile the out-of-band and in-band views of an identity.
///
/// Each component is checked on its own, country first: absent from both is
/// an error, present in both with different values is an error, otherwise
/// whichever source has it wins.
pub fn resolve(
    out_of_band: &IdentityFragment,
    in_band: &IdentityFragment,
) -> Result<Identity, IdentityError> {
    resolve_keyed(out_of_band, in_band, "id")
}

/// [`resolve`] for entities whose local id travels under another key, so
/// errors name the key the body actually uses.
pub fn resolve_keyed(
    out_of_band: &IdentityFragment,
    in_band: &IdentityFragment,
    id_key: &'static str,
) -> Result<Identity, IdentityError> {
    let country_code = reconcile(
        IdentityComponent::CountryCode,
        out_of_band.country_code.as_ref(),
        in_band.country_code.as_ref(),
    )?;
    let party_id = reconcile(
        IdentityComponent::PartyId,
        out_of_band.party_id.as_ref(),
        in_band.party_id.as_ref(),
    )?;
    let id = reconcile(
        IdentityComponent::LocalId(id_key),
        out_of_band.id.as_ref(),
        in_band.id.as_ref(),
    )?;

    Ok(Identity {
        country_code,
        party_id,
        id,
    })
}

fn reconcile<T>(
    component: IdentityComponent,
    out_of_band: Option<&T>,
    in_band: Option<&T>,
) -> Result<T, IdentityError>
where
    T: Clone + PartialEq + fmt::Display,
{
    match (out_of_band, in_band) {
        (None, None) => Err(IdentityError::MissingComponent(component)),
        (Some(oob), Some(body)) if oob != body => Err(IdentityError::ConflictingComponent {
            component,
            out_of_band: oob.to_string(),
            in_band: body.to_string(),
        }),
        (Some(value), _) | (None, Some(value)) => Ok(value.clone()),
    }
}
