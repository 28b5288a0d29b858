//! Dispatch from a command-line entity kind to the typed model.

use clap::ValueEnum;
use ocpi_contract::{IdentityFragment, ParseError, PatchError, Patchable, ProtocolObject, Timestamp};
use ocpi_model::v2_2_1::{Cdr, Connector, Evse, Location, Session, Tariff, Token};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Location,
    Evse,
    Connector,
    Session,
    Cdr,
    Tariff,
    Token,
}

/// An entity after a successful parse, in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub kind: &'static str,
    pub canonical: Value,
    pub last_updated: Timestamp,
}

/// Result of a patch attempt. `entity` is the patched entity on success and
/// the untouched original on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchReport {
    pub kind: &'static str,
    pub entity: Value,
    pub error: Option<PatchError>,
}

impl EntityKind {
    pub fn parse(self, text: &str, path: &IdentityFragment) -> Result<Parsed, ParseError> {
        match self {
            EntityKind::Location => parse_as::<Location>(text, path),
            EntityKind::Evse => parse_as::<Evse>(text, path),
            EntityKind::Connector => parse_as::<Connector>(text, path),
            EntityKind::Session => parse_as::<Session>(text, path),
            EntityKind::Cdr => parse_as::<Cdr>(text, path),
            EntityKind::Tariff => parse_as::<Tariff>(text, path),
            EntityKind::Token => parse_as::<Token>(text, path),
        }
    }

    /// Parse `entity`, then apply `patch` to it.
    pub fn patch(
        self,
        entity: &str,
        patch: &Value,
        path: &IdentityFragment,
    ) -> Result<PatchReport, String> {
        match self {
            EntityKind::Location => patch_as::<Location>(entity, patch, path),
            EntityKind::Evse => patch_as::<Evse>(entity, patch, path),
            EntityKind::Connector => patch_as::<Connector>(entity, patch, path),
            EntityKind::Session => patch_as::<Session>(entity, patch, path),
            EntityKind::Tariff => patch_as::<Tariff>(entity, patch, path),
            EntityKind::Token => patch_as::<Token>(entity, patch, path),
            EntityKind::Cdr => Err("CDRs are final and do not accept patches".to_string()),
        }
    }
}

/// Builds a parser context from the identity given on the command line.
trait FromPath {
    fn from_path(path: &IdentityFragment) -> Self;
}

/// Sub-entities (EVSEs, connectors) carry no party identity of their own.
impl FromPath for () {
    fn from_path(_path: &IdentityFragment) {}
}

impl FromPath for IdentityFragment {
    fn from_path(path: &IdentityFragment) -> Self {
        path.clone()
    }
}

fn parse_typed<T>(text: &str, path: &IdentityFragment) -> Result<T, ParseError>
where
    T: ProtocolObject,
    T::Context: FromPath,
{
    T::parse(text, &<T::Context as FromPath>::from_path(path))
}

fn parse_as<T>(text: &str, path: &IdentityFragment) -> Result<Parsed, ParseError>
where
    T: ProtocolObject,
    T::Context: FromPath,
{
    let entity = parse_typed::<T>(text, path)?;
    tracing::debug!(kind = T::KIND, last_updated = %entity.last_updated(), "parsed entity");
    Ok(Parsed {
        kind: T::KIND,
        canonical: entity.to_json(),
        last_updated: entity.last_updated(),
    })
}

fn patch_as<T>(entity: &str, patch: &Value, path: &IdentityFragment) -> Result<PatchReport, String>
where
    T: Patchable,
    T::Context: FromPath,
{
    let current = parse_typed::<T>(entity, path).map_err(|e| e.to_string())?;
    let (patched, error) = current.patch(patch).into_parts();
    Ok(PatchReport {
        kind: T::KIND,
        entity: patched.to_json(),
        error,
    })
}
