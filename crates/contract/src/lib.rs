//! ocpi-contract: the protocol object contract shared by every OCPI entity.
//!
//! Every entity (Location, Session, CDR, Tariff, Token, ...) follows the same
//! discipline, implemented here once:
//!
//! - the `(country_code, party_id, id)` triad is reconciled between the
//!   out-of-band source (the request path) and the JSON body ([`identity`]);
//! - wire fields are read as mandatory or optional, with every failure naming
//!   its field path ([`fields`], [`wire`]);
//! - entities render to one canonical, declaration-ordered JSON object
//!   ([`object`]);
//! - partial updates follow JSON merge-patch rules under a per-field
//!   mutability policy, and a rejected patch still hands back a usable
//!   entity ([`patch`]).
//!
//! Entity crates declare their fields against these building blocks; they
//! never hand-roll parsing or patch logic.

pub mod entity;
pub mod error;
pub mod fields;
pub mod identity;
pub mod object;
pub mod patch;
pub mod timestamp;
pub mod wire;

pub use entity::{last_updated_or_now, Entity, ProtocolObject};
pub use error::{FieldError, FieldReason, ParseError, ParseFailure, PatchError};
pub use fields::Fields;
pub use identity::{
    resolve, resolve_keyed, CountryCode, Identity, IdentityComponent, IdentityError,
    IdentityFragment, PartyId,
};
pub use object::ObjectWriter;
pub use patch::{FieldRule, Mutability, PatchOutcome, Patchable, Shape};
pub use timestamp::Timestamp;
pub use wire::{json_type, FromWire, ToWire};

#[doc(hidden)]
pub use serde_json;

/// Wire name of the timestamp every protocol object carries.
pub const LAST_UPDATED: &str = "last_updated";
