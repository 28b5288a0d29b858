//! ocpi-model: OCPI entities declared over `ocpi-contract`.
//!
//! Each protocol version lives in its own module. A version module only
//! declares fields, patch policies and invariants; parsing, rendering and
//! patching come from the contract crate.

pub mod v2_2_1;
