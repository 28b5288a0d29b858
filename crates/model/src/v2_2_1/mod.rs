//! OCPI 2.2.1 entities.

mod cdr;
mod common;
mod connector;
mod evse;
mod location;
mod session;
mod tariff;
mod token;

pub use cdr::{Cdr, CdrLocation};
pub use common::{
    AuthMethod, BusinessDetails, CdrDimension, CdrDimensionType, CdrToken, ChargingPeriod,
    DisplayText, GeoCoordinates, Price, TokenType,
};
pub use connector::{Connector, ConnectorFormat, ConnectorType, PowerType};
pub use evse::{Capability, Evse, EvseStatus, ParkingRestriction};
pub use location::{Facility, Location, ParkingType};
pub use session::{Session, SessionStatus};
pub use tariff::{
    DayOfWeek, PriceComponent, Tariff, TariffDimensionType, TariffElement, TariffRestrictions,
    TariffType,
};
pub use token::{EnergyContract, ProfileType, Token, WhitelistType};

/// Protocol version string these entities belong to.
pub const VERSION: &str = "2.2.1";
