//! Domain layer
//!
//! Entities per aggregate (`model.rs` + `repository.rs`), the
//! `RepositoryProvider` and the collaborator ports.

pub mod authorization;
pub mod charging_station;
pub mod consumption;
pub mod meter_value;
pub mod ports;
pub mod repositories;
pub mod site_area;
pub mod tag;
pub mod tenant;
pub mod transaction;
pub mod user;

// Re-export commonly used types
pub use authorization::{Authorization, AuthorizationFilter};
pub use charging_station::{
    ChargingStation, Connector, ConnectorLimit, ConnectorLimitSource, CurrentType,
    RemoteAuthorization,
};
pub use consumption::{Consumption, PhaseSlot, PhaseValues};
pub use meter_value::{
    Measurand, MeterValueAttribute, NormalizedMeterValue, Phase, ReadingContext, UnitOfMeasure,
    ValueFormat,
};
pub use site_area::{SiteArea, SiteAreaLimitSource};
pub use tag::{OcpiToken, Tag};
pub use tenant::{Tenant, TenantComponent};
pub use transaction::{
    BillingData, BillingDataStop, InactivityStatus, LastConsumption, Transaction,
    TransactionAction, TransactionStop,
};
pub use user::{User, UserOrigin};

pub use repositories::{DomainResult, RepositoryProvider};
pub use crate::shared::errors::DomainError;
