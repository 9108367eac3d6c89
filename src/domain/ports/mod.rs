//! Domain ports (hexagonal architecture boundaries)
//!
//! Collaborators the engine drives but never implements: pricing and
//! billing engines, charging-station vendor integrations and the OCPI/OICP
//! CPO clients. [`IntegrationProvider`] resolves them per tenant / station.

pub mod billing;
pub mod integrations;
pub mod pricing;
pub mod roaming;
pub mod vendor;

pub use billing::{BillingDataTransactionStart, BillingProvider};
pub use integrations::IntegrationProvider;
pub use pricing::{PricedConsumption, PricingProvider, PricingSource};
pub use roaming::{OcpiCpoClient, OicpCpoClient, RoamingProtocol};
pub use vendor::ChargingStationVendor;
