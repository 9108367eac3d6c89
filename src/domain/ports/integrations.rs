//! Resolution of collaborators per tenant / station

use std::sync::Arc;

use super::{BillingProvider, ChargingStationVendor, OcpiCpoClient, OicpCpoClient, PricingProvider};
use crate::domain::charging_station::ChargingStation;
use crate::domain::tenant::Tenant;

/// Looks up the collaborators configured for a tenant.
///
/// `None` means "not configured": pricing, billing and vendor lookups then
/// fall back to their defaults, roaming treats it as a hard failure.
pub trait IntegrationProvider: Send + Sync {
    fn pricing(&self, tenant: &Tenant) -> Option<Arc<dyn PricingProvider>>;
    fn billing(&self, tenant: &Tenant) -> Option<Arc<dyn BillingProvider>>;
    fn vendor(&self, station: &ChargingStation) -> Option<Arc<dyn ChargingStationVendor>>;
    fn ocpi_cpo_client(&self, tenant: &Tenant) -> Option<Arc<dyn OcpiCpoClient>>;
    fn oicp_cpo_client(&self, tenant: &Tenant) -> Option<Arc<dyn OicpCpoClient>>;
}
