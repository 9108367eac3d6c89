//! Statically wired integrations
//!
//! The host process registers one implementation per collaborator. Pricing
//! and billing are only handed out to tenants with the matching component
//! active; vendor integrations are keyed by station vendor name.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::charging_station::ChargingStation;
use crate::domain::ports::{
    BillingProvider, ChargingStationVendor, IntegrationProvider, OcpiCpoClient, OicpCpoClient,
    PricingProvider,
};
use crate::domain::tenant::{Tenant, TenantComponent};

#[derive(Default, Clone)]
pub struct StaticIntegrations {
    pricing: Option<Arc<dyn PricingProvider>>,
    billing: Option<Arc<dyn BillingProvider>>,
    vendors: HashMap<String, Arc<dyn ChargingStationVendor>>,
    ocpi: Option<Arc<dyn OcpiCpoClient>>,
    oicp: Option<Arc<dyn OicpCpoClient>>,
}

impl StaticIntegrations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pricing(mut self, pricing: Arc<dyn PricingProvider>) -> Self {
        self.pricing = Some(pricing);
        self
    }

    pub fn with_billing(mut self, billing: Arc<dyn BillingProvider>) -> Self {
        self.billing = Some(billing);
        self
    }

    pub fn with_vendor(
        mut self,
        vendor_name: impl Into<String>,
        vendor: Arc<dyn ChargingStationVendor>,
    ) -> Self {
        self.vendors.insert(vendor_name.into().to_lowercase(), vendor);
        self
    }

    pub fn with_ocpi_client(mut self, client: Arc<dyn OcpiCpoClient>) -> Self {
        self.ocpi = Some(client);
        self
    }

    pub fn with_oicp_client(mut self, client: Arc<dyn OicpCpoClient>) -> Self {
        self.oicp = Some(client);
        self
    }
}

impl IntegrationProvider for StaticIntegrations {
    fn pricing(&self, tenant: &Tenant) -> Option<Arc<dyn PricingProvider>> {
        if !tenant.is_component_active(TenantComponent::Pricing) {
            return None;
        }
        self.pricing.clone()
    }

    fn billing(&self, tenant: &Tenant) -> Option<Arc<dyn BillingProvider>> {
        if !tenant.is_component_active(TenantComponent::Billing) {
            return None;
        }
        self.billing.clone()
    }

    fn vendor(&self, station: &ChargingStation) -> Option<Arc<dyn ChargingStationVendor>> {
        let vendor = station.vendor.as_deref()?.to_lowercase();
        self.vendors.get(&vendor).cloned()
    }

    // Roaming clients are returned regardless of the component flags; the
    // relay checks the components itself so it can report which is missing.
    fn ocpi_cpo_client(&self, _tenant: &Tenant) -> Option<Arc<dyn OcpiCpoClient>> {
        self.ocpi.clone()
    }

    fn oicp_cpo_client(&self, _tenant: &Tenant) -> Option<Arc<dyn OicpCpoClient>> {
        self.oicp.clone()
    }
}
