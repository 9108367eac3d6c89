//! Charging-station vendor port

use async_trait::async_trait;

use crate::domain::charging_station::{ChargingStation, ConnectorLimit};
use crate::domain::tenant::Tenant;
use crate::domain::DomainResult;

/// Vendor-specific station integration
#[async_trait]
pub trait ChargingStationVendor: Send + Sync {
    /// Limit currently applied by the station on a connector
    async fn get_current_connector_limit(
        &self,
        tenant: &Tenant,
        station: &ChargingStation,
        connector_id: u32,
    ) -> DomainResult<ConnectorLimit>;
}
