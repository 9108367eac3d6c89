//! Per-call view of the station a transaction runs on

use crate::domain::charging_station::ChargingStation;
use crate::domain::site_area::SiteArea;
use crate::domain::tenant::Tenant;
use crate::domain::transaction::Transaction;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

/// Tenant, station and site area loaded once per lifecycle call.
///
/// The site area is mutable: a computed maximum power is cached on it.
#[derive(Debug, Clone)]
pub struct StationContext {
    pub tenant: Tenant,
    pub station: ChargingStation,
    pub site_area: Option<SiteArea>,
}

impl StationContext {
    pub async fn load(
        repos: &dyn RepositoryProvider,
        tenant_id: &str,
        transaction: &Transaction,
    ) -> DomainResult<Self> {
        let tenant = repos
            .tenants()
            .get_tenant(tenant_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Tenant", "id", tenant_id))?;

        let station = repos
            .charging_stations()
            .get_charging_station(&transaction.charge_point_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("ChargingStation", "id", &transaction.charge_point_id)
            })?;

        let site_area_id = station
            .site_area_id
            .as_deref()
            .or(transaction.site_area_id.as_deref());
        let site_area = match site_area_id {
            Some(id) => repos.site_areas().get_site_area(id).await?,
            None => None,
        };

        Ok(Self {
            tenant,
            station,
            site_area,
        })
    }
}
