//! In-memory storage implementation

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::authorization::AuthorizationRepository;
use crate::domain::charging_station::ChargingStationRepository;
use crate::domain::consumption::ConsumptionRepository;
use crate::domain::meter_value::MeterValueRepository;
use crate::domain::site_area::SiteAreaRepository;
use crate::domain::tag::TagRepository;
use crate::domain::tenant::TenantRepository;
use crate::domain::transaction::TransactionRepository;
use crate::domain::user::UserRepository;
use crate::domain::{
    Authorization, AuthorizationFilter, ChargingStation, Consumption, DomainResult,
    NormalizedMeterValue, RepositoryProvider, SiteArea, Tag, Tenant, Transaction, User,
};

/// In-memory storage for development and testing
#[derive(Default)]
pub struct InMemoryStorage {
    tenants: DashMap<String, Tenant>,
    charging_stations: DashMap<String, ChargingStation>,
    site_areas: DashMap<String, SiteArea>,
    transactions: DashMap<i32, Transaction>,
    consumptions: DashMap<i32, Vec<Consumption>>,
    meter_values: DashMap<i32, Vec<NormalizedMeterValue>>,
    users: DashMap<String, User>,
    tags: DashMap<String, Tag>,
    authorizations: DashMap<String, Authorization>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TenantRepository for InMemoryStorage {
    async fn get_tenant(&self, id: &str) -> DomainResult<Option<Tenant>> {
        Ok(self.tenants.get(id).map(|t| t.clone()))
    }

    async fn save_tenant(&self, tenant: Tenant) -> DomainResult<()> {
        self.tenants.insert(tenant.id.clone(), tenant);
        Ok(())
    }
}

#[async_trait]
impl ChargingStationRepository for InMemoryStorage {
    async fn save_charging_station(&self, station: ChargingStation) -> DomainResult<()> {
        self.charging_stations.insert(station.id.clone(), station);
        Ok(())
    }

    async fn get_charging_station(&self, id: &str) -> DomainResult<Option<ChargingStation>> {
        Ok(self.charging_stations.get(id).map(|cs| cs.clone()))
    }

    async fn find_by_site_area(&self, site_area_id: &str) -> DomainResult<Vec<ChargingStation>> {
        let mut stations: Vec<ChargingStation> = self
            .charging_stations
            .iter()
            .filter(|e| e.value().site_area_id.as_deref() == Some(site_area_id))
            .map(|e| e.value().clone())
            .collect();
        stations.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(stations)
    }
}

#[async_trait]
impl SiteAreaRepository for InMemoryStorage {
    async fn get_site_area(&self, id: &str) -> DomainResult<Option<SiteArea>> {
        Ok(self.site_areas.get(id).map(|sa| sa.clone()))
    }

    async fn save_site_area(&self, site_area: SiteArea) -> DomainResult<()> {
        self.site_areas.insert(site_area.id.clone(), site_area);
        Ok(())
    }
}

#[async_trait]
impl TransactionRepository for InMemoryStorage {
    async fn save(&self, transaction: Transaction) -> DomainResult<()> {
        self.transactions.insert(transaction.id, transaction);
        Ok(())
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Transaction>> {
        Ok(self.transactions.get(&id).map(|tx| tx.clone()))
    }

    async fn find_by_roaming_session_id(
        &self,
        session_id: &str,
    ) -> DomainResult<Option<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .find(|e| e.value().roaming_session_id.as_deref() == Some(session_id))
            .map(|e| e.value().clone()))
    }
}

#[async_trait]
impl ConsumptionRepository for InMemoryStorage {
    async fn save_consumptions(&self, consumptions: Vec<Consumption>) -> DomainResult<()> {
        for consumption in consumptions {
            let mut stored = self.consumptions.entry(consumption.transaction_id).or_default();
            match stored.iter_mut().find(|c| c.id == consumption.id) {
                Some(existing) => *existing = consumption,
                None => stored.push(consumption),
            }
            stored.sort_by_key(|c| c.ended_at);
        }
        Ok(())
    }

    async fn get_transaction_consumptions(
        &self,
        transaction_id: i32,
    ) -> DomainResult<Vec<Consumption>> {
        Ok(self
            .consumptions
            .get(&transaction_id)
            .map(|c| c.clone())
            .unwrap_or_default())
    }

    async fn get_last_consumption(&self, transaction_id: i32) -> DomainResult<Option<Consumption>> {
        Ok(self
            .consumptions
            .get(&transaction_id)
            .and_then(|c| c.last().cloned()))
    }

    async fn delete_consumptions(&self, transaction_id: i32) -> DomainResult<usize> {
        Ok(self
            .consumptions
            .remove(&transaction_id)
            .map_or(0, |(_, deleted)| deleted.len()))
    }
}

#[async_trait]
impl MeterValueRepository for InMemoryStorage {
    async fn save_meter_values(&self, meter_values: Vec<NormalizedMeterValue>) -> DomainResult<()> {
        for meter_value in meter_values {
            let mut stored = self.meter_values.entry(meter_value.transaction_id).or_default();
            stored.push(meter_value);
            // Stable: samples sharing a timestamp keep their arrival order
            stored.sort_by_key(|mv| mv.timestamp);
        }
        Ok(())
    }

    async fn get_meter_values(&self, transaction_id: i32) -> DomainResult<Vec<NormalizedMeterValue>> {
        Ok(self
            .meter_values
            .get(&transaction_id)
            .map(|mv| mv.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl UserRepository for InMemoryStorage {
    async fn get_user(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn save_user(&self, user: User) -> DomainResult<()> {
        self.users.insert(user.id.clone(), user);
        Ok(())
    }
}

#[async_trait]
impl TagRepository for InMemoryStorage {
    async fn get_tag(&self, id: &str) -> DomainResult<Option<Tag>> {
        Ok(self.tags.get(id).map(|t| t.clone()))
    }

    async fn save_tag(&self, tag: Tag) -> DomainResult<()> {
        self.tags.insert(tag.id.clone(), tag);
        Ok(())
    }
}

#[async_trait]
impl AuthorizationRepository for InMemoryStorage {
    async fn save_authorization(&self, authorization: Authorization) -> DomainResult<()> {
        self.authorizations
            .insert(authorization.id.clone(), authorization);
        Ok(())
    }

    async fn find_authorizations(
        &self,
        filter: &AuthorizationFilter,
    ) -> DomainResult<Vec<Authorization>> {
        let mut found: Vec<Authorization> = self
            .authorizations
            .iter()
            .filter(|e| filter.matches(e.value()))
            .map(|e| e.value().clone())
            .collect();
        found.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }
}

impl RepositoryProvider for InMemoryStorage {
    fn tenants(&self) -> &dyn TenantRepository {
        self
    }

    fn charging_stations(&self) -> &dyn ChargingStationRepository {
        self
    }

    fn site_areas(&self) -> &dyn SiteAreaRepository {
        self
    }

    fn transactions(&self) -> &dyn TransactionRepository {
        self
    }

    fn consumptions(&self) -> &dyn ConsumptionRepository {
        self
    }

    fn meter_values(&self) -> &dyn MeterValueRepository {
        self
    }

    fn users(&self) -> &dyn UserRepository {
        self
    }

    fn tags(&self) -> &dyn TagRepository {
        self
    }

    fn authorizations(&self) -> &dyn AuthorizationRepository {
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────
