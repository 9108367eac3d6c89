//! Charging station repository interface

use async_trait::async_trait;

use super::model::ChargingStation;
use crate::domain::DomainResult;

#[async_trait]
pub trait ChargingStationRepository: Send + Sync {
    async fn save_charging_station(&self, station: ChargingStation) -> DomainResult<()>;
    async fn get_charging_station(&self, id: &str) -> DomainResult<Option<ChargingStation>>;
    async fn find_by_site_area(&self, site_area_id: &str) -> DomainResult<Vec<ChargingStation>>;
}
