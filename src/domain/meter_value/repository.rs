//! Raw meter value repository interface

use async_trait::async_trait;

use super::model::NormalizedMeterValue;
use crate::domain::DomainResult;

#[async_trait]
pub trait MeterValueRepository: Send + Sync {
    async fn save_meter_values(&self, meter_values: Vec<NormalizedMeterValue>) -> DomainResult<()>;
    /// All samples of a transaction, oldest first
    async fn get_meter_values(&self, transaction_id: i32) -> DomainResult<Vec<NormalizedMeterValue>>;
}
