//! Consumption repository interface

use async_trait::async_trait;

use super::model::Consumption;
use crate::domain::DomainResult;

#[async_trait]
pub trait ConsumptionRepository: Send + Sync {
    async fn save_consumptions(&self, consumptions: Vec<Consumption>) -> DomainResult<()>;
    /// All consumptions of a transaction ordered by `ended_at`
    async fn get_transaction_consumptions(&self, transaction_id: i32)
        -> DomainResult<Vec<Consumption>>;
    async fn get_last_consumption(&self, transaction_id: i32) -> DomainResult<Option<Consumption>>;
    /// Returns the number of deleted records
    async fn delete_consumptions(&self, transaction_id: i32) -> DomainResult<usize>;
}
