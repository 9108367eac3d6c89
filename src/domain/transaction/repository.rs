//! Transaction repository interface

use async_trait::async_trait;

use super::model::Transaction;
use crate::domain::DomainResult;

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Insert or replace
    async fn save(&self, transaction: Transaction) -> DomainResult<()>;
    async fn find_by_id(&self, id: i32) -> DomainResult<Option<Transaction>>;
    /// Transaction already mirrored to a roaming session with this id
    async fn find_by_roaming_session_id(&self, session_id: &str)
        -> DomainResult<Option<Transaction>>;
}
