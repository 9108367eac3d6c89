//! Billing system port

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::transaction::{BillingDataStop, Transaction};
use crate::domain::DomainResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingDataTransactionStart {
    pub with_billing_active: bool,
}

/// Invoicing backend of a tenant
#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn start_transaction(
        &self,
        transaction: &Transaction,
    ) -> DomainResult<BillingDataTransactionStart>;

    async fn update_transaction(&self, transaction: &Transaction) -> DomainResult<()>;

    async fn stop_transaction(&self, transaction: &Transaction) -> DomainResult<BillingDataStop>;
}
