//! Application services
//!
//! [`TransactionService`] drives live lifecycle events through the
//! consumption pipeline; [`RebuildService`] replays stopped transactions from
//! their stored samples. Both share one [`Pipeline`] and one lock registry.

mod extra_inactivity;
mod meter_values;
mod rebuild;
mod transaction;

use std::sync::Arc;

use tokio::sync::OwnedMutexGuard;

use crate::application::consumption::{
    fold, ConsumptionBuilder, InactivityPolicy, LimitationEnricher, StationContext,
};
use crate::application::pricing::PricingOrchestrator;
use crate::application::roaming::RoamingRelay;
use crate::application::session::SharedStationLocks;
use crate::config::EngineConfig;
use crate::domain::ports::IntegrationProvider;
use crate::domain::consumption::Consumption;
use crate::domain::transaction::{Transaction, TransactionAction};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

pub use extra_inactivity::build_extra_inactivity;
pub use meter_values::{capture_signed_data, stop_meter_values};
pub use rebuild::RebuildService;
pub use transaction::{StopTransactionRequest, TransactionService};

/// Stages shared by the lifecycle services
#[derive(Clone)]
pub struct Pipeline {
    repos: Arc<dyn RepositoryProvider>,
    builder: Arc<ConsumptionBuilder>,
    pricing: Arc<PricingOrchestrator>,
    roaming: Arc<RoamingRelay>,
    policy: InactivityPolicy,
    locks: SharedStationLocks,
}

impl Pipeline {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        integrations: Arc<dyn IntegrationProvider>,
        config: &EngineConfig,
        locks: SharedStationLocks,
    ) -> Self {
        let enricher = Arc::new(LimitationEnricher::new(
            repos.clone(),
            integrations.clone(),
            config,
        ));
        Self {
            builder: Arc::new(ConsumptionBuilder::new(enricher)),
            pricing: Arc::new(PricingOrchestrator::new(integrations.clone())),
            roaming: Arc::new(RoamingRelay::new(repos.clone(), integrations, config)),
            policy: InactivityPolicy::new(&config.inactivity),
            repos,
            locks,
        }
    }

    pub fn locks(&self) -> &SharedStationLocks {
        &self.locks
    }

    async fn find_transaction(&self, transaction_id: i32) -> DomainResult<Transaction> {
        self.repos
            .transactions()
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Transaction", "id", transaction_id))
    }

    /// Lock the transaction's station, then read the transaction again so
    /// the copy reflects every fold that finished before the lock was taken.
    async fn load_locked(
        &self,
        transaction_id: i32,
    ) -> DomainResult<(OwnedMutexGuard<()>, Transaction)> {
        let unlocked = self.find_transaction(transaction_id).await?;
        let guard = self.locks.acquire(&unlocked.charge_point_id).await;
        let transaction = self.find_transaction(transaction_id).await?;
        Ok((guard, transaction))
    }

    /// Fold one built consumption, then price and bill it if it carries energy.
    async fn settle(
        &self,
        ctx: &StationContext,
        transaction: &mut Transaction,
        consumption: &mut Consumption,
    ) -> DomainResult<()> {
        fold(&self.policy, &ctx.station, transaction, consumption);
        if consumption.to_price {
            self.pricing
                .price_transaction(&ctx.tenant, transaction, consumption, TransactionAction::Update)
                .await?;
            self.pricing
                .bill_transaction(&ctx.tenant, transaction, TransactionAction::Update)
                .await;
        }
        Ok(())
    }
}
