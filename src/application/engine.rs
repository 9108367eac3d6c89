//! Engine facade
//!
//! Wires the pipeline stages once and hands out the lifecycle services. The
//! protocol layer keeps one engine per process and clones its handles freely.

use std::sync::Arc;

use super::services::{Pipeline, RebuildService, TransactionService};
use super::session::{SharedStationLocks, StationLocks};
use crate::config::EngineConfig;
use crate::domain::ports::IntegrationProvider;
use crate::domain::RepositoryProvider;

#[derive(Clone)]
pub struct ConsumptionEngine {
    transactions: Arc<TransactionService>,
    rebuild: Arc<RebuildService>,
    locks: SharedStationLocks,
}

impl ConsumptionEngine {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        integrations: Arc<dyn IntegrationProvider>,
        config: &EngineConfig,
    ) -> Self {
        let locks = StationLocks::shared();
        let pipeline = Pipeline::new(repos, integrations, config, locks.clone());
        Self {
            transactions: Arc::new(TransactionService::new(pipeline.clone())),
            rebuild: Arc::new(RebuildService::new(pipeline)),
            locks,
        }
    }

    pub fn transactions(&self) -> &TransactionService {
        &self.transactions
    }

    pub fn rebuild(&self) -> &RebuildService {
        &self.rebuild
    }

    /// Station lock registry shared by every service of this engine
    pub fn locks(&self) -> &SharedStationLocks {
        &self.locks
    }
}
