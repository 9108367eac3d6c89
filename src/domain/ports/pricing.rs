//! Pricing engine port

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::consumption::Consumption;
use crate::domain::transaction::Transaction;
use crate::domain::DomainResult;

/// Which tariff engine produced a price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingSource {
    /// Flat per-kWh tariff
    Simple,
    ConvergentCharging,
    /// Tariff owned by a roaming partner
    Roaming,
}

/// Price of one consumption interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedConsumption {
    pub amount: Decimal,
    pub rounded_amount: Decimal,
    pub currency_code: String,
    pub pricing_source: PricingSource,
    /// Price of the whole session so far, including this interval
    pub cumulated_amount: Decimal,
}

/// Tariff engine of a tenant.
///
/// `None` means the engine has nothing to say for this call; the
/// transaction keeps its current price.
#[async_trait]
pub trait PricingProvider: Send + Sync {
    async fn start_session(
        &self,
        transaction: &Transaction,
        consumption: &Consumption,
    ) -> DomainResult<Option<PricedConsumption>>;

    async fn update_session(
        &self,
        transaction: &Transaction,
        consumption: &Consumption,
    ) -> DomainResult<Option<PricedConsumption>>;

    async fn stop_session(
        &self,
        transaction: &Transaction,
        consumption: &Consumption,
    ) -> DomainResult<Option<PricedConsumption>>;
}
