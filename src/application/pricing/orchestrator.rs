//! Pricing & billing orchestrator
//!
//! Pricing failures abort the lifecycle action: the price is what the driver
//! sees. Billing failures are logged and swallowed: billing is a side channel
//! and keeps its last known good state.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use crate::domain::consumption::Consumption;
use crate::domain::ports::{IntegrationProvider, PricedConsumption};
use crate::domain::tenant::Tenant;
use crate::domain::transaction::{BillingData, Transaction, TransactionAction, TransactionStop};
use crate::domain::DomainResult;
use crate::shared::decimal::trunc_to;

pub struct PricingOrchestrator {
    integrations: Arc<dyn IntegrationProvider>,
}

impl PricingOrchestrator {
    pub fn new(integrations: Arc<dyn IntegrationProvider>) -> Self {
        Self { integrations }
    }

    /// Price `consumption` for `action` and merge the result back.
    pub async fn price_transaction(
        &self,
        tenant: &Tenant,
        transaction: &mut Transaction,
        consumption: &mut Consumption,
        action: TransactionAction,
    ) -> DomainResult<()> {
        let Some(pricing) = self.integrations.pricing(tenant) else {
            return Ok(());
        };

        let priced = match action {
            TransactionAction::Start => pricing.start_session(transaction, consumption).await?,
            TransactionAction::Update => pricing.update_session(transaction, consumption).await?,
            TransactionAction::Stop => pricing.stop_session(transaction, consumption).await?,
            TransactionAction::End => return Ok(()),
        };
        let Some(priced) = priced else {
            return Ok(());
        };

        match action {
            TransactionAction::Start => {
                transaction.price = Some(priced.amount);
                transaction.rounded_price = Some(priced.rounded_amount);
                transaction.price_unit = Some(priced.currency_code.clone());
                transaction.pricing_source = Some(priced.pricing_source);
                transaction.current_cumulated_price = Some(priced.amount);
            }
            TransactionAction::Update => apply_to_consumption(transaction, consumption, &priced),
            TransactionAction::Stop => {
                apply_to_consumption(transaction, consumption, &priced);
                let (stopped_at, meter) = (consumption.ended_at, transaction.meter_start);
                let stop = transaction
                    .stop
                    .get_or_insert_with(|| TransactionStop::new(stopped_at, meter));
                stop.price = Some(priced.cumulated_amount);
                stop.rounded_price = Some(trunc_to(priced.cumulated_amount, 2));
                stop.price_unit = Some(priced.currency_code.clone());
                stop.pricing_source = Some(priced.pricing_source);
            }
            TransactionAction::End => {}
        }

        debug!(
            transaction_id = transaction.id,
            %action,
            amount = %priced.amount,
            cumulated_amount = %priced.cumulated_amount,
            currency = priced.currency_code.as_str(),
            "Transaction priced"
        );
        Ok(())
    }

    /// Forward `action` to the billing system. Never fails.
    pub async fn bill_transaction(
        &self,
        tenant: &Tenant,
        transaction: &mut Transaction,
        action: TransactionAction,
    ) {
        let Some(billing) = self.integrations.billing(tenant) else {
            return;
        };

        let result = match action {
            TransactionAction::Start => billing.start_transaction(transaction).await.map(|start| {
                transaction.billing_data = Some(BillingData {
                    with_billing_active: start.with_billing_active,
                    last_update: Some(Utc::now()),
                    stop: None,
                });
            }),
            TransactionAction::Update => billing.update_transaction(transaction).await.map(|()| {
                transaction
                    .billing_data
                    .get_or_insert_with(BillingData::default)
                    .last_update = Some(Utc::now());
            }),
            TransactionAction::Stop => billing.stop_transaction(transaction).await.map(|stop| {
                let data = transaction.billing_data.get_or_insert_with(BillingData::default);
                data.stop = Some(stop);
                data.last_update = Some(Utc::now());
            }),
            TransactionAction::End => Ok(()),
        };

        if let Err(e) = result {
            metrics::counter!("billing_failures_total", "action" => action.as_str()).increment(1);
            error!(
                tenant_id = tenant.id.as_str(),
                transaction_id = transaction.id,
                user_id = transaction.user_id.as_deref().unwrap_or(""),
                %action,
                error = %e,
                "Failed to bill the transaction"
            );
        }
    }
}

fn apply_to_consumption(
    transaction: &mut Transaction,
    consumption: &mut Consumption,
    priced: &PricedConsumption,
) {
    consumption.amount = Some(priced.amount);
    consumption.rounded_amount = Some(priced.rounded_amount);
    consumption.currency_code = Some(priced.currency_code.clone());
    consumption.pricing_source = Some(priced.pricing_source);
    consumption.cumulated_amount = Some(priced.cumulated_amount);
    transaction.current_cumulated_price = Some(priced.cumulated_amount);
}
