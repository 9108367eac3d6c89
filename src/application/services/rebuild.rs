//! Consumption rebuild
//!
//! Replays the stored samples of a stopped transaction through the pipeline,
//! replaces its consumption history and refreshes the stop record. Driven
//! from the same samples and stop snapshot, two rebuilds produce the same
//! records.

use std::time::Instant;

use chrono::Duration;
use rust_decimal::Decimal;
use tracing::info;

use super::extra_inactivity::build_extra_inactivity;
use super::meter_values::stop_meter_values;
use super::Pipeline;
use crate::application::consumption::StationContext;
use crate::domain::charging_station::ChargingStation;
use crate::domain::consumption::Consumption;
use crate::domain::ports::PricingSource;
use crate::domain::transaction::{Transaction, TransactionStop};
use crate::domain::{DomainError, DomainResult};
use crate::shared::decimal::{kilo, round_to, safe_div, simple_price, trunc_to};

pub struct RebuildService {
    pipeline: Pipeline,
}

impl RebuildService {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Rebuild every consumption of a stopped transaction from its raw samples.
    ///
    /// Returns the number of consumptions stored.
    pub async fn rebuild_consumptions(
        &self,
        tenant_id: &str,
        transaction_id: i32,
    ) -> DomainResult<usize> {
        let started = Instant::now();
        let p = &self.pipeline;
        let (_guard, mut transaction) = p.load_locked(transaction_id).await?;
        let stop = stopped(&transaction)?.clone();

        let simple_rate = match transaction.pricing_source {
            Some(PricingSource::Simple) => derive_simple_rate(&stop),
            _ => None,
        };
        // A computed extra inactivity already moved the stop past the meter stop
        let meter_stop_at = if stop.extra_inactivity_computed {
            stop.timestamp - Duration::seconds(stop.extra_inactivity_secs)
        } else {
            stop.timestamp
        };

        let mut ctx = StationContext::load(p.repos.as_ref(), tenant_id, &transaction).await?;
        let samples = p.repos.meter_values().get_meter_values(transaction_id).await?;

        transaction.reset_running_totals();
        let built = p.builder.build(&mut ctx, &mut transaction, &samples).await?;
        let mut consumptions: Vec<Consumption> = Vec::with_capacity(built.len() + 2);
        for mut consumption in built {
            self.settle_replayed(&ctx, &mut transaction, &mut consumption, consumptions.last(), simple_rate)
                .await?;
            consumptions.push(consumption);
        }

        let stop_samples = stop_meter_values(&transaction, stop.meter_stop, meter_stop_at, &[]);
        let stop_built = p.builder.build(&mut ctx, &mut transaction, &stop_samples).await?;
        if let Some(mut last) = stop_built.into_iter().find(|c| c.interval_millis() > 0) {
            self.settle_replayed(&ctx, &mut transaction, &mut last, consumptions.last(), simple_rate)
                .await?;
            consumptions.push(last);
        }

        if transaction.refund_id.is_none() {
            let status = p.policy.level_for(&ctx.station, &transaction);
            transaction.rounded_price = transaction.price.map(|price| trunc_to(price, 2));
            if let Some(stop) = transaction.stop.as_mut() {
                stop.price = transaction.current_cumulated_price;
                stop.rounded_price = transaction.current_cumulated_price.map(|price| trunc_to(price, 2));
                stop.state_of_charge = transaction.current_state_of_charge;
                stop.total_consumption_wh = transaction.current_total_consumption_wh;
                stop.total_inactivity_secs = transaction.current_total_inactivity_secs;
                stop.total_duration_secs = transaction.current_total_duration_secs;
                stop.inactivity_status = status;
            }
        }

        if let Some(last) = consumptions.last() {
            let current_type = ctx.station.current_type(transaction.connector_id);
            if let Some(extra) =
                build_extra_inactivity(&p.policy, current_type, &mut transaction, last, meter_stop_at)
            {
                consumptions.push(extra);
            }
        }

        let count = consumptions.len();
        p.repos.consumptions().delete_consumptions(transaction_id).await?;
        p.repos.consumptions().save_consumptions(consumptions).await?;
        p.repos.transactions().save(transaction.clone()).await?;

        metrics::counter!("consumptions_rebuilt_total").increment(count as u64);
        metrics::histogram!("consumption_rebuild_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        info!(
            tenant_id,
            transaction_id,
            samples = samples.len(),
            consumptions = count,
            total_consumption_wh = %transaction.current_total_consumption_wh,
            "Consumptions rebuilt"
        );
        Ok(count)
    }

    /// Re-price the stored consumptions of a transaction charged with simple pricing.
    ///
    /// `price_per_kwh` overrides the rate derived from the stop record when
    /// positive. Returns the number of consumptions re-priced.
    pub async fn reprice_with_simple_pricing(
        &self,
        tenant_id: &str,
        transaction_id: i32,
        price_per_kwh: Option<Decimal>,
    ) -> DomainResult<usize> {
        let p = &self.pipeline;
        p.repos
            .tenants()
            .get_tenant(tenant_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Tenant", "id", tenant_id))?;
        let (_guard, mut transaction) = p.load_locked(transaction_id).await?;
        let stop = stopped(&transaction)?;
        if stop.pricing_source != Some(PricingSource::Simple) {
            return Err(DomainError::Validation(format!(
                "Transaction {transaction_id} was not priced with simple pricing"
            )));
        }
        let rate = match price_per_kwh.filter(|rate| *rate > Decimal::ZERO) {
            Some(rate) => rate,
            None => derive_simple_rate(stop).ok_or_else(|| {
                DomainError::Pricing(format!(
                    "Transaction {transaction_id}: unable to derive a price per kWh"
                ))
            })?,
        };

        let mut consumptions = p
            .repos
            .consumptions()
            .get_transaction_consumptions(transaction_id)
            .await?;
        let mut cumulated = Decimal::ZERO;
        for consumption in consumptions.iter_mut() {
            apply_simple_price(consumption, rate);
            cumulated += consumption.amount.unwrap_or(Decimal::ZERO);
            consumption.cumulated_amount = Some(cumulated);
        }
        let count = consumptions.len();
        p.repos.consumptions().delete_consumptions(transaction_id).await?;
        p.repos.consumptions().save_consumptions(consumptions).await?;

        transaction.current_cumulated_price = Some(cumulated);
        transaction.rounded_price = transaction.price.map(|price| trunc_to(price, 2));
        if let Some(stop) = transaction.stop.as_mut() {
            stop.price = Some(cumulated);
            stop.rounded_price = Some(trunc_to(cumulated, 2));
        }
        p.repos.transactions().save(transaction).await?;

        info!(
            tenant_id,
            transaction_id,
            price_per_kwh = %rate,
            price = %cumulated,
            consumptions = count,
            "Transaction re-priced"
        );
        Ok(count)
    }

    async fn settle_replayed(
        &self,
        ctx: &StationContext,
        transaction: &mut Transaction,
        consumption: &mut Consumption,
        previous: Option<&Consumption>,
        simple_rate: Option<Decimal>,
    ) -> DomainResult<()> {
        self.pipeline.settle(ctx, transaction, consumption).await?;
        if let Some(rate) = simple_rate {
            apply_simple_price(consumption, rate);
        }
        chain(&ctx.station, transaction.connector_id, consumption, previous);
        if simple_rate.is_some() {
            transaction.current_cumulated_price = consumption.cumulated_amount;
        }
        Ok(())
    }
}

fn stopped(transaction: &Transaction) -> DomainResult<&TransactionStop> {
    transaction.stop.as_ref().ok_or_else(|| {
        DomainError::Validation(format!("Transaction {} is in progress", transaction.id))
    })
}

/// Flat rate per kWh implied by the stop record, rounded to cents.
fn derive_simple_rate(stop: &TransactionStop) -> Option<Decimal> {
    let price = stop.price?;
    if stop.total_consumption_wh <= Decimal::ZERO {
        return None;
    }
    safe_div(price, stop.total_consumption_wh / kilo())
        .map(|rate| round_to(rate, 2))
        .filter(|rate| *rate > Decimal::ZERO)
}

fn apply_simple_price(consumption: &mut Consumption, rate: Decimal) {
    let amount = simple_price(rate, consumption.consumption_wh.unwrap_or(Decimal::ZERO));
    consumption.amount = Some(amount);
    consumption.rounded_amount = Some(trunc_to(amount, 2));
    consumption.pricing_source = Some(PricingSource::Simple);
}

/// Recompute the cumulated figures of `consumption` from the interval before it.
fn chain(
    station: &ChargingStation,
    connector_id: u32,
    consumption: &mut Consumption,
    previous: Option<&Consumption>,
) {
    let interval_secs = consumption.interval_secs();
    let wh = consumption.consumption_wh.unwrap_or(Decimal::ZERO);
    let idle = wh.is_zero();

    let cumulated_wh = match previous {
        Some(prev) => prev.cumulated_consumption_wh.unwrap_or(Decimal::ZERO) + wh,
        None => wh,
    };
    consumption.cumulated_consumption_wh = Some(cumulated_wh);
    consumption.cumulated_consumption_amps = Some(station.watts_to_amps(connector_id, cumulated_wh));

    match previous {
        None => {
            if idle {
                consumption.total_inactivity_secs = Some(interval_secs);
            }
            consumption.total_duration_secs = Some(interval_secs);
        }
        Some(prev) => {
            consumption.cumulated_amount = match (prev.cumulated_amount, consumption.amount) {
                (None, None) => None,
                (before, amount) => Some(
                    before.unwrap_or(Decimal::ZERO) + amount.unwrap_or(Decimal::ZERO),
                ),
            };
            let inactivity = prev.total_inactivity_secs.unwrap_or(0);
            consumption.total_inactivity_secs = Some(if idle {
                inactivity + interval_secs
            } else {
                inactivity
            });
            consumption.total_duration_secs =
                Some(prev.total_duration_secs.unwrap_or(0) + interval_secs);
        }
    }
    if previous.is_none() {
        consumption.cumulated_amount = consumption.amount;
    }
}

// ── Tests ──────────────────────────────────────────────────────
