//! Consumption builder
//!
//! Turns a batch of samples into consumption intervals. An energy register
//! sample closes the interval opened by the transaction's rolling reference
//! (`last_consumption`, seeded from the start register); instantaneous
//! samples sharing its timestamp are merged into the same interval.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::classifier::{classify, Quantity};
use super::context::StationContext;
use super::limitation::LimitationEnricher;
use super::reconciler::reconcile;
use crate::domain::consumption::Consumption;
use crate::domain::meter_value::NormalizedMeterValue;
use crate::domain::transaction::{LastConsumption, Transaction};
use crate::domain::{DomainError, DomainResult};

pub struct ConsumptionBuilder {
    enricher: Arc<LimitationEnricher>,
}

impl ConsumptionBuilder {
    pub fn new(enricher: Arc<LimitationEnricher>) -> Self {
        Self { enricher }
    }

    /// Build, enrich and reconcile the consumptions of `samples`.
    ///
    /// Advances `transaction.last_consumption`, the cumulated energy and the
    /// cumulated inactivity as energy samples are consumed. Samples must be in
    /// non-decreasing timestamp order.
    pub async fn build(
        &self,
        ctx: &mut StationContext,
        transaction: &mut Transaction,
        samples: &[NormalizedMeterValue],
    ) -> DomainResult<Vec<Consumption>> {
        let current_type = ctx.station.current_type(transaction.connector_id);
        let mut consumptions: Vec<Consumption> = Vec::new();

        for sample in samples {
            let Some(classified) = classify(sample, current_type) else {
                trace!(
                    transaction_id = transaction.id,
                    value = sample.value.as_str(),
                    "Sample ignored"
                );
                continue;
            };

            let mut consumption = self.new_consumption(transaction, sample);
            match classified.quantity {
                Quantity::StateOfCharge => consumption.state_of_charge = Some(classified.value),
                Quantity::Power(slot) => consumption.instant_watts.set(slot, classified.value),
                Quantity::Current(slot) => consumption.instant_amps.set(slot, classified.value),
                Quantity::Voltage(slot) => consumption.instant_volts.set(slot, classified.value),
                Quantity::Energy => {
                    self.close_interval(ctx, transaction, &mut consumption, classified.value)
                        .await?;
                }
            }

            match consumptions
                .iter_mut()
                .find(|c| c.ended_at == consumption.ended_at)
            {
                Some(existing) => existing.merge_from(&consumption),
                None => consumptions.push(consumption),
            }
        }

        for consumption in consumptions.iter_mut() {
            reconcile(&ctx.station, transaction.connector_id, consumption);
        }

        if !consumptions.is_empty() {
            metrics::counter!("consumptions_built_total").increment(consumptions.len() as u64);
            debug!(
                transaction_id = transaction.id,
                count = consumptions.len(),
                total_consumption_wh = %transaction.current_total_consumption_wh,
                "Consumptions built"
            );
        }
        Ok(consumptions)
    }

    fn new_consumption(&self, transaction: &Transaction, sample: &NormalizedMeterValue) -> Consumption {
        let mut consumption = Consumption::new(
            transaction.id,
            transaction.charge_point_id.clone(),
            transaction.connector_id,
            sample.timestamp,
        );
        consumption.site_id = transaction.site_id.clone();
        consumption.site_area_id = transaction.site_area_id.clone();
        consumption.user_id = transaction.user_id.clone();
        consumption
    }

    async fn close_interval(
        &self,
        ctx: &mut StationContext,
        transaction: &mut Transaction,
        consumption: &mut Consumption,
        register_wh: Decimal,
    ) -> DomainResult<()> {
        let connector_id = transaction.connector_id;
        let reference = transaction.last_consumption.unwrap_or(LastConsumption {
            value: transaction.meter_start,
            timestamp: transaction.timestamp,
        });
        consumption.started_at = Some(reference.timestamp);
        let elapsed_secs = (consumption.ended_at - reference.timestamp).num_seconds();

        self.enricher.enrich(ctx, connector_id, consumption).await?;

        let advanced = LastConsumption {
            value: register_wh,
            timestamp: consumption.ended_at,
        };
        if register_wh > reference.value {
            let total = register_wh
                .checked_sub(reference.value)
                .and_then(|delta| {
                    transaction
                        .current_total_consumption_wh
                        .checked_add(delta)
                        .map(|total| (delta, total))
                });
            let Some((delta, total)) = total else {
                return Err(DomainError::Validation(format!(
                    "Energy register {register_wh} Wh overflows the total of transaction {}",
                    transaction.id
                )));
            };
            consumption.consumption_wh = Some(delta);
            consumption.consumption_amps = Some(ctx.station.watts_to_amps(connector_id, delta));
            transaction.current_total_consumption_wh = total;
            transaction.last_consumption = Some(advanced);
        } else {
            // A flat register still moves the clock; a lower one is ignored
            if register_wh == reference.value {
                transaction.last_consumption = Some(advanced);
            }
            consumption.consumption_wh = Some(Decimal::ZERO);
            consumption.consumption_amps = Some(Decimal::ZERO);
            if self
                .enricher
                .accrues_inactivity(&ctx.station, connector_id, consumption)
            {
                transaction.current_total_inactivity_secs += elapsed_secs.max(0);
            }
        }
        consumption.total_inactivity_secs = Some(transaction.current_total_inactivity_secs);

        consumption.cumulated_consumption_wh = Some(transaction.current_total_consumption_wh);
        consumption.cumulated_consumption_amps = Some(
            ctx.station
                .watts_to_amps(connector_id, transaction.current_total_consumption_wh),
        );
        let until = transaction
            .stop
            .as_ref()
            .map_or(consumption.ended_at, |stop| stop.timestamp);
        consumption.total_duration_secs = Some((until - transaction.timestamp).num_seconds());
        consumption.to_price = true;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────
