//! Live transaction lifecycle
//!
//! Each call runs under the lock of the transaction's charging station and
//! persists only after every hard-failing stage (pricing, roaming) succeeded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::extra_inactivity::build_extra_inactivity;
use super::meter_values::{capture_signed_data, stop_meter_values};
use super::Pipeline;
use crate::application::consumption::{fold, StationContext};
use crate::domain::consumption::Consumption;
use crate::domain::meter_value::NormalizedMeterValue;
use crate::domain::transaction::{Transaction, TransactionAction, TransactionStop};
use crate::domain::{DomainError, DomainResult};

/// Stop event as received from the charging station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopTransactionRequest {
    pub transaction_id: i32,
    /// Energy register at stop (Wh)
    pub meter_stop: Decimal,
    pub timestamp: DateTime<Utc>,
    /// Tag presented to stop the session, when different from the start tag
    pub tag_id: Option<String>,
    /// User resolved from `tag_id`
    pub user_id: Option<String>,
    /// Samples sent with the stop event
    #[serde(default)]
    pub transaction_data: Vec<NormalizedMeterValue>,
}

impl StopTransactionRequest {
    pub fn new(transaction_id: i32, meter_stop: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            transaction_id,
            meter_stop,
            timestamp,
            tag_id: None,
            user_id: None,
            transaction_data: Vec::new(),
        }
    }
}

pub struct TransactionService {
    pipeline: Pipeline,
}

impl TransactionService {
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    /// Register a new open transaction.
    pub async fn start_transaction(
        &self,
        tenant_id: &str,
        mut transaction: Transaction,
    ) -> DomainResult<Transaction> {
        let p = &self.pipeline;
        let _guard = p.locks.acquire(&transaction.charge_point_id).await;

        if p.repos.transactions().find_by_id(transaction.id).await?.is_some() {
            return Err(DomainError::Validation(format!(
                "Transaction {} already exists",
                transaction.id
            )));
        }
        if transaction.stop.is_some() {
            return Err(DomainError::Validation(format!(
                "Transaction {} cannot start already stopped",
                transaction.id
            )));
        }

        let ctx = StationContext::load(p.repos.as_ref(), tenant_id, &transaction).await?;
        if transaction.site_id.is_none() {
            transaction.site_id = ctx.station.site_id.clone();
        }
        if transaction.site_area_id.is_none() {
            transaction.site_area_id = ctx.station.site_area_id.clone();
        }
        if transaction.user_id.is_none() {
            transaction.user_id = p
                .repos
                .tags()
                .get_tag(&transaction.tag_id)
                .await?
                .and_then(|tag| tag.user_id);
        }
        transaction.current_timestamp = Some(transaction.timestamp);
        transaction.current_state_of_charge = transaction.state_of_charge;

        let mut consumption = Consumption::new(
            transaction.id,
            transaction.charge_point_id.clone(),
            transaction.connector_id,
            transaction.timestamp,
        );
        consumption.started_at = Some(transaction.timestamp);
        consumption.site_id = transaction.site_id.clone();
        consumption.site_area_id = transaction.site_area_id.clone();
        consumption.user_id = transaction.user_id.clone();
        consumption.state_of_charge = transaction.state_of_charge;
        consumption.consumption_wh = Some(Decimal::ZERO);
        consumption.cumulated_consumption_wh = Some(Decimal::ZERO);

        p.pricing
            .price_transaction(&ctx.tenant, &mut transaction, &mut consumption, TransactionAction::Start)
            .await?;
        p.pricing
            .bill_transaction(&ctx.tenant, &mut transaction, TransactionAction::Start)
            .await;
        p.roaming
            .relay(&ctx, &mut transaction, TransactionAction::Start)
            .await?;

        p.repos.transactions().save(transaction.clone()).await?;
        info!(
            tenant_id,
            transaction_id = transaction.id,
            charge_point_id = transaction.charge_point_id.as_str(),
            connector_id = transaction.connector_id,
            meter_start = %transaction.meter_start,
            "Transaction started"
        );
        Ok(transaction)
    }

    /// Fold a batch of samples into an open transaction.
    ///
    /// Returns the consumptions built from the batch.
    pub async fn process_meter_values(
        &self,
        tenant_id: &str,
        transaction_id: i32,
        mut samples: Vec<NormalizedMeterValue>,
    ) -> DomainResult<Vec<Consumption>> {
        let p = &self.pipeline;
        let (_guard, mut transaction) = p.load_locked(transaction_id).await?;
        if !transaction.is_open() {
            return Err(DomainError::Validation(format!(
                "Transaction {transaction_id} is already stopped"
            )));
        }
        if let Some(foreign) = samples.iter().find(|s| s.transaction_id != transaction_id) {
            return Err(DomainError::Validation(format!(
                "Meter value of transaction {} sent to transaction {transaction_id}",
                foreign.transaction_id
            )));
        }
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        samples.sort_by_key(|s| s.timestamp);
        for sample in &samples {
            capture_signed_data(&mut transaction, sample);
        }

        let mut ctx = StationContext::load(p.repos.as_ref(), tenant_id, &transaction).await?;
        let mut consumptions = p.builder.build(&mut ctx, &mut transaction, &samples).await?;
        for consumption in consumptions.iter_mut() {
            p.settle(&ctx, &mut transaction, consumption).await?;
        }
        if !consumptions.is_empty() {
            p.roaming
                .relay(&ctx, &mut transaction, TransactionAction::Update)
                .await?;
        }

        let sample_count = samples.len();
        p.repos.meter_values().save_meter_values(samples).await?;
        p.repos
            .consumptions()
            .save_consumptions(consumptions.clone())
            .await?;
        p.repos.transactions().save(transaction.clone()).await?;

        debug!(
            tenant_id,
            transaction_id,
            samples = sample_count,
            consumptions = consumptions.len(),
            total_consumption_wh = %transaction.current_total_consumption_wh,
            "Meter values processed"
        );
        Ok(consumptions)
    }

    /// Close a transaction with its final register reading.
    pub async fn stop_transaction(
        &self,
        tenant_id: &str,
        request: StopTransactionRequest,
    ) -> DomainResult<Transaction> {
        let p = &self.pipeline;
        let transaction_id = request.transaction_id;
        let (_guard, mut transaction) = p.load_locked(transaction_id).await?;
        if !transaction.is_open() {
            return Err(DomainError::Validation(format!(
                "Transaction {transaction_id} is already stopped"
            )));
        }
        if request.timestamp < transaction.timestamp {
            return Err(DomainError::Validation(format!(
                "Transaction {transaction_id} cannot stop before it started"
            )));
        }

        for sample in &request.transaction_data {
            capture_signed_data(&mut transaction, sample);
        }

        let mut ctx = StationContext::load(p.repos.as_ref(), tenant_id, &transaction).await?;
        let samples = stop_meter_values(
            &transaction,
            request.meter_stop,
            request.timestamp,
            &request.transaction_data,
        );
        let mut consumptions = p.builder.build(&mut ctx, &mut transaction, &samples).await?;
        for consumption in &consumptions {
            fold(&p.policy, &ctx.station, &mut transaction, consumption);
        }

        let mut stop = TransactionStop::new(request.timestamp, request.meter_stop);
        stop.user_id = request.user_id.or_else(|| transaction.user_id.clone());
        stop.tag_id = Some(request.tag_id.unwrap_or_else(|| transaction.tag_id.clone()));
        stop.state_of_charge = transaction.current_state_of_charge;
        stop.signed_data = transaction.current_signed_data.clone();
        stop.total_consumption_wh = transaction.current_total_consumption_wh;
        stop.total_inactivity_secs = transaction.current_total_inactivity_secs;
        stop.total_duration_secs = transaction.current_total_duration_secs;
        stop.inactivity_status = p.policy.level_for(&ctx.station, &transaction);
        transaction.stop = Some(stop);

        match consumptions.last_mut() {
            Some(last) => {
                p.pricing
                    .price_transaction(&ctx.tenant, &mut transaction, last, TransactionAction::Stop)
                    .await?
            }
            None => {
                let mut empty = Consumption::new(
                    transaction.id,
                    transaction.charge_point_id.clone(),
                    transaction.connector_id,
                    request.timestamp,
                );
                empty.started_at = transaction.current_timestamp;
                p.pricing
                    .price_transaction(&ctx.tenant, &mut transaction, &mut empty, TransactionAction::Stop)
                    .await?
            }
        }
        p.pricing
            .bill_transaction(&ctx.tenant, &mut transaction, TransactionAction::Stop)
            .await;
        p.roaming
            .relay(&ctx, &mut transaction, TransactionAction::Stop)
            .await?;

        consumptions.retain(|c| c.interval_millis() > 0);
        p.repos.consumptions().save_consumptions(consumptions).await?;
        p.repos.transactions().save(transaction.clone()).await?;

        info!(
            tenant_id,
            transaction_id,
            charge_point_id = transaction.charge_point_id.as_str(),
            meter_stop = %request.meter_stop,
            total_consumption_wh = %transaction.current_total_consumption_wh,
            total_inactivity_secs = transaction.current_total_inactivity_secs,
            "Transaction stopped"
        );
        Ok(transaction)
    }

    /// Settle a stopped transaction once its connector is free again.
    ///
    /// Idle time between the stop and `connector_freed_at` is recorded once
    /// as extra inactivity; the roaming CDR is sent on every call.
    pub async fn end_transaction(
        &self,
        tenant_id: &str,
        transaction_id: i32,
        connector_freed_at: Option<DateTime<Utc>>,
    ) -> DomainResult<Transaction> {
        let p = &self.pipeline;
        let (_guard, mut transaction) = p.load_locked(transaction_id).await?;
        let Some(stop) = transaction.stop.as_ref() else {
            return Err(DomainError::Validation(format!(
                "Transaction {transaction_id} is in progress"
            )));
        };
        let (stopped_at, already_computed) = (stop.timestamp, stop.extra_inactivity_computed);

        let ctx = StationContext::load(p.repos.as_ref(), tenant_id, &transaction).await?;
        let mut extra = None;
        if let Some(freed_at) = connector_freed_at.filter(|t| *t > stopped_at) {
            if !already_computed {
                if let Some(stop) = transaction.stop.as_mut() {
                    stop.extra_inactivity_secs = (freed_at - stopped_at).num_seconds();
                }
                if let Some(last) = p
                    .repos
                    .consumptions()
                    .get_last_consumption(transaction_id)
                    .await?
                {
                    let current_type = ctx.station.current_type(transaction.connector_id);
                    extra = build_extra_inactivity(
                        &p.policy,
                        current_type,
                        &mut transaction,
                        &last,
                        stopped_at,
                    );
                }
            }
        }

        p.roaming
            .relay(&ctx, &mut transaction, TransactionAction::End)
            .await?;

        if let Some(extra) = extra {
            p.repos.consumptions().save_consumptions(vec![extra]).await?;
        }
        p.repos.transactions().save(transaction.clone()).await?;
        info!(
            tenant_id,
            transaction_id,
            extra_inactivity_secs = transaction.stop.as_ref().map_or(0, |s| s.extra_inactivity_secs),
            "Transaction ended"
        );
        Ok(transaction)
    }
}
