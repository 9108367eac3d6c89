//! Shared fixtures for the end-to-end tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use texnouz_consumption::config::EngineConfig;
use texnouz_consumption::domain::charging_station::ChargingStationRepository;
use texnouz_consumption::domain::ports::{
    BillingDataTransactionStart, BillingProvider, OcpiCpoClient, OicpCpoClient, PricedConsumption,
    PricingProvider, PricingSource,
};
use texnouz_consumption::domain::tenant::TenantRepository;
use texnouz_consumption::domain::{
    BillingDataStop, ChargingStation, Connector, Consumption, CurrentType, DomainError,
    DomainResult, MeterValueAttribute, NormalizedMeterValue, OcpiToken, Phase, Tenant,
    TenantComponent, Transaction,
};
use texnouz_consumption::shared::decimal::{simple_price, trunc_to};
use texnouz_consumption::{ConsumptionEngine, InMemoryStorage, StaticIntegrations};

pub const TENANT: &str = "t1";
pub const STATION: &str = "CP001";

// ── Collaborators ───────────────────────────────────────────────

/// Flat per-kWh tariff
pub struct FlatPricing {
    pub price_per_kwh: Decimal,
    pub source: PricingSource,
    pub fail: AtomicBool,
}

impl FlatPricing {
    pub fn new(price_per_kwh: Decimal) -> Self {
        Self {
            price_per_kwh,
            source: PricingSource::Simple,
            fail: AtomicBool::new(false),
        }
    }

    fn price(&self, transaction: &Transaction, consumption: &Consumption) -> DomainResult<Option<PricedConsumption>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DomainError::Pricing("tariff engine unavailable".into()));
        }
        let amount = simple_price(
            self.price_per_kwh,
            consumption.consumption_wh.unwrap_or(Decimal::ZERO),
        );
        let cumulated = transaction.current_cumulated_price.unwrap_or(Decimal::ZERO) + amount;
        Ok(Some(PricedConsumption {
            amount,
            rounded_amount: trunc_to(amount, 2),
            currency_code: "EUR".into(),
            pricing_source: self.source,
            cumulated_amount: cumulated,
        }))
    }
}

#[async_trait]
impl PricingProvider for FlatPricing {
    async fn start_session(
        &self,
        transaction: &Transaction,
        consumption: &Consumption,
    ) -> DomainResult<Option<PricedConsumption>> {
        self.price(transaction, consumption)
    }

    async fn update_session(
        &self,
        transaction: &Transaction,
        consumption: &Consumption,
    ) -> DomainResult<Option<PricedConsumption>> {
        self.price(transaction, consumption)
    }

    async fn stop_session(
        &self,
        transaction: &Transaction,
        consumption: &Consumption,
    ) -> DomainResult<Option<PricedConsumption>> {
        self.price(transaction, consumption)
    }
}

#[derive(Default)]
pub struct RecordingBilling {
    pub fail_updates: AtomicBool,
    pub updates: AtomicUsize,
    pub stops: AtomicUsize,
}

#[async_trait]
impl BillingProvider for RecordingBilling {
    async fn start_transaction(
        &self,
        _transaction: &Transaction,
    ) -> DomainResult<BillingDataTransactionStart> {
        Ok(BillingDataTransactionStart {
            with_billing_active: true,
        })
    }

    async fn update_transaction(&self, _transaction: &Transaction) -> DomainResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Billing("invoice backend down".into()));
        }
        Ok(())
    }

    async fn stop_transaction(&self, _transaction: &Transaction) -> DomainResult<BillingDataStop> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(BillingDataStop {
            status: "pending".into(),
            invoice_id: Some("INV-1".into()),
        })
    }
}

/// Roaming client recording every call it receives
#[derive(Default)]
pub struct RecordingRoaming {
    pub calls: Mutex<Vec<String>>,
    pub start_delay_secs: Option<u64>,
}

impl RecordingRoaming {
    pub fn with_start_delay(secs: u64) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            start_delay_secs: Some(secs),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: String) -> DomainResult<()> {
        if call.starts_with("start") {
            if let Some(secs) = self.start_delay_secs {
                tokio::time::sleep(StdDuration::from_secs(secs)).await;
            }
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl OcpiCpoClient for RecordingRoaming {
    async fn start_session(
        &self,
        _token: &OcpiToken,
        _station: &ChargingStation,
        transaction: &Transaction,
        authorization_id: &str,
    ) -> DomainResult<()> {
        self.record(format!("start {authorization_id} tx={}", transaction.id)).await
    }

    async fn update_session(&self, transaction: &Transaction) -> DomainResult<()> {
        self.record(format!("update tx={}", transaction.id)).await
    }

    async fn stop_session(&self, transaction: &Transaction) -> DomainResult<()> {
        self.record(format!("stop tx={}", transaction.id)).await
    }

    async fn post_cdr(&self, transaction: &Transaction) -> DomainResult<()> {
        self.record(format!("cdr tx={}", transaction.id)).await
    }
}

#[async_trait]
impl OicpCpoClient for RecordingRoaming {
    async fn start_session(
        &self,
        _station: &ChargingStation,
        transaction: &Transaction,
        session_id: &str,
        _identification: Option<&str>,
    ) -> DomainResult<()> {
        self.record(format!("start {session_id} tx={}", transaction.id)).await
    }

    async fn update_session(&self, transaction: &Transaction) -> DomainResult<()> {
        self.record(format!("update tx={}", transaction.id)).await
    }

    async fn stop_session(&self, transaction: &Transaction) -> DomainResult<()> {
        self.record(format!("stop tx={}", transaction.id)).await
    }

    async fn push_cdr(&self, transaction: &Transaction) -> DomainResult<()> {
        self.record(format!("cdr tx={}", transaction.id)).await
    }
}

// ── Fixtures ────────────────────────────────────────────────────

pub struct Harness {
    pub storage: Arc<InMemoryStorage>,
    pub engine: ConsumptionEngine,
}

pub fn sample_station() -> ChargingStation {
    let mut station = ChargingStation::new(STATION);
    station.voltage = Some(Decimal::from(230));
    let mut connector = Connector::new(1, CurrentType::Ac);
    connector.power = Some(Decimal::from(22_080));
    connector.amperage_limit = Some(Decimal::from(96));
    station.connectors.push(connector);
    station
}

pub async fn harness(components: &[TenantComponent], integrations: StaticIntegrations) -> Harness {
    harness_with_config(components, integrations, EngineConfig::default()).await
}

pub async fn harness_with_config(
    components: &[TenantComponent],
    integrations: StaticIntegrations,
    config: EngineConfig,
) -> Harness {
    let storage = Arc::new(InMemoryStorage::new());
    let tenant = components
        .iter()
        .fold(Tenant::new(TENANT, "Tenant"), |t, c| t.with_component(*c));
    storage.save_tenant(tenant).await.unwrap();
    storage.save_charging_station(sample_station()).await.unwrap();
    let engine = ConsumptionEngine::new(storage.clone(), Arc::new(integrations), &config);
    Harness { storage, engine }
}

pub fn sample_tx(id: i32, start: DateTime<Utc>) -> Transaction {
    Transaction::new(id, STATION, 1, "TAG-001", Decimal::from(1000), start)
}

pub fn register(tx_id: i32, at: DateTime<Utc>, wh: i64) -> NormalizedMeterValue {
    NormalizedMeterValue::new(
        tx_id,
        STATION,
        1,
        at,
        wh.to_string(),
        Some(MeterValueAttribute::energy_register()),
    )
}

pub fn power(tx_id: i32, at: DateTime<Utc>, phase: Option<Phase>, watts: i64) -> NormalizedMeterValue {
    NormalizedMeterValue::new(
        tx_id,
        STATION,
        1,
        at,
        watts.to_string(),
        Some(MeterValueAttribute::power_active_import(phase)),
    )
}

/// Energy samples every minute after `start`
pub fn registers(tx_id: i32, start: DateTime<Utc>, values: &[i64]) -> Vec<NormalizedMeterValue> {
    values
        .iter()
        .enumerate()
        .map(|(i, wh)| register(tx_id, start + Duration::minutes(i as i64 + 1), *wh))
        .collect()
}
