//! Transaction domain entity

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::consumption::PhaseValues;
use crate::domain::ports::PricingSource;

/// Lifecycle action driving pricing, billing and roaming side effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionAction {
    Start,
    Update,
    Stop,
    /// Settlement after the connector is freed (roaming CDR only)
    End,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Update => "update",
            Self::Stop => "stop",
            Self::End => "end",
        }
    }
}

impl fmt::Display for TransactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of the accumulated inactivity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InactivityStatus {
    #[default]
    Info,
    Warning,
    Error,
}

/// Rolling energy-counter reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastConsumption {
    /// Energy register (Wh)
    pub value: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Result of closing a transaction on the billing side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingDataStop {
    pub status: String,
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingData {
    pub with_billing_active: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub stop: Option<BillingDataStop>,
}

/// Frozen record of a stopped transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStop {
    /// Energy register at stop (Wh)
    pub meter_stop: Decimal,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub tag_id: Option<String>,
    pub state_of_charge: Option<Decimal>,
    pub signed_data: Option<String>,
    pub total_consumption_wh: Decimal,
    pub total_inactivity_secs: i64,
    pub total_duration_secs: i64,
    pub inactivity_status: InactivityStatus,
    pub price: Option<Decimal>,
    pub rounded_price: Option<Decimal>,
    pub price_unit: Option<String>,
    pub pricing_source: Option<PricingSource>,
    /// Idle time between the stop and the connector being freed
    pub extra_inactivity_secs: i64,
    pub extra_inactivity_computed: bool,
}

impl TransactionStop {
    pub fn new(timestamp: DateTime<Utc>, meter_stop: Decimal) -> Self {
        Self {
            meter_stop,
            timestamp,
            user_id: None,
            tag_id: None,
            state_of_charge: None,
            signed_data: None,
            total_consumption_wh: Decimal::ZERO,
            total_inactivity_secs: 0,
            total_duration_secs: 0,
            inactivity_status: InactivityStatus::Info,
            price: None,
            rounded_price: None,
            price_unit: None,
            pricing_source: None,
            extra_inactivity_secs: 0,
            extra_inactivity_computed: false,
        }
    }
}

/// Charging transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction ID
    pub id: i32,
    pub charge_point_id: String,
    pub connector_id: u32,
    pub site_id: Option<String>,
    pub site_area_id: Option<String>,
    pub user_id: Option<String>,
    /// Tag that started the transaction
    pub tag_id: String,
    /// When the transaction started
    pub timestamp: DateTime<Utc>,
    /// Energy register at start (Wh)
    pub meter_start: Decimal,
    /// State of charge at start (%)
    pub state_of_charge: Option<Decimal>,
    /// Signed meter snapshot taken at start
    pub signed_data: Option<String>,
    /// Latest signed meter snapshot
    pub current_signed_data: Option<String>,

    /// Energy of the last folded interval (Wh)
    pub current_consumption_wh: Option<Decimal>,
    pub current_total_consumption_wh: Decimal,
    pub current_total_inactivity_secs: i64,
    pub current_total_duration_secs: i64,
    pub current_inactivity_status: InactivityStatus,
    pub current_instant_watts: PhaseValues,
    pub current_instant_amps: PhaseValues,
    pub current_instant_volts: PhaseValues,
    pub current_state_of_charge: Option<Decimal>,
    pub current_timestamp: Option<DateTime<Utc>>,
    pub current_cumulated_price: Option<Decimal>,

    pub price: Option<Decimal>,
    pub rounded_price: Option<Decimal>,
    pub price_unit: Option<String>,
    pub pricing_source: Option<PricingSource>,

    pub last_consumption: Option<LastConsumption>,
    pub billing_data: Option<BillingData>,
    /// OCPI authorization id / OICP session id of the mirrored session
    pub roaming_session_id: Option<String>,
    /// Set once the transaction is refunded; totals are frozen from then on
    pub refund_id: Option<String>,
    pub stop: Option<TransactionStop>,
}

impl Transaction {
    pub fn new(
        id: i32,
        charge_point_id: impl Into<String>,
        connector_id: u32,
        tag_id: impl Into<String>,
        meter_start: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            charge_point_id: charge_point_id.into(),
            connector_id,
            site_id: None,
            site_area_id: None,
            user_id: None,
            tag_id: tag_id.into(),
            timestamp,
            meter_start,
            state_of_charge: None,
            signed_data: None,
            current_signed_data: None,
            current_consumption_wh: None,
            current_total_consumption_wh: Decimal::ZERO,
            current_total_inactivity_secs: 0,
            current_total_duration_secs: 0,
            current_inactivity_status: InactivityStatus::Info,
            current_instant_watts: PhaseValues::default(),
            current_instant_amps: PhaseValues::default(),
            current_instant_volts: PhaseValues::default(),
            current_state_of_charge: None,
            current_timestamp: None,
            current_cumulated_price: None,
            price: None,
            rounded_price: None,
            price_unit: None,
            pricing_source: None,
            last_consumption: None,
            billing_data: None,
            roaming_session_id: None,
            refund_id: None,
            stop: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stop.is_none()
    }

    /// Live energy delivered so far (Wh)
    pub fn energy_consumed(&self) -> Decimal {
        self.current_total_consumption_wh
    }

    /// Clear every running figure so the history can be replayed from the start
    pub fn reset_running_totals(&mut self) {
        self.last_consumption = None;
        self.current_consumption_wh = None;
        self.current_total_consumption_wh = Decimal::ZERO;
        self.current_total_inactivity_secs = 0;
        self.current_total_duration_secs = 0;
        self.current_inactivity_status = InactivityStatus::Info;
        self.current_instant_watts = PhaseValues::default();
        self.current_instant_amps = PhaseValues::default();
        self.current_instant_volts = PhaseValues::default();
        self.current_state_of_charge = None;
        self.current_timestamp = None;
        self.current_cumulated_price = self.price;
    }
}

// ── Tests ──────────────────────────────────────────────────────
