//! Normalized meter value entity
//!
//! The protocol adapters flatten every `MeterValues` / `StopTransaction`
//! sampled value into one [`NormalizedMeterValue`]. Tags are closed enums;
//! anything the engine does not model lands in an `Other` variant and is
//! ignored downstream.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::decimal::parse_reading;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Measurand {
    EnergyActiveImportRegister,
    PowerActiveImport,
    CurrentImport,
    Voltage,
    StateOfCharge,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadingContext {
    SamplePeriodic,
    SampleClock,
    TransactionBegin,
    TransactionEnd,
    Trigger,
    InterruptionBegin,
    InterruptionEnd,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    L1,
    L2,
    L3,
    N,
    L1N,
    L2N,
    L3N,
    L1L2,
    L2L3,
    L3L1,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOfMeasure {
    Wh,
    KWh,
    W,
    Kw,
    A,
    V,
    Percent,
    Other(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueFormat {
    #[default]
    Raw,
    SignedData,
}

/// What a sample measures and how it was taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeterValueAttribute {
    pub measurand: Measurand,
    pub unit: Option<UnitOfMeasure>,
    pub context: ReadingContext,
    pub phase: Option<Phase>,
    pub format: ValueFormat,
}

impl MeterValueAttribute {
    fn periodic(measurand: Measurand, unit: UnitOfMeasure, phase: Option<Phase>) -> Self {
        Self {
            measurand,
            unit: Some(unit),
            context: ReadingContext::SamplePeriodic,
            phase,
            format: ValueFormat::Raw,
        }
    }

    pub fn energy_register() -> Self {
        Self::periodic(Measurand::EnergyActiveImportRegister, UnitOfMeasure::Wh, None)
    }

    pub fn state_of_charge() -> Self {
        Self::periodic(Measurand::StateOfCharge, UnitOfMeasure::Percent, None)
    }

    pub fn voltage(phase: Option<Phase>) -> Self {
        Self::periodic(Measurand::Voltage, UnitOfMeasure::V, phase)
    }

    pub fn current_import(phase: Option<Phase>) -> Self {
        Self::periodic(Measurand::CurrentImport, UnitOfMeasure::A, phase)
    }

    pub fn power_active_import(phase: Option<Phase>) -> Self {
        Self::periodic(Measurand::PowerActiveImport, UnitOfMeasure::W, phase)
    }

    /// Signed register snapshot taken at a transaction boundary
    pub fn signed_data(context: ReadingContext) -> Self {
        Self {
            measurand: Measurand::EnergyActiveImportRegister,
            unit: Some(UnitOfMeasure::Wh),
            context,
            phase: None,
            format: ValueFormat::SignedData,
        }
    }
}

/// One sampled value of a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMeterValue {
    pub transaction_id: i32,
    pub charge_point_id: String,
    pub connector_id: u32,
    pub timestamp: DateTime<Utc>,
    /// Raw value as sent (numeric string, or an opaque signed payload)
    pub value: String,
    /// `None` for legacy payloads that only carry the energy register
    pub attribute: Option<MeterValueAttribute>,
}

impl NormalizedMeterValue {
    pub fn new(
        transaction_id: i32,
        charge_point_id: impl Into<String>,
        connector_id: u32,
        timestamp: DateTime<Utc>,
        value: impl Into<String>,
        attribute: Option<MeterValueAttribute>,
    ) -> Self {
        Self {
            transaction_id,
            charge_point_id: charge_point_id.into(),
            connector_id,
            timestamp,
            value: value.into(),
            attribute,
        }
    }

    pub fn numeric_value(&self) -> Option<Decimal> {
        parse_reading(&self.value)
    }

    pub fn is_signed_data(&self) -> bool {
        self.attribute
            .as_ref()
            .map_or(false, |a| a.format == ValueFormat::SignedData)
    }
}
