//! Meter sample classifier
//!
//! Decides which physical quantity a normalized sample carries and where it
//! lands on the phase axis. Samples the engine does not model yield `None`.

use rust_decimal::Decimal;

use crate::domain::charging_station::CurrentType;
use crate::domain::consumption::PhaseSlot;
use crate::domain::meter_value::{
    Measurand, NormalizedMeterValue, Phase, ReadingContext, UnitOfMeasure,
};
use crate::shared::decimal::kilo;

/// What a classified sample measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Active energy import register (Wh)
    Energy,
    /// Active power import (W)
    Power(PhaseSlot),
    /// Current import (A)
    Current(PhaseSlot),
    /// Voltage (V)
    Voltage(PhaseSlot),
    /// State of charge (%)
    StateOfCharge,
}

/// A sample reduced to a quantity and a value in base units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classified {
    pub quantity: Quantity,
    pub value: Decimal,
}

/// Classify one sample for a connector of the given current type.
pub fn classify(sample: &NormalizedMeterValue, current_type: CurrentType) -> Option<Classified> {
    let value = sample.numeric_value()?;

    // Legacy payloads only carry the energy register in Wh
    let Some(attribute) = sample.attribute.as_ref() else {
        return Some(Classified {
            quantity: Quantity::Energy,
            value,
        });
    };

    let periodic = attribute.context == ReadingContext::SamplePeriodic;
    let quantity = match &attribute.measurand {
        Measurand::EnergyActiveImportRegister
            if periodic || attribute.context == ReadingContext::SampleClock =>
        {
            Quantity::Energy
        }
        Measurand::StateOfCharge if periodic => Quantity::StateOfCharge,
        Measurand::PowerActiveImport if periodic => {
            Quantity::Power(power_or_current_slot(attribute.phase, current_type))
        }
        Measurand::CurrentImport if periodic => {
            Quantity::Current(power_or_current_slot(attribute.phase, current_type))
        }
        Measurand::Voltage if periodic => {
            Quantity::Voltage(voltage_slot(attribute.phase, current_type)?)
        }
        _ => return None,
    };

    // A kilo reading too large to scale is dropped like any unsupported sample
    let value = match attribute.unit {
        Some(UnitOfMeasure::KWh) | Some(UnitOfMeasure::Kw) => value.checked_mul(kilo())?,
        _ => value,
    };

    Some(Classified { quantity, value })
}

fn phase_slot(phase: Phase) -> Option<PhaseSlot> {
    match phase {
        Phase::L1 | Phase::L1N => Some(PhaseSlot::L1),
        Phase::L2 | Phase::L2N => Some(PhaseSlot::L2),
        Phase::L3 | Phase::L3N => Some(PhaseSlot::L3),
        Phase::N | Phase::L1L2 | Phase::L2L3 | Phase::L3L1 => None,
    }
}

fn power_or_current_slot(phase: Option<Phase>, current_type: CurrentType) -> PhaseSlot {
    match current_type {
        CurrentType::Dc => PhaseSlot::Dc,
        CurrentType::Ac => phase.and_then(phase_slot).unwrap_or(PhaseSlot::Total),
    }
}

/// Line-to-line voltages are not modelled and are dropped.
fn voltage_slot(phase: Option<Phase>, current_type: CurrentType) -> Option<PhaseSlot> {
    match (current_type, phase) {
        (CurrentType::Dc, _) => Some(PhaseSlot::Dc),
        (CurrentType::Ac, Some(Phase::L1L2 | Phase::L2L3 | Phase::L3L1)) => None,
        (CurrentType::Ac, phase) => Some(phase.and_then(phase_slot).unwrap_or(PhaseSlot::Total)),
    }
}

// ── Tests ──────────────────────────────────────────────────────
