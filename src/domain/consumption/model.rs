//! Consumption domain entity
//!
//! One reporting interval `[started_at, ended_at)` of a transaction with the
//! instantaneous readings, the energy delta and the cumulated totals up to
//! and including the interval.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::charging_station::ConnectorLimitSource;
use crate::domain::ports::PricingSource;
use crate::domain::site_area::SiteAreaLimitSource;

/// Where a classified reading lands inside a [`PhaseValues`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSlot {
    Total,
    L1,
    L2,
    L3,
    Dc,
}

/// One electrical quantity split by phase
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseValues {
    pub total: Option<Decimal>,
    pub l1: Option<Decimal>,
    pub l2: Option<Decimal>,
    pub l3: Option<Decimal>,
    pub dc: Option<Decimal>,
}

impl PhaseValues {
    pub fn get(&self, slot: PhaseSlot) -> Option<Decimal> {
        match slot {
            PhaseSlot::Total => self.total,
            PhaseSlot::L1 => self.l1,
            PhaseSlot::L2 => self.l2,
            PhaseSlot::L3 => self.l3,
            PhaseSlot::Dc => self.dc,
        }
    }

    pub fn set(&mut self, slot: PhaseSlot, value: Decimal) {
        let target = match slot {
            PhaseSlot::Total => &mut self.total,
            PhaseSlot::L1 => &mut self.l1,
            PhaseSlot::L2 => &mut self.l2,
            PhaseSlot::L3 => &mut self.l3,
            PhaseSlot::Dc => &mut self.dc,
        };
        *target = Some(value);
    }

    pub fn has_phases(&self) -> bool {
        self.l1.is_some() || self.l2.is_some() || self.l3.is_some()
    }

    /// Sum of the L1/L2/L3 readings, `None` when no phase is present or the sum overflows
    pub fn phase_sum(&self) -> Option<Decimal> {
        if !self.has_phases() {
            return None;
        }
        [self.l1, self.l2, self.l3]
            .iter()
            .flatten()
            .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(*value))
    }

    /// Overwrite with every reading present in `other`
    pub fn merge_from(&mut self, other: &PhaseValues) {
        for slot in [
            PhaseSlot::Total,
            PhaseSlot::L1,
            PhaseSlot::L2,
            PhaseSlot::L3,
            PhaseSlot::Dc,
        ] {
            if let Some(value) = other.get(slot) {
                self.set(slot, value);
            }
        }
    }

    /// Zero wherever a reading exists
    pub fn zeroed(&self) -> PhaseValues {
        let zero = |v: Option<Decimal>| v.map(|_| Decimal::ZERO);
        PhaseValues {
            total: zero(self.total),
            l1: zero(self.l1),
            l2: zero(self.l2),
            l3: zero(self.l3),
            dc: zero(self.dc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumption {
    pub id: Uuid,
    pub transaction_id: i32,
    pub charge_point_id: String,
    pub connector_id: u32,
    pub site_id: Option<String>,
    pub site_area_id: Option<String>,
    pub user_id: Option<String>,

    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: DateTime<Utc>,

    pub instant_watts: PhaseValues,
    pub instant_amps: PhaseValues,
    pub instant_volts: PhaseValues,
    pub state_of_charge: Option<Decimal>,

    /// Energy delivered during the interval (Wh)
    pub consumption_wh: Option<Decimal>,
    pub consumption_amps: Option<Decimal>,
    pub cumulated_consumption_wh: Option<Decimal>,
    pub cumulated_consumption_amps: Option<Decimal>,
    pub total_inactivity_secs: Option<i64>,
    pub total_duration_secs: Option<i64>,

    pub amount: Option<Decimal>,
    pub rounded_amount: Option<Decimal>,
    pub cumulated_amount: Option<Decimal>,
    pub currency_code: Option<String>,
    pub pricing_source: Option<PricingSource>,

    pub limit_amps: Option<Decimal>,
    pub limit_watts: Option<Decimal>,
    pub limit_source: Option<ConnectorLimitSource>,
    pub limit_site_area_watts: Option<Decimal>,
    pub limit_site_area_amps: Option<Decimal>,
    pub limit_site_area_source: Option<SiteAreaLimitSource>,
    pub smart_charging_active: bool,

    /// Energy-bearing interval that must go through pricing and billing
    pub to_price: bool,
}

impl Consumption {
    pub fn new(
        transaction_id: i32,
        charge_point_id: impl Into<String>,
        connector_id: u32,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_id,
            charge_point_id: charge_point_id.into(),
            connector_id,
            site_id: None,
            site_area_id: None,
            user_id: None,
            started_at: None,
            ended_at,
            instant_watts: PhaseValues::default(),
            instant_amps: PhaseValues::default(),
            instant_volts: PhaseValues::default(),
            state_of_charge: None,
            consumption_wh: None,
            consumption_amps: None,
            cumulated_consumption_wh: None,
            cumulated_consumption_amps: None,
            total_inactivity_secs: None,
            total_duration_secs: None,
            amount: None,
            rounded_amount: None,
            cumulated_amount: None,
            currency_code: None,
            pricing_source: None,
            limit_amps: None,
            limit_watts: None,
            limit_source: None,
            limit_site_area_watts: None,
            limit_site_area_amps: None,
            limit_site_area_source: None,
            smart_charging_active: false,
            to_price: false,
        }
    }

    /// Interval length in milliseconds (0 when the start is unknown)
    pub fn interval_millis(&self) -> i64 {
        self.started_at
            .map(|start| (self.ended_at - start).num_milliseconds().max(0))
            .unwrap_or(0)
    }

    pub fn interval_secs(&self) -> i64 {
        self.interval_millis() / 1000
    }

    /// Fold a later consumption sharing the same `ended_at` into this one.
    /// Fields present in `other` win.
    pub fn merge_from(&mut self, other: &Consumption) {
        macro_rules! take {
            ($($field:ident),+) => {
                $(if other.$field.is_some() { self.$field = other.$field.clone(); })+
            };
        }
        take!(
            started_at,
            state_of_charge,
            consumption_wh,
            consumption_amps,
            cumulated_consumption_wh,
            cumulated_consumption_amps,
            total_inactivity_secs,
            total_duration_secs,
            amount,
            rounded_amount,
            cumulated_amount,
            currency_code,
            pricing_source,
            limit_amps,
            limit_watts,
            limit_source,
            limit_site_area_watts,
            limit_site_area_amps,
            limit_site_area_source
        );
        self.instant_watts.merge_from(&other.instant_watts);
        self.instant_amps.merge_from(&other.instant_amps);
        self.instant_volts.merge_from(&other.instant_volts);
        self.smart_charging_active |= other.smart_charging_active;
        self.to_price |= other.to_price;
    }
}

// ── Tests ──────────────────────────────────────────────────────
