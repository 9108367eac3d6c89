//! Transaction tracker
//!
//! Folds built consumptions into the running figures of their transaction.
//! Energy and inactivity totals are advanced by the builder; the fold copies
//! them across together with the instantaneous readings.

use rust_decimal::Decimal;

use crate::config::InactivityConfig;
use crate::domain::charging_station::{ChargingStation, CurrentType};
use crate::domain::consumption::Consumption;
use crate::domain::transaction::{InactivityStatus, Transaction};

/// Maps cumulated inactivity to a severity level.
///
/// Below one notification interval is `Info`, below two is `Warning`,
/// beyond that `Error`. DC sessions get a shorter interval than AC ones.
#[derive(Debug, Clone, Copy)]
pub struct InactivityPolicy {
    ac_interval_secs: i64,
    dc_interval_secs: i64,
}

impl InactivityPolicy {
    pub fn new(config: &InactivityConfig) -> Self {
        Self {
            ac_interval_secs: config.ac_notification_interval_mins * 60,
            dc_interval_secs: config.dc_notification_interval_mins * 60,
        }
    }

    pub fn level(&self, current_type: CurrentType, inactivity_secs: i64) -> InactivityStatus {
        let interval = match current_type {
            CurrentType::Ac => self.ac_interval_secs,
            CurrentType::Dc => self.dc_interval_secs,
        };
        if inactivity_secs < interval {
            InactivityStatus::Info
        } else if inactivity_secs < interval * 2 {
            InactivityStatus::Warning
        } else {
            InactivityStatus::Error
        }
    }

    pub fn level_for(&self, station: &ChargingStation, transaction: &Transaction) -> InactivityStatus {
        self.level(
            station.current_type(transaction.connector_id),
            transaction.current_total_inactivity_secs,
        )
    }
}

impl Default for InactivityPolicy {
    fn default() -> Self {
        Self::new(&InactivityConfig::default())
    }
}

/// Fold one consumption into its transaction.
pub fn fold(
    policy: &InactivityPolicy,
    station: &ChargingStation,
    transaction: &mut Transaction,
    consumption: &Consumption,
) {
    transaction.current_consumption_wh = consumption.consumption_wh;
    if let Some(total) = consumption.cumulated_consumption_wh {
        transaction.current_total_consumption_wh = total;
    }
    transaction.current_instant_watts = consumption.instant_watts.clone();
    transaction.current_instant_amps = consumption.instant_amps.clone();
    transaction.current_instant_volts = consumption.instant_volts.clone();
    transaction.current_timestamp = Some(consumption.ended_at);

    if consumption.state_of_charge.is_some() {
        transaction.current_state_of_charge = consumption.state_of_charge;
    }
    // No TransactionBegin SoC: the first reading stands in for it
    if transaction.state_of_charge.is_none() {
        transaction.state_of_charge = transaction
            .current_state_of_charge
            .filter(|soc| *soc > Decimal::ZERO);
    }

    let last_seen = transaction
        .last_consumption
        .map_or(consumption.ended_at, |last| last.timestamp);
    transaction.current_total_duration_secs = (last_seen - transaction.timestamp).num_seconds();
    transaction.current_inactivity_status = policy.level_for(station, transaction);
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::LastConsumption;
    use chrono::{Duration, Utc};

    fn sample_tx() -> Transaction {
        Transaction::new(1, "CP001", 1, "TAG-001", Decimal::from(1000), Utc::now())
    }

    #[test]
    fn inactivity_levels() {
        let policy = InactivityPolicy::default();
        assert_eq!(policy.level(CurrentType::Ac, 0), InactivityStatus::Info);
        assert_eq!(policy.level(CurrentType::Ac, 3599), InactivityStatus::Info);
        assert_eq!(policy.level(CurrentType::Ac, 3600), InactivityStatus::Warning);
        assert_eq!(policy.level(CurrentType::Ac, 7200), InactivityStatus::Error);
        assert_eq!(policy.level(CurrentType::Dc, 1800), InactivityStatus::Warning);
        assert_eq!(policy.level(CurrentType::Dc, 3600), InactivityStatus::Error);
    }

    #[test]
    fn fold_copies_running_figures() {
        let station = ChargingStation::new("CP001");
        let mut tx = sample_tx();
        let ended_at = tx.timestamp + Duration::seconds(60);
        tx.last_consumption = Some(LastConsumption {
            value: Decimal::from(1500),
            timestamp: ended_at,
        });

        let mut c = Consumption::new(1, "CP001", 1, ended_at);
        c.consumption_wh = Some(Decimal::from(500));
        c.cumulated_consumption_wh = Some(Decimal::from(500));
        c.instant_watts.total = Some(Decimal::from(30_000));
        c.state_of_charge = Some(Decimal::from(40));

        fold(&InactivityPolicy::default(), &station, &mut tx, &c);
        assert_eq!(tx.current_consumption_wh, Some(Decimal::from(500)));
        assert_eq!(tx.current_total_consumption_wh, Decimal::from(500));
        assert_eq!(tx.current_instant_watts.total, Some(Decimal::from(30_000)));
        assert_eq!(tx.current_timestamp, Some(ended_at));
        assert_eq!(tx.current_total_duration_secs, 60);
        assert_eq!(tx.state_of_charge, Some(Decimal::from(40)));
        assert_eq!(tx.current_inactivity_status, InactivityStatus::Info);
    }

    #[test]
    fn soc_only_consumption_keeps_energy_total() {
        let station = ChargingStation::new("CP001");
        let mut tx = sample_tx();
        tx.current_total_consumption_wh = Decimal::from(800);
        tx.state_of_charge = Some(Decimal::from(20));

        let mut c = Consumption::new(1, "CP001", 1, tx.timestamp + Duration::seconds(30));
        c.state_of_charge = Some(Decimal::from(35));
        fold(&InactivityPolicy::default(), &station, &mut tx, &c);

        assert_eq!(tx.current_total_consumption_wh, Decimal::from(800));
        assert_eq!(tx.current_state_of_charge, Some(Decimal::from(35)));
        // Start SoC is not overwritten
        assert_eq!(tx.state_of_charge, Some(Decimal::from(20)));
    }
}
