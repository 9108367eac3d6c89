//! Idle time after the stop, until the connector is freed

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::application::consumption::InactivityPolicy;
use crate::domain::charging_station::CurrentType;
use crate::domain::consumption::Consumption;
use crate::domain::transaction::Transaction;

/// Zero-energy consumption covering `stop.extra_inactivity_secs` from `started_at`.
///
/// Copies `last` so the interval keeps its limits and cumulated energy,
/// then moves the stop record to the end of the idle period. Repeating the
/// call with the same `started_at` yields the same stop record.
pub fn build_extra_inactivity(
    policy: &InactivityPolicy,
    current_type: CurrentType,
    transaction: &mut Transaction,
    last: &Consumption,
    started_at: DateTime<Utc>,
) -> Option<Consumption> {
    let base_inactivity_secs = transaction.current_total_inactivity_secs;
    let transaction_start = transaction.timestamp;
    let stop = transaction.stop.as_mut()?;
    let extra_secs = stop.extra_inactivity_secs;
    if extra_secs <= 0 {
        return None;
    }

    let mut extra = last.clone();
    extra.id = Uuid::new_v4();
    extra.started_at = Some(started_at);
    extra.ended_at = started_at + Duration::seconds(extra_secs);
    extra.consumption_wh = Some(Decimal::ZERO);
    extra.consumption_amps = Some(Decimal::ZERO);
    extra.instant_watts = last.instant_watts.zeroed();
    extra.instant_amps = last.instant_amps.zeroed();
    extra.amount = Some(Decimal::ZERO);
    extra.rounded_amount = Some(Decimal::ZERO);
    extra.total_inactivity_secs = Some(last.total_inactivity_secs.unwrap_or(0) + extra_secs);
    extra.total_duration_secs = Some(last.total_duration_secs.unwrap_or(0) + extra_secs);
    extra.to_price = false;

    stop.timestamp = extra.ended_at;
    stop.total_duration_secs = (extra.ended_at - transaction_start).num_seconds();
    stop.total_inactivity_secs = base_inactivity_secs + extra_secs;
    stop.inactivity_status = policy.level(current_type, stop.total_inactivity_secs);
    stop.extra_inactivity_computed = true;
    Some(extra)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::{InactivityStatus, TransactionStop};

    fn stopped_tx(extra_secs: i64) -> (Transaction, DateTime<Utc>) {
        let start = Utc::now();
        let stopped_at = start + Duration::minutes(30);
        let mut tx = Transaction::new(1, "CP001", 1, "TAG", Decimal::from(1000), start);
        tx.current_total_inactivity_secs = 120;
        let mut stop = TransactionStop::new(stopped_at, Decimal::from(5000));
        stop.extra_inactivity_secs = extra_secs;
        tx.stop = Some(stop);
        (tx, stopped_at)
    }

    fn last_consumption(tx: &Transaction, ended_at: DateTime<Utc>) -> Consumption {
        let mut c = Consumption::new(tx.id, "CP001", 1, ended_at);
        c.started_at = Some(ended_at - Duration::seconds(60));
        c.consumption_wh = Some(Decimal::from(250));
        c.cumulated_consumption_wh = Some(Decimal::from(4000));
        c.instant_watts.total = Some(Decimal::from(15_000));
        c.amount = Some(Decimal::new(50, 2));
        c.total_inactivity_secs = Some(120);
        c.total_duration_secs = Some(1800);
        c.to_price = true;
        c
    }

    #[test]
    fn builds_idle_interval_and_extends_stop() {
        let (mut tx, stopped_at) = stopped_tx(3600);
        let last = last_consumption(&tx, stopped_at);
        let extra = build_extra_inactivity(
            &InactivityPolicy::default(),
            CurrentType::Ac,
            &mut tx,
            &last,
            stopped_at,
        )
        .unwrap();

        assert_ne!(extra.id, last.id);
        assert_eq!(extra.started_at, Some(stopped_at));
        assert_eq!(extra.ended_at, stopped_at + Duration::seconds(3600));
        assert_eq!(extra.consumption_wh, Some(Decimal::ZERO));
        assert_eq!(extra.instant_watts.total, Some(Decimal::ZERO));
        assert_eq!(extra.cumulated_consumption_wh, Some(Decimal::from(4000)));
        assert_eq!(extra.total_inactivity_secs, Some(3720));
        assert_eq!(extra.total_duration_secs, Some(5400));
        assert!(!extra.to_price);

        let stop = tx.stop.as_ref().unwrap();
        assert_eq!(stop.timestamp, extra.ended_at);
        assert_eq!(stop.total_duration_secs, 5400);
        assert_eq!(stop.total_inactivity_secs, 3720);
        assert_eq!(stop.inactivity_status, InactivityStatus::Warning);
        assert!(stop.extra_inactivity_computed);
    }

    #[test]
    fn repeated_build_is_stable() {
        let (mut tx, stopped_at) = stopped_tx(600);
        let last = last_consumption(&tx, stopped_at);
        let policy = InactivityPolicy::default();
        build_extra_inactivity(&policy, CurrentType::Ac, &mut tx, &last, stopped_at).unwrap();
        let first = tx.stop.clone();
        build_extra_inactivity(&policy, CurrentType::Ac, &mut tx, &last, stopped_at).unwrap();
        assert_eq!(tx.stop, first);
    }

    #[test]
    fn nothing_without_extra_time() {
        let (mut tx, stopped_at) = stopped_tx(0);
        let last = last_consumption(&tx, stopped_at);
        assert!(build_extra_inactivity(
            &InactivityPolicy::default(),
            CurrentType::Ac,
            &mut tx,
            &last,
            stopped_at
        )
        .is_none());
        assert!(!tx.stop.unwrap().extra_inactivity_computed);
    }
}
