//! Consistency reconciler
//!
//! Repairs the electrical readings of one consumption so total power,
//! total current and per-phase values agree. Stations routinely report a
//! total that disagrees with their own phases, or only report some of the
//! quantities.

use rust_decimal::Decimal;

use crate::domain::charging_station::ChargingStation;
use crate::domain::consumption::{Consumption, PhaseSlot, PhaseValues};
use crate::shared::decimal::{is_positive, safe_div};

/// Milliseconds per hour, turns Wh over an interval into W
const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Relative tolerance between a reported total and the sum of its phases
fn tolerance() -> Decimal {
    Decimal::new(11, 1)
}

/// Out-of-range readings whose derivation overflows are left as reported.
pub fn reconcile(station: &ChargingStation, connector_id: u32, consumption: &mut Consumption) {
    align_total_with_phases(&mut consumption.instant_watts);
    align_total_with_phases(&mut consumption.instant_amps);

    if !is_positive(consumption.instant_watts.total) {
        if let Some(watts) = derive_total_watts(station, connector_id, consumption) {
            consumption.instant_watts.total = Some(watts);
        }
    }

    if !is_positive(consumption.instant_amps.total) {
        if let Some(watts) = consumption.instant_watts.total.filter(|w| *w > Decimal::ZERO) {
            let amps = match consumption.instant_volts.total.filter(|v| *v > Decimal::ZERO) {
                Some(volts) => safe_div(watts, volts).unwrap_or(Decimal::ZERO),
                None => station.watts_to_amps(connector_id, watts),
            };
            consumption.instant_amps.total = Some(amps);
        }
    }

    if !any_positive_phase(&consumption.instant_watts) && any_positive_phase(&consumption.instant_amps) {
        for slot in [PhaseSlot::L1, PhaseSlot::L2, PhaseSlot::L3] {
            let Some(amps) = consumption.instant_amps.get(slot) else {
                continue;
            };
            let watts = match consumption.instant_volts.get(slot).filter(|v| *v > Decimal::ZERO) {
                Some(volts) => amps.checked_mul(volts),
                None => Some(station.amps_to_watts(connector_id, amps)),
            };
            if let Some(watts) = watts {
                consumption.instant_watts.set(slot, watts);
            }
        }
    }

    if !is_positive(consumption.instant_watts.dc) {
        if let (Some(amps), Some(volts)) = (
            consumption.instant_amps.dc.filter(|a| *a > Decimal::ZERO),
            consumption.instant_volts.dc.filter(|v| *v > Decimal::ZERO),
        ) {
            if let Some(watts) = amps.checked_mul(volts) {
                consumption.instant_watts.dc = Some(watts);
            }
        }
    }
}

fn any_positive_phase(values: &PhaseValues) -> bool {
    is_positive(values.l1) || is_positive(values.l2) || is_positive(values.l3)
}

/// Overwrite the total when it is missing or off by more than 10% from the phase sum
fn align_total_with_phases(values: &mut PhaseValues) {
    if !any_positive_phase(values) {
        return;
    }
    let Some(sum) = values.phase_sum() else {
        return;
    };
    let min = safe_div(sum, tolerance()).unwrap_or(sum);
    let within = match (values.total, sum.checked_mul(tolerance())) {
        (Some(total), Some(max)) => total >= min && total <= max,
        (Some(total), None) => total >= min,
        (None, _) => false,
    };
    if !within {
        values.total = Some(sum);
    }
}

fn derive_total_watts(
    station: &ChargingStation,
    connector_id: u32,
    consumption: &Consumption,
) -> Option<Decimal> {
    if let Some(amps) = consumption.instant_amps.total.filter(|a| *a > Decimal::ZERO) {
        return match consumption.instant_volts.total.filter(|v| *v > Decimal::ZERO) {
            Some(volts) => volts.checked_mul(amps),
            None => Some(station.amps_to_watts(connector_id, amps)),
        };
    }
    // Average power over the interval
    let wh = consumption.consumption_wh?;
    let millis = consumption.interval_millis();
    if millis <= 0 {
        return Some(Decimal::ZERO);
    }
    safe_div(wh.checked_mul(Decimal::from(MILLIS_PER_HOUR))?, Decimal::from(millis))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::charging_station::{Connector, CurrentType};
    use chrono::{Duration, Utc};

    fn sample_station() -> ChargingStation {
        let mut station = ChargingStation::new("CP001");
        station.voltage = Some(Decimal::from(230));
        station.connectors = vec![Connector::new(1, CurrentType::Ac)];
        station
    }

    fn sample_consumption() -> Consumption {
        Consumption::new(1, "CP001", 1, Utc::now())
    }

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn total_watts_out_of_tolerance_is_overwritten() {
        let mut c = sample_consumption();
        c.instant_watts.l1 = Some(d(1000));
        c.instant_watts.l2 = Some(d(1000));
        c.instant_watts.l3 = Some(d(1000));
        c.instant_watts.total = Some(d(500));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.total, Some(d(3000)));
    }

    #[test]
    fn total_watts_within_tolerance_is_kept() {
        let mut c = sample_consumption();
        c.instant_watts.l1 = Some(d(1000));
        c.instant_watts.l2 = Some(d(1000));
        c.instant_watts.l3 = Some(d(1000));
        c.instant_watts.total = Some(d(2950));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.total, Some(d(2950)));
    }

    #[test]
    fn total_amps_filled_from_phases() {
        let mut c = sample_consumption();
        c.instant_amps.l1 = Some(d(16));
        c.instant_amps.l2 = Some(d(16));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_amps.total, Some(d(32)));
    }

    #[test]
    fn watts_from_volts_and_amps() {
        let mut c = sample_consumption();
        c.instant_volts.total = Some(d(230));
        c.instant_amps.total = Some(d(10));
        reconcile(&ChargingStation::new("CP002"), 1, &mut c);
        assert_eq!(c.instant_watts.total, Some(d(2300)));
    }

    #[test]
    fn watts_from_amps_and_rated_voltage() {
        let mut c = sample_consumption();
        c.instant_amps.total = Some(d(10));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.total, Some(d(2300)));
    }

    #[test]
    fn watts_from_energy_over_interval() {
        let mut c = sample_consumption();
        c.started_at = Some(c.ended_at - Duration::seconds(60));
        c.consumption_wh = Some(d(500));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.total, Some(d(30_000)));
        // 30 kW at 230 V
        assert_eq!(
            c.instant_amps.total,
            safe_div(d(30_000), d(230))
        );
    }

    #[test]
    fn amps_from_watts_and_volts() {
        let mut c = sample_consumption();
        c.instant_watts.total = Some(d(2300));
        c.instant_volts.total = Some(d(230));
        reconcile(&ChargingStation::new("CP002"), 1, &mut c);
        assert_eq!(c.instant_amps.total, Some(d(10)));
    }

    #[test]
    fn phase_watts_from_phase_amps() {
        let mut c = sample_consumption();
        c.instant_amps.l1 = Some(d(10));
        c.instant_amps.l2 = Some(d(10));
        c.instant_volts.l1 = Some(d(240));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.l1, Some(d(2400)));
        assert_eq!(c.instant_watts.l2, Some(d(2300)));
        assert_eq!(c.instant_watts.l3, None);
    }

    #[test]
    fn dc_watts_from_dc_amps_and_volts() {
        let mut c = sample_consumption();
        c.instant_amps.dc = Some(d(100));
        c.instant_volts.dc = Some(d(400));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.dc, Some(d(40_000)));
    }

    #[test]
    fn soc_only_consumption_stays_empty() {
        let mut c = sample_consumption();
        c.state_of_charge = Some(d(55));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.total, None);
        assert_eq!(c.instant_amps.total, None);
    }

    #[test]
    fn overflowing_derivations_are_skipped() {
        let huge = Decimal::from_scientific("1E26").unwrap();
        let mut c = sample_consumption();
        c.started_at = Some(c.ended_at - Duration::seconds(60));
        c.consumption_wh = Some(huge);
        c.instant_amps.dc = Some(huge);
        c.instant_volts.dc = Some(d(400));
        reconcile(&sample_station(), 1, &mut c);
        assert_eq!(c.instant_watts.total, None);
        assert_eq!(c.instant_amps.total, None);
        assert_eq!(c.instant_watts.dc, None);
    }
}
