//! Signed data capture and stop meter-value synthesis

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::consumption::PhaseValues;
use crate::domain::meter_value::{
    MeterValueAttribute, NormalizedMeterValue, Phase, ReadingContext,
};
use crate::domain::transaction::Transaction;

/// Keep the signed register snapshot carried by `sample`, if any.
pub fn capture_signed_data(transaction: &mut Transaction, sample: &NormalizedMeterValue) -> bool {
    if !sample.is_signed_data() {
        return false;
    }
    match sample.attribute.as_ref().map(|a| a.context) {
        Some(ReadingContext::TransactionBegin) => {
            transaction.signed_data = Some(sample.value.clone());
            true
        }
        Some(ReadingContext::TransactionEnd) => {
            transaction.current_signed_data = Some(sample.value.clone());
            true
        }
        _ => false,
    }
}

/// Samples describing the transaction at its stop.
///
/// The stop register becomes one more energy sample at `stopped_at`; signed
/// data comes from the stop payload (`transaction_data`) or, without one,
/// from the transaction; the last known SoC and instantaneous readings are
/// repeated so the stop interval carries them.
pub fn stop_meter_values(
    transaction: &Transaction,
    meter_stop: Decimal,
    stopped_at: DateTime<Utc>,
    transaction_data: &[NormalizedMeterValue],
) -> Vec<NormalizedMeterValue> {
    let sample = |value: String, attribute: MeterValueAttribute| {
        NormalizedMeterValue::new(
            transaction.id,
            transaction.charge_point_id.clone(),
            transaction.connector_id,
            stopped_at,
            value,
            Some(attribute),
        )
    };

    let mut samples = vec![sample(
        meter_stop.to_string(),
        MeterValueAttribute::energy_register(),
    )];

    if transaction_data.is_empty() {
        if let Some(signed) = &transaction.signed_data {
            samples.push(sample(
                signed.clone(),
                MeterValueAttribute::signed_data(ReadingContext::TransactionBegin),
            ));
        }
        if let Some(signed) = &transaction.current_signed_data {
            samples.push(sample(
                signed.clone(),
                MeterValueAttribute::signed_data(ReadingContext::TransactionEnd),
            ));
        }
    } else {
        for data in transaction_data.iter().filter(|d| d.is_signed_data()) {
            let context = data.attribute.as_ref().map(|a| a.context);
            if let Some(context @ (ReadingContext::TransactionBegin | ReadingContext::TransactionEnd)) =
                context
            {
                samples.push(sample(
                    data.value.clone(),
                    MeterValueAttribute::signed_data(context),
                ));
            }
        }
    }

    if let Some(soc) = transaction
        .current_state_of_charge
        .filter(|soc| *soc > Decimal::ZERO)
    {
        samples.push(sample(soc.to_string(), MeterValueAttribute::state_of_charge()));
    }

    let readings: [(&PhaseValues, fn(Option<Phase>) -> MeterValueAttribute); 3] = [
        (&transaction.current_instant_volts, MeterValueAttribute::voltage),
        (&transaction.current_instant_amps, MeterValueAttribute::current_import),
        (&transaction.current_instant_watts, MeterValueAttribute::power_active_import),
    ];
    for (values, attribute) in readings {
        let total = values
            .total
            .filter(|v| *v > Decimal::ZERO)
            .or(values.dc.filter(|v| *v > Decimal::ZERO));
        if let Some(total) = total {
            samples.push(sample(total.to_string(), attribute(None)));
        }
        for (value, phase) in [
            (values.l1, Phase::L1),
            (values.l2, Phase::L2),
            (values.l3, Phase::L3),
        ] {
            if let Some(value) = value.filter(|v| *v > Decimal::ZERO) {
                samples.push(sample(value.to_string(), attribute(Some(phase))));
            }
        }
    }

    samples
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::meter_value::Measurand;
    use chrono::Duration;

    fn sample_tx() -> Transaction {
        Transaction::new(9, "CP001", 1, "TAG-001", Decimal::from(1000), Utc::now())
    }

    #[test]
    fn signed_data_is_routed_by_context() {
        let mut tx = sample_tx();
        let begin = NormalizedMeterValue::new(
            9,
            "CP001",
            1,
            Utc::now(),
            "<begin/>",
            Some(MeterValueAttribute::signed_data(ReadingContext::TransactionBegin)),
        );
        let end = NormalizedMeterValue::new(
            9,
            "CP001",
            1,
            Utc::now(),
            "<end/>",
            Some(MeterValueAttribute::signed_data(ReadingContext::TransactionEnd)),
        );
        let plain = NormalizedMeterValue::new(9, "CP001", 1, Utc::now(), "1200", None);

        assert!(capture_signed_data(&mut tx, &begin));
        assert!(capture_signed_data(&mut tx, &end));
        assert!(!capture_signed_data(&mut tx, &plain));
        assert_eq!(tx.signed_data.as_deref(), Some("<begin/>"));
        assert_eq!(tx.current_signed_data.as_deref(), Some("<end/>"));
    }

    #[test]
    fn stop_samples_repeat_last_readings() {
        let mut tx = sample_tx();
        tx.signed_data = Some("<begin/>".into());
        tx.current_state_of_charge = Some(Decimal::from(80));
        tx.current_instant_volts.total = Some(Decimal::from(230));
        tx.current_instant_amps.l1 = Some(Decimal::from(16));
        tx.current_instant_watts.total = Some(Decimal::ZERO);
        let stopped_at = tx.timestamp + Duration::minutes(30);

        let samples = stop_meter_values(&tx, Decimal::from(9000), stopped_at, &[]);
        assert!(samples.iter().all(|s| s.timestamp == stopped_at));
        assert_eq!(samples[0].value, "9000");
        assert_eq!(
            samples[0].attribute.as_ref().map(|a| a.measurand.clone()),
            Some(Measurand::EnergyActiveImportRegister)
        );
        // energy, begin signature, SoC, voltage, L1 current; zero power skipped
        assert_eq!(samples.len(), 5);
        assert!(samples[1].is_signed_data());
        assert_eq!(
            samples[4].attribute.as_ref().and_then(|a| a.phase),
            Some(Phase::L1)
        );
    }

    #[test]
    fn stop_payload_signatures_win() {
        let mut tx = sample_tx();
        tx.signed_data = Some("<stale/>".into());
        let payload = vec![NormalizedMeterValue::new(
            9,
            "CP001",
            1,
            Utc::now(),
            "<end/>",
            Some(MeterValueAttribute::signed_data(ReadingContext::TransactionEnd)),
        )];
        let samples = stop_meter_values(&tx, Decimal::from(2000), Utc::now(), &payload);
        let signed: Vec<&str> = samples
            .iter()
            .filter(|s| s.is_signed_data())
            .map(|s| s.value.as_str())
            .collect();
        assert_eq!(signed, vec!["<end/>"]);
    }
}
