//! Exact decimal helpers for energy and money
//!
//! Every energy delta, power derivation and price that feeds a running total
//! goes through `rust_decimal`; binary floats never touch these figures.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Multiplier between kilo-units and base units (kWh → Wh, kW → W).
pub fn kilo() -> Decimal {
    Decimal::from(1000)
}

/// Parse a meter reading as sent by a charge point ("1500", "1.5", "1.5E+3").
pub fn parse_reading(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Truncate toward zero to `dp` decimal places.
pub fn trunc_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Round half away from zero to `dp` decimal places.
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, or `None` when the denominator is zero.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        None
    } else {
        numerator.checked_div(denominator)
    }
}

/// Price of `consumption_wh` at a flat rate per kWh.
pub fn simple_price(price_per_kwh: Decimal, consumption_wh: Decimal) -> Decimal {
    price_per_kwh * consumption_wh / kilo()
}

/// `value` is present and strictly positive.
pub fn is_positive(value: Option<Decimal>) -> bool {
    value.map_or(false, |v| v > Decimal::ZERO)
}

// ── Tests ──────────────────────────────────────────────────────
