//! Weight arithmetic on `rust_decimal::Decimal`.
//!
//! Everything the engine materializes is rounded to the owning slot's
//! increment here, and only here: config values stay unrounded in storage
//! because two slots referencing the same key may round to different
//! increments (2.5 kg vs 1.25 kg plates).

use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;

/// Round a weight to the nearest multiple of the increment, midpoint away
/// from zero. The increment is validated positive at definition load.
pub fn round_to_increment(weight: Decimal, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return weight;
    }
    let steps = (weight / increment)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    (steps * increment).normalize()
}

/// `value × percent / 100`, unrounded.
pub fn percent_of(value: Decimal, percent: Decimal) -> Decimal {
    value * percent / Decimal::ONE_HUNDRED
}

/// `weight × (1 − percent/100)`, unrounded. Rounding happens at
/// materialization, so repeated deloads do not accumulate rounding error.
pub fn apply_deload(weight: Decimal, percent: Decimal) -> Decimal {
    weight * (Decimal::ONE - percent / Decimal::ONE_HUNDRED)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
