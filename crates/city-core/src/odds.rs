//! Probability helpers shared by both engines.
//!
//! Every chance, score, and bounded counter passes through one of these
//! clamps before it is stored or compared.

use crate::rng::RandomSource;

/// Clamps a probability to `[0, 1]`. NaN maps to zero.
pub fn clamp_unit(value: f64) -> f64 {
    clamp_between(value, 0.0, 1.0)
}

/// Clamps `value` to `[lo, hi]`. NaN maps to `lo`.
pub fn clamp_between(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

/// Clamps an integer score to `[lo, hi]` after adding `delta`.
pub fn bounded_add(value: i32, delta: i32, lo: i32, hi: i32) -> i32 {
    value.saturating_add(delta).clamp(lo, hi)
}

/// One weighted coin flip: true when the draw lands below `probability`.
pub fn roll<R: RandomSource + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.next_f64() < clamp_unit(probability)
}
