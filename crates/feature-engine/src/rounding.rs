//! Decimal Rounding
//!
//! Scores are reported rounded the way the dashboard and the training
//! pipeline round them: to the nearest decimal, with exact midpoints going to
//! the even digit. The decision is made on the exact binary value, so
//! `0.125` (exactly representable) rounds down to `0.12` while `0.135`
//! (stored slightly above) rounds up to `0.14`.

/// Round to `decimals` fractional digits, exact ties to even
pub fn round_half_even(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let scale = 10f64.powi(decimals as i32);
    let lower = (value * scale).floor();
    // Single rounding: the sign of `value * scale - midpoint` is exact
    let offset = value.mul_add(scale, -(lower + 0.5));

    let rounded = if offset < 0.0 {
        lower
    } else if offset > 0.0 {
        lower + 1.0
    } else if lower % 2.0 == 0.0 {
        lower
    } else {
        lower + 1.0
    };
    rounded / scale
}
