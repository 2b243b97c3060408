//! Numeric helpers shared by the measurement pass.

/// Clamp `value` into `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics and lets `NaN` through unchanged,
/// so degenerate geometry stays visible in the measured values.
#[inline]
#[must_use]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Sign of `value` as -1, 0 or 1. `NaN` and both zeros map to 0.
#[inline]
#[must_use]
pub fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
