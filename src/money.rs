//! Money rounding convention shared by the accumulators and simulators.

/// Rounds to two decimal places. Simulators apply this per step, not just at
/// output, so schedule totals stay reproducible across runs.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
