//! Display rounding for rates and log values.
//!
//! Values are scaled by `10^decimals`, rounded half-to-even and scaled back.
//! This is the rounding the published choropleths were produced with, so a
//! rate of exactly `0.125` becomes `0.12`, not `0.13`.

/// Rounds `value` to `decimals` places, ties to even.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}

/// Rounds `value` to 2 places, ties to even.
#[must_use]
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_places() {
        assert!((round2(0.693_147) - 0.69).abs() < 1e-12);
        assert!((round2(2.0) - 2.0).abs() < 1e-12);
        assert!((round2(1.005_1) - 1.01).abs() < 1e-12);
    }

    #[test]
    fn ties_go_to_even() {
        assert!((round2(0.125) - 0.12).abs() < 1e-12);
        assert!((round2(0.375) - 0.38).abs() < 1e-12);
        assert!((round_to(2.5, 0) - 2.0).abs() < 1e-12);
        assert!((round_to(3.5, 0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn tiny_values_round_to_zero() {
        assert!(round2(0.004).abs() < 1e-12);
        assert!(round2(-0.004).abs() < 1e-12);
    }
}
