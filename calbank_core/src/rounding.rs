//! Centralized rounding and clamping rules.
//!
//! Calories are whole numbers; percentages carry one decimal place. Every
//! rounded value in the crate goes through these helpers so identical inputs
//! produce identical output regardless of call path.

/// Percentages are capped here for display rather than truncated to 100,
/// so severe cases remain visibly distinguishable.
pub const MAX_DISPLAY_PCT: f64 = 1000.0;

/// Round a calorie quantity to a whole kcal (half away from zero).
pub fn round_calories(value: f64) -> i32 {
    value.round() as i32
}

/// Round a percentage to one decimal place.
pub fn round_pct(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round a percentage to one decimal and cap it at the display bound.
pub fn display_pct(value: f64) -> f64 {
    round_pct(value.min(MAX_DISPLAY_PCT))
}

/// Ceiling division for positive quantities (weeks-to-recover math).
pub fn ceil_div(numerator: i32, denominator: i32) -> i32 {
    debug_assert!(denominator > 0);
    (numerator + denominator - 1) / denominator
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_calories() {
        assert_eq!(round_calories(233.333), 233);
        assert_eq!(round_calories(128.57), 129);
        assert_eq!(round_calories(100.5), 101);
        assert_eq!(round_calories(0.0), 0);
    }

    #[test]
    fn test_round_pct_one_decimal() {
        assert_eq!(round_pct(5.04), 5.0);
        assert_eq!(round_pct(5.05), 5.1);
        assert_eq!(round_pct(33.333), 33.3);
    }

    #[test]
    fn test_display_pct_caps_at_bound() {
        assert_eq!(display_pct(1234.5), 1000.0);
        assert_eq!(display_pct(999.99), 1000.0);
        assert_eq!(display_pct(87.65), 87.7);
    }

    #[test]
    fn test_ceil_div() {
        assert_eq!(ceil_div(700, 500), 2);
        assert_eq!(ceil_div(1000, 500), 2);
        assert_eq!(ceil_div(1, 500), 1);
    }
}
